//! Puzzle state and its transitions.
//!
//! `PuzzleState` is an immutable snapshot. Every transition returns a new
//! snapshot together with the side effects the shell has to carry out
//! (sounds, timer lifecycle, delayed regeneration). Nothing in here touches
//! the terminal, threads or audio devices.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::puzzle::{advance_level, grid_size_for_level, Move, Puzzle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Move,
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Tap on a grid position.
    Tap(usize),
    /// Slide the tile on the given side of the blank into it.
    Slide(Move),
    Shuffle,
    Tick { epoch: u64 },
    AdvanceLevel,
    /// Deferred half of a level advance: rebuild the grid for the new level.
    Regenerate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Play(Sound),
    /// Replace any running tick source with one tagged `epoch`.
    StartTimer { epoch: u64 },
    StopTimer,
    /// Apply `Action::Regenerate` after the delay.
    ScheduleRegenerate(Duration),
}

/// Knobs that change how transitions behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Re-roll shuffles that cannot be solved by sliding.
    pub solvable_only: bool,
    pub regenerate_delay: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            solvable_only: false,
            regenerate_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleState {
    puzzle: Puzzle,
    level: u32,
    image_index: usize,
    image_count: usize,
    elapsed_seconds: u64,
    timer_active: bool,
    game_won: bool,
    timer_epoch: u64,
    regenerate_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: PuzzleState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &PuzzleState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    /// True when the transition left the state as it was.
    pub fn is_noop(&self, previous: &PuzzleState) -> bool {
        self.effects.is_empty() && &self.state == previous
    }
}

impl PuzzleState {
    /// Starting state at `level` with a freshly shuffled puzzle.
    pub fn new<R: Rng + ?Sized>(
        level: u32,
        image_count: usize,
        rules: &Rules,
        rng: &mut R,
    ) -> Transition {
        let level = level.max(1);
        let image_count = image_count.max(1);
        let seed = Self {
            puzzle: Puzzle::solved(grid_size_for_level(level)),
            level,
            image_index: (level - 1) as usize % image_count,
            image_count,
            elapsed_seconds: 0,
            timer_active: false,
            game_won: true,
            timer_epoch: 0,
            regenerate_pending: false,
        };
        seed.generate(rules, rng)
    }

    #[cfg(test)]
    pub(crate) fn with_puzzle(puzzle: Puzzle, level: u32, image_count: usize) -> Self {
        Self {
            puzzle,
            level,
            image_index: (level - 1) as usize % image_count,
            image_count,
            elapsed_seconds: 0,
            timer_active: true,
            game_won: false,
            timer_epoch: 1,
            regenerate_pending: false,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, action: Action, rules: &Rules, rng: &mut R) -> Transition {
        match action {
            Action::Tap(position) => self.tap(position),
            Action::Slide(movement) => match self.puzzle.neighbor(movement) {
                Some(position) => {
                    trace!(position, "slide {movement}");
                    self.tap(position)
                }
                None => {
                    trace!("slide {movement} blocked by the edge");
                    Transition::unchanged(self)
                }
            },
            Action::Shuffle => self.generate(rules, rng),
            Action::Tick { epoch } => self.tick(epoch),
            Action::AdvanceLevel => self.advance(rules),
            // A shuffle during the pending window already dealt the new grid.
            Action::Regenerate if !self.regenerate_pending => Transition::unchanged(self),
            Action::Regenerate => self.generate(rules, rng),
        }
    }

    fn generate<R: Rng + ?Sized>(&self, rules: &Rules, rng: &mut R) -> Transition {
        let size = grid_size_for_level(self.level);
        let puzzle = Puzzle::shuffled(size, rng, rules.solvable_only);
        let epoch = self.timer_epoch + 1;

        debug!(
            level = self.level,
            size,
            solvable = puzzle.is_solvable(),
            "generated puzzle\n{puzzle}"
        );

        let state = Self {
            puzzle,
            elapsed_seconds: 0,
            timer_active: true,
            game_won: false,
            timer_epoch: epoch,
            regenerate_pending: false,
            ..self.clone()
        };
        Transition {
            state,
            effects: vec![Effect::StartTimer { epoch }],
        }
    }

    fn tap(&self, position: usize) -> Transition {
        if self.game_won {
            trace!(position, "tap ignored on solved puzzle");
            return Transition::unchanged(self);
        }

        let Some(puzzle) = self.puzzle.try_tap(position) else {
            trace!(position, "illegal tap");
            return Transition::unchanged(self);
        };

        let mut effects = vec![Effect::Play(Sound::Move)];
        let solved = puzzle.is_solved();
        if solved {
            info!(
                level = self.level,
                seconds = self.elapsed_seconds,
                "puzzle solved"
            );
            effects.push(Effect::Play(Sound::Win));
            effects.push(Effect::StopTimer);
        }

        let state = Self {
            puzzle,
            game_won: solved,
            timer_active: !solved,
            ..self.clone()
        };
        Transition { state, effects }
    }

    fn tick(&self, epoch: u64) -> Transition {
        if !self.timer_active || epoch != self.timer_epoch {
            return Transition::unchanged(self);
        }

        Transition {
            state: Self {
                elapsed_seconds: self.elapsed_seconds + 1,
                ..self.clone()
            },
            effects: Vec::new(),
        }
    }

    fn advance(&self, rules: &Rules) -> Transition {
        if !self.game_won || self.regenerate_pending {
            return Transition::unchanged(self);
        }

        let (level, image_index) = advance_level(self.level, self.image_count);
        info!(level, image_index, "advancing level");

        Transition {
            state: Self {
                level,
                image_index,
                regenerate_pending: true,
                ..self.clone()
            },
            effects: vec![Effect::ScheduleRegenerate(rules.regenerate_delay)],
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn tiles(&self) -> &[usize] {
        self.puzzle.tiles()
    }

    pub fn grid_size(&self) -> usize {
        self.puzzle.size()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn image_index(&self) -> usize {
        self.image_index
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn game_won(&self) -> bool {
        self.game_won
    }

    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    pub fn regenerate_pending(&self) -> bool {
        self.regenerate_pending
    }
}
