//! Interactive terminal session.
//!
//! [`App`] owns the single mutable [`PuzzleState`], feeds it actions from
//! the keyboard, the mouse and the tick source, and carries out the effects
//! each transition returns.

use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, warn};

use crate::assets::Catalog;
use crate::audio::Sfx;
use crate::config::Config;
use crate::game::{Action, Effect, PuzzleState, Rules, Transition};
use crate::input::{self, Command};
use crate::render::{self, Frame, Layout};
use crate::timer::{Tick, TickSource};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Raw mode, alternate screen and mouse capture for as long as it lives.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub struct App {
    state: PuzzleState,
    rules: Rules,
    rng: StdRng,
    catalog: Catalog,
    ticks: TickSource,
    tick_rx: Receiver<Tick>,
    sfx: Sfx,
    cursor: usize,
    regenerate_at: Option<Instant>,
    layout: Option<Layout>,
    dirty: bool,
    quit: bool,
}

impl App {
    pub fn new(config: &Config, sfx: Sfx) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let catalog = Catalog::builtin();
        let rules = config.rules();
        let (tick_tx, tick_rx) = mpsc::channel();

        let Transition { state, effects } =
            PuzzleState::new(config.start_level, catalog.len(), &rules, &mut rng);
        info!(level = state.level(), size = state.grid_size(), "session started");

        let mut app = Self {
            cursor: state.puzzle().blank_position(),
            state,
            rules,
            rng,
            catalog,
            ticks: TickSource::new(config.tick_period(), tick_tx),
            tick_rx,
            sfx,
            regenerate_at: None,
            layout: None,
            dirty: true,
            quit: false,
        };
        app.execute(effects, Instant::now());
        app
    }

    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_quitting(&self) -> bool {
        self.quit
    }

    pub fn dispatch(&mut self, action: Action) {
        let transition = self.state.apply(action, &self.rules, &mut self.rng);
        if transition.is_noop(&self.state) {
            return;
        }

        let regrid = transition.state.timer_epoch() != self.state.timer_epoch();
        self.state = transition.state;
        if regrid {
            self.cursor = self.state.puzzle().blank_position();
        }
        if !self.state.regenerate_pending() {
            self.regenerate_at = None;
        }
        self.dirty = true;
        self.execute(transition.effects, Instant::now());
    }

    fn execute(&mut self, effects: Vec<Effect>, now: Instant) {
        for effect in effects {
            debug!(?effect, "effect");
            match effect {
                Effect::Play(sound) => {
                    // Fire and forget.
                    let _ = self.sfx.play(sound);
                }
                Effect::StartTimer { epoch } => {
                    if let Err(err) = self.ticks.start(epoch) {
                        warn!(epoch, "failed to start timer: {err}");
                    }
                }
                Effect::StopTimer => self.ticks.stop(),
                Effect::ScheduleRegenerate(delay) => self.regenerate_at = Some(now + delay),
            }
        }
    }

    pub fn handle(&mut self, command: Command) {
        match command {
            Command::SetCursor(position) => {
                self.cursor = position;
                self.dirty = true;
            }
            Command::Tap(position) => {
                self.cursor = position;
                self.dirty = true;
                self.dispatch(Action::Tap(position));
            }
            Command::Dispatch(action) => self.dispatch(action),
            Command::Redraw => {
                self.layout = None;
                self.dirty = true;
            }
            Command::Quit => self.quit = true,
            Command::Ignore => {}
        }
    }

    /// Applies queued ticks and a due regeneration.
    pub fn pump(&mut self, now: Instant) {
        while let Ok(Tick { epoch }) = self.tick_rx.try_recv() {
            self.dispatch(Action::Tick { epoch });
        }

        if self.regenerate_at.is_some_and(|at| now >= at) {
            self.regenerate_at = None;
            self.dispatch(Action::Regenerate);
        }
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.regenerate_at {
            Some(at) => at.saturating_duration_since(now).min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        }
    }

    fn draw(&mut self, out: &mut Stdout) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let layout = Layout::compute(cols, rows, self.state.grid_size());
        let clear = self.layout != Some(layout);

        let frame = Frame {
            state: &self.state,
            picture: self.catalog.get(self.state.image_index()),
            cursor: self.cursor,
            layout,
            audio: self.sfx.backend_name(),
        };
        render::draw(out, &frame, clear)?;

        self.layout = Some(layout);
        self.dirty = false;
        Ok(())
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut guard = TerminalGuard::enter()?;

        while !self.quit {
            if self.dirty {
                self.draw(&mut guard.stdout)?;
            }

            if event::poll(self.poll_timeout(Instant::now()))? {
                let event = event::read()?;
                let command = input::command_for(
                    &event,
                    self.cursor,
                    self.state.grid_size(),
                    self.layout.as_ref(),
                );
                self.handle(command);
            }
            self.pump(Instant::now());
        }

        self.ticks.stop();
        info!(level = self.state.level(), "session ended");
        Ok(())
    }
}
