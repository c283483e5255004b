//! Whole-game scenarios driven through `PuzzleState` transitions.

use std::collections::{HashMap, VecDeque};

use picture_slider::game::{Action, Effect, PuzzleState, Rules, Sound};
use picture_slider::puzzle::{grid_size_for_level, Move, Puzzle};
use rand::{rngs::StdRng, SeedableRng};

/// Shortest list of slides from `start` to the solved arrangement.
fn solve(start: &Puzzle) -> Vec<Move> {
    let mut parent: HashMap<Vec<usize>, Option<(Vec<usize>, Move)>> = HashMap::new();
    let mut queue = VecDeque::from([start.clone()]);
    parent.insert(start.tiles().to_vec(), None);

    while let Some(puzzle) = queue.pop_front() {
        if puzzle.is_solved() {
            let mut path = Vec::new();
            let mut key = puzzle.tiles().to_vec();
            while let Some(Some((prev, movement))) = parent.get(&key) {
                path.push(*movement);
                key = prev.clone();
            }
            path.reverse();
            return path;
        }
        for movement in Move::ALL {
            let mut next = puzzle.clone();
            if next.apply_move(movement) && !parent.contains_key(next.tiles()) {
                parent.insert(next.tiles().to_vec(), Some((puzzle.tiles().to_vec(), movement)));
                queue.push_back(next);
            }
        }
    }
    panic!("unsolvable arrangement:\n{start}");
}

#[test]
fn first_level_shuffle_then_solve() {
    let rules = Rules {
        solvable_only: true,
        ..Rules::default()
    };
    let mut rng = StdRng::seed_from_u64(2024);

    let mut state = PuzzleState::new(1, 15, &rules, &mut rng).state;
    assert_eq!(state.grid_size(), 2);
    let mut sorted = state.tiles().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2, 3]);
    assert_ne!(state.tiles(), &[0, 1, 2, 3]);
    assert!(state.timer_active());

    let path = solve(state.puzzle());
    assert!(!path.is_empty());

    let mut last_effects = Vec::new();
    for movement in path {
        assert!(!state.game_won());
        let transition = state.apply(Action::Slide(movement), &rules, &mut rng);
        assert!(transition.effects.contains(&Effect::Play(Sound::Move)));
        state = transition.state;
        last_effects = transition.effects;
    }

    assert!(state.puzzle().is_solved());
    assert!(state.game_won());
    assert!(!state.timer_active());
    assert!(last_effects.contains(&Effect::Play(Sound::Win)));
    assert!(last_effects.contains(&Effect::StopTimer));
}

#[test]
fn level_fourteen_deals_twenty_five_tiles() {
    assert_eq!(grid_size_for_level(14), 5);

    let mut rng = StdRng::seed_from_u64(14);
    let state = PuzzleState::new(14, 15, &Rules::default(), &mut rng).state;
    assert_eq!(state.grid_size(), 5);
    assert_eq!(state.image_index(), 13);

    let tiles = state.tiles();
    assert_eq!(tiles.len(), 25);
    let mut sorted = tiles.to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..25).collect::<Vec<_>>());
    assert_eq!(tiles.iter().filter(|&&v| v == 24).count(), 1);
}

#[test]
fn solving_and_advancing_moves_to_the_next_picture() {
    let rules = Rules {
        solvable_only: true,
        ..Rules::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut state = PuzzleState::new(3, 15, &rules, &mut rng).state;

    for movement in solve(state.puzzle()) {
        state = state.apply(Action::Slide(movement), &rules, &mut rng).state;
    }
    assert!(state.game_won());

    let advanced = state.apply(Action::AdvanceLevel, &rules, &mut rng);
    assert_eq!(
        advanced.effects,
        vec![Effect::ScheduleRegenerate(rules.regenerate_delay)]
    );
    let state = advanced.state;
    assert_eq!((state.level(), state.image_index()), (4, 3));

    let state = state.apply(Action::Regenerate, &rules, &mut rng).state;
    assert_eq!(state.grid_size(), 3);
    assert!(state.puzzle().is_solvable());
    assert!(!state.game_won());
    assert_eq!(state.elapsed_seconds(), 0);
}
