use rand::{seq::SliceRandom, Rng};
use std::fmt;

/// Direction a tile slides into the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Left,
    Down,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Left, Move::Down, Move::Right];

    /// (row, col) offset from the blank to the tile that slides into it.
    pub fn as_offset(&self) -> (isize, isize) {
        match self {
            Move::Up => (1, 0),
            Move::Left => (0, 1),
            Move::Down => (-1, 0),
            Move::Right => (0, -1),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Move::Up => "up",
            Move::Left => "left",
            Move::Down => "down",
            Move::Right => "right",
        })
    }
}

/// Side length of the grid used at `level`.
pub fn grid_size_for_level(level: u32) -> usize {
    match level {
        0..=3 => 2,
        4..=10 => 3,
        11..=13 => 4,
        _ => 5,
    }
}

/// Next level and the picture it uses. The picture depends only on the new
/// level, so level 1 always shows picture 0.
pub fn advance_level(level: u32, image_count: usize) -> (u32, usize) {
    let next = level.saturating_add(1);
    let image = (next - 1) as usize % image_count.max(1);
    (next, image)
}

/// Four-directional adjacency on a row-major `size x size` grid.
pub fn is_adjacent(a: usize, b: usize, size: usize) -> bool {
    let (row_a, col_a) = (a / size, a % size);
    let (row_b, col_b) = (b / size, b % size);

    (row_a == row_b && col_a.abs_diff(col_b) == 1) || (col_a == col_b && row_a.abs_diff(row_b) == 1)
}

/// A tile arrangement. `tiles[i] == v` means the fragment whose home is `v`
/// is shown at position `i`; the largest value is the blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    size: usize,
    tiles: Vec<usize>,
}

impl Puzzle {
    /// The solved arrangement. Sizes below 2 are raised to 2.
    pub fn solved(size: usize) -> Self {
        let size = size.max(2);
        Self {
            size,
            tiles: (0..size * size).collect(),
        }
    }

    /// Builds a puzzle from an explicit arrangement, rejecting anything that
    /// is not a permutation of `0..size*size`.
    pub fn from_tiles(size: usize, tiles: Vec<usize>) -> Option<Self> {
        if size < 2 || tiles.len() != size * size {
            return None;
        }
        let mut seen = vec![false; tiles.len()];
        for &value in &tiles {
            if value >= seen.len() || seen[value] {
                return None;
            }
            seen[value] = true;
        }
        Some(Self { size, tiles })
    }

    /// Uniform shuffle, retried until the result is not already solved.
    /// With `solvable_only` the result must also be reachable by sliding.
    pub fn shuffled<R: Rng + ?Sized>(size: usize, rng: &mut R, solvable_only: bool) -> Self {
        let mut puzzle = Self::solved(size);

        loop {
            puzzle.tiles.shuffle(rng);

            if puzzle.is_solved() {
                continue;
            }
            if solvable_only && !puzzle.is_solvable() {
                continue;
            }
            break;
        }

        puzzle
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tiles(&self) -> &[usize] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn blank(&self) -> usize {
        self.tiles.len() - 1
    }

    pub fn blank_position(&self) -> usize {
        // A well-formed permutation always holds the blank.
        self.tiles
            .iter()
            .position(|&value| value == self.blank())
            .unwrap_or(self.blank())
    }

    /// Home (row, col) of the fragment with the given value.
    pub fn home_cell(&self, value: usize) -> (usize, usize) {
        (value / self.size, value % self.size)
    }

    /// Swaps the tile at `tapped` with the blank. Returns false, leaving the
    /// arrangement untouched, when the tap is on the blank or not next to it.
    pub fn tap(&mut self, tapped: usize) -> bool {
        let blank = self.blank_position();

        if tapped >= self.tiles.len() || tapped == blank || !is_adjacent(tapped, blank, self.size) {
            return false;
        }

        self.tiles.swap(tapped, blank);
        true
    }

    pub fn try_tap(&self, tapped: usize) -> Option<Self> {
        let mut next = self.clone();
        if next.tap(tapped) {
            Some(next)
        } else {
            None
        }
    }

    /// Position of the tile that would slide into the blank, if any.
    pub fn neighbor(&self, movement: Move) -> Option<usize> {
        let blank = self.blank_position();
        let (dr, dc) = movement.as_offset();

        let row = (blank / self.size) as isize + dr;
        let col = (blank % self.size) as isize + dc;
        let size = self.size as isize;

        if row >= 0 && row < size && col >= 0 && col < size {
            Some((row * size + col) as usize)
        } else {
            None
        }
    }

    pub fn apply_move(&mut self, movement: Move) -> bool {
        match self.neighbor(movement) {
            Some(position) => self.tap(position),
            None => false,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.tiles.iter().enumerate().all(|(i, &value)| i == value)
    }

    /// Whether the solved arrangement can be reached by sliding moves.
    pub fn is_solvable(&self) -> bool {
        let inversions = Self::count_inversions(&self.tiles);
        let blank_row = self.blank_position() / self.size;

        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            // The solved blank sits on row size-1, which is odd here.
            (inversions + blank_row) % 2 == 1
        }
    }

    fn count_inversions(tiles: &[usize]) -> usize {
        let blank = tiles.len() - 1;

        tiles
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != blank)
            .map(|(i, &value)| {
                tiles[i + 1..]
                    .iter()
                    .filter(|&&next| next != blank && next < value)
                    .count()
            })
            .sum()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.tiles.len().to_string().len();
        for row in self.tiles.chunks(self.size) {
            for &value in row {
                if value == self.blank() {
                    write!(f, "{:>width$} ", ".")?;
                } else {
                    write!(f, "{:>width$} ", value + 1)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::{HashSet, VecDeque};

    #[test]
    fn grid_size_breakpoints() {
        let expected = [
            (1, 2),
            (2, 2),
            (3, 2),
            (4, 3),
            (10, 3),
            (11, 4),
            (13, 4),
            (14, 5),
            (100, 5),
        ];
        for (level, size) in expected {
            assert_eq!(grid_size_for_level(level), size, "level {level}");
        }
    }

    #[test]
    fn advance_level_cycles_pictures() {
        assert_eq!(advance_level(5, 15), (6, 5));
        assert_eq!(advance_level(15, 15), (16, 0));
        assert_eq!(advance_level(1, 15), (2, 1));
    }

    #[test]
    fn adjacency_is_four_directional_without_wrap() {
        // 0 1 2
        // 3 4 5
        // 6 7 8
        assert!(is_adjacent(4, 1, 3));
        assert!(is_adjacent(4, 3, 3));
        assert!(is_adjacent(4, 5, 3));
        assert!(is_adjacent(4, 7, 3));
        assert!(!is_adjacent(4, 0, 3));
        assert!(!is_adjacent(4, 8, 3));
        assert!(!is_adjacent(2, 3, 3));
        assert!(!is_adjacent(4, 4, 3));
    }

    #[test]
    fn tap_next_to_blank_swaps() {
        let mut puzzle = Puzzle::solved(2);
        assert!(puzzle.tap(2));
        assert_eq!(puzzle.tiles(), &[0, 1, 3, 2]);
        assert_eq!(puzzle.blank_position(), 2);
    }

    #[test]
    fn illegal_taps_are_ignored() {
        let puzzle = Puzzle::from_tiles(3, vec![0, 1, 2, 3, 8, 5, 6, 7, 4]).unwrap();
        assert!(puzzle.try_tap(4).is_none(), "blank itself");
        assert!(puzzle.try_tap(0).is_none(), "diagonal");
        assert!(puzzle.try_tap(9).is_none(), "out of range");
        assert!(puzzle.try_tap(1).is_some());
    }

    #[test]
    fn directional_moves_pick_the_right_neighbor() {
        // Blank in the centre of a 3x3.
        let puzzle = Puzzle::from_tiles(3, vec![0, 1, 2, 3, 8, 5, 6, 7, 4]).unwrap();
        assert_eq!(puzzle.neighbor(Move::Up), Some(7));
        assert_eq!(puzzle.neighbor(Move::Down), Some(1));
        assert_eq!(puzzle.neighbor(Move::Left), Some(5));
        assert_eq!(puzzle.neighbor(Move::Right), Some(3));

        // Blank in the bottom-right corner.
        let solved = Puzzle::solved(3);
        assert_eq!(solved.neighbor(Move::Up), None);
        assert_eq!(solved.neighbor(Move::Left), None);
        assert_eq!(solved.neighbor(Move::Down), Some(5));
        assert_eq!(solved.neighbor(Move::Right), Some(7));
    }

    #[test]
    fn reversed_slides_restore_the_picture() {
        let mut puzzle = Puzzle::solved(4);
        assert!(puzzle.apply_move(Move::Down));
        assert!(puzzle.apply_move(Move::Right));
        assert!(puzzle.apply_move(Move::Left));
        assert!(puzzle.apply_move(Move::Up));
        assert!(puzzle.is_solved());
    }

    #[test]
    fn moves_display_in_lowercase() {
        let names: Vec<String> = Move::ALL.iter().map(Move::to_string).collect();
        assert_eq!(names, ["up", "left", "down", "right"]);
    }

    #[test]
    fn from_tiles_rejects_non_permutations() {
        assert!(Puzzle::from_tiles(2, vec![0, 1, 2]).is_none());
        assert!(Puzzle::from_tiles(2, vec![0, 1, 1, 3]).is_none());
        assert!(Puzzle::from_tiles(2, vec![0, 1, 2, 4]).is_none());
        assert!(Puzzle::from_tiles(1, vec![0]).is_none());
    }

    #[test]
    fn shuffled_is_never_solved() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let puzzle = Puzzle::shuffled(2, &mut rng, false);
            assert!(!puzzle.is_solved());
        }
    }

    #[test]
    fn solvable_only_filters_parity() {
        let mut rng = StdRng::seed_from_u64(11);
        for size in 2..=5 {
            for _ in 0..50 {
                assert!(Puzzle::shuffled(size, &mut rng, true).is_solvable());
            }
        }
    }

    #[test]
    fn solvability_matches_reachability_on_two_by_two() {
        let mut reachable = HashSet::new();
        let mut queue = VecDeque::from([Puzzle::solved(2)]);
        while let Some(puzzle) = queue.pop_front() {
            if !reachable.insert(puzzle.tiles().to_vec()) {
                continue;
            }
            for movement in Move::ALL {
                let mut next = puzzle.clone();
                if next.apply_move(movement) {
                    queue.push_back(next);
                }
            }
        }
        assert_eq!(reachable.len(), 12);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let puzzle = Puzzle::shuffled(2, &mut rng, false);
            assert_eq!(
                puzzle.is_solvable(),
                reachable.contains(puzzle.tiles()),
                "{puzzle}"
            );
        }
    }

    #[test]
    fn display_marks_the_blank() {
        let puzzle = Puzzle::solved(2);
        assert_eq!(puzzle.to_string(), "1 2 \n3 . \n");
    }
}
