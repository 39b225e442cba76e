use alloc::collections::VecDeque;
use core::ops::BitOr;
use ndarray::Array2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Outcome of a [`Board::reveal`] call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the board.
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            HitMine => true,
        }
    }
}

/// Used to merge outcomes while the flood-fill worklist drains.
impl BitOr for RevealOutcome {
    type Output = RevealOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use RevealOutcome::*;
        match (self, rhs) {
            (HitMine, _) => HitMine,
            (_, HitMine) => HitMine,
            (Revealed, _) => Revealed,
            (_, Revealed) => Revealed,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// The board model: a row-major grid of [`Cell`]s plus the loss signal.
///
/// `alive` is true from the moment generation completes until a mine is
/// revealed. Reveals stay mechanically possible after that point; callers
/// decide when to stop feeding input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    width: Coord,
    height: Coord,
    mines: usize,
    cells: Array2<Cell>,
    alive: bool,
}

impl Board {
    /// Builds a board from a known mine placement, deriving every non-mine
    /// cell's value from the 8-neighbor mine count.
    pub fn new(layout: MineLayout) -> Self {
        let (width, height) = layout.size();
        let cells = Array2::from_shape_fn((height, width), |(y, x)| {
            let coords = (x, y);
            let value = if layout.contains_mine(coords) {
                Cell::MINE
            } else {
                layout.adjacent_mine_count(coords) as i8
            };
            Cell {
                value,
                ..Default::default()
            }
        });

        Self {
            width,
            height,
            mines: layout.mine_count(),
            cells,
            alive: true,
        }
    }

    /// Generates a board from a caller-provided randomness source.
    pub fn generate(config: BoardConfig, rng: &mut impl Rng) -> Self {
        Self::new(sample_layout(config, rng))
    }

    pub fn from_seed(config: BoardConfig, seed: u64) -> Self {
        Self::new(RandomLayout::new(seed).generate(config))
    }

    pub const fn width(&self) -> Coord {
        self.width
    }

    pub const fn height(&self) -> Coord {
        self.height
    }

    pub const fn size(&self) -> Coord2 {
        (self.width, self.height)
    }

    pub const fn total_mines(&self) -> usize {
        self.mines
    }

    pub const fn alive(&self) -> bool {
        self.alive
    }

    /// The grid, indexed `[[y, x]]`.
    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub fn cell_at(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if coords.0 < self.width && coords.1 < self.height {
            Ok(coords)
        } else {
            Err(BoardError::OutOfBounds)
        }
    }

    /// In-bounds neighbors of `coords` in fixed scan order.
    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// Neighbors whose cell value equals `target`. `None` is the distinct
    /// unfiltered mode: every in-bounds neighbor, value ignored.
    pub fn matching_neighbors(
        &self,
        coords: Coord2,
        target: Option<i8>,
    ) -> impl Iterator<Item = Coord2> + '_ {
        self.neighbors(coords)
            .filter(move |&pos| target.is_none_or(|value| self.cells[pos.to_nd_index()].value == value))
    }

    /// Reveals the cell at `coords`.
    ///
    /// Already-revealed and flagged cells are no-ops. Revealing a mine drops
    /// `alive`. Revealing a zero-valued cell expands through its whole
    /// zero-valued region plus the surrounding nonzero border, driven by a
    /// worklist where `hidden == false` doubles as the visited marker.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.validate_coords(coords)?;
        let mut outcome = NoChange;
        let mut to_visit = VecDeque::from([coords]);

        while let Some(visit_coords) = to_visit.pop_front() {
            let cell = &mut self.cells[visit_coords.to_nd_index()];
            if !cell.hidden || cell.flag {
                continue;
            }
            cell.hidden = false;
            let value = cell.value;

            if value == Cell::MINE {
                log::debug!("Mine hit at {:?}", visit_coords);
                self.alive = false;
                outcome = outcome | HitMine;
                continue;
            }

            log::trace!("Revealed {:?}, value {}", visit_coords, value);
            outcome = outcome | Revealed;

            if value == 0 {
                to_visit.extend(self.neighbors(visit_coords));
            }
        }

        Ok(outcome)
    }

    /// Flips the flag marker at `coords` and returns the new flag state.
    /// Works on revealed cells too; never touches `hidden` or `value`.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<bool> {
        let coords = self.validate_coords(coords)?;
        let cell = &mut self.cells[coords.to_nd_index()];
        cell.flag = !cell.flag;
        Ok(cell.flag)
    }

    /// Uncovers every cell, bypassing flag and mine checks. `alive`, flags,
    /// and values stay as they were.
    pub fn reveal_all(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.hidden = false;
        }
    }

    /// Derived win condition: still alive and every non-mine cell revealed.
    pub fn is_cleared(&self) -> bool {
        self.alive && self.cells.iter().all(|cell| cell.is_mine() || !cell.hidden)
    }

    /// How many mines have not been flagged yet.
    pub fn mines_left(&self) -> isize {
        let flagged = self.cells.iter().filter(|cell| cell.flag).count();
        (self.mines as isize) - (flagged as isize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::new(MineLayout::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn generation_derives_neighbor_counts() {
        let board = board((3, 3), &[(0, 0), (2, 1)]);

        assert_eq!(board.cell_at((0, 0)).unwrap().value, Cell::MINE);
        assert_eq!(board.cell_at((2, 1)).unwrap().value, Cell::MINE);
        assert_eq!(board.cell_at((1, 0)).unwrap().value, 2);
        assert_eq!(board.cell_at((2, 0)).unwrap().value, 1);
        assert_eq!(board.cell_at((1, 1)).unwrap().value, 2);
        assert_eq!(board.cell_at((0, 2)).unwrap().value, 0);
        assert_eq!(board.cell_at((2, 2)).unwrap().value, 1);
        assert!(board.alive());
    }

    #[test]
    fn generation_starts_hidden_and_unflagged() {
        let board = board((3, 2), &[(1, 1)]);

        for cell in board.cells() {
            assert!(cell.hidden);
            assert!(!cell.flag);
        }
    }

    #[test]
    fn seeded_generation_is_exact_and_reproducible() {
        let config = BoardConfig::new(9, 9, 10).unwrap();

        let board = Board::from_seed(config, 42);
        let again = Board::from_seed(config, 42);

        assert_eq!(board, again);
        assert_eq!(board.total_mines(), 10);

        let mine_cells = board.cells().iter().filter(|cell| cell.is_mine()).count();
        assert_eq!(mine_cells, 10);

        for y in 0..board.height() {
            for x in 0..board.width() {
                let cell = board.cell_at((x, y)).unwrap();
                if cell.is_mine() {
                    continue;
                }
                let adjacent = board.matching_neighbors((x, y), Some(Cell::MINE)).count();
                assert_eq!(cell.value as usize, adjacent);
            }
        }
    }

    #[test]
    fn too_many_mines_is_rejected() {
        assert_eq!(
            BoardConfig::new(2, 2, 5),
            Err(BoardError::InvalidConfiguration)
        );
    }

    #[test]
    fn mine_count_equal_to_cell_count_is_legal() {
        let config = BoardConfig::new(1, 1, 1).unwrap();
        let mut board = Board::from_seed(config, 0);

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::HitMine));
        assert!(!board.alive());
    }

    #[test]
    fn layout_rejects_out_of_bounds_mine_coords() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(BoardError::OutOfBounds)
        );
    }

    #[test]
    fn flag_blocks_reveal_until_cleared() {
        let mut board = board((2, 2), &[(1, 1)]);

        assert_eq!(board.toggle_flag((0, 0)), Ok(true));
        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert!(board.cell_at((0, 0)).unwrap().hidden);

        assert_eq!(board.toggle_flag((0, 0)), Ok(false));
        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::Revealed));
        assert!(!board.cell_at((0, 0)).unwrap().hidden);
        assert!(board.alive());
    }

    #[test]
    fn reveal_is_idempotent() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::Revealed));
        let snapshot = board.clone();

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::NoChange));
        assert_eq!(board, snapshot);
    }

    #[test]
    fn revealing_a_mine_kills_the_board() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::HitMine));
        assert!(!board.alive());
        assert!(board.cell_at((1, 1)).unwrap().hidden);

        // post-game reveals stay mechanically possible
        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::Revealed));
        assert!(!board.alive());
    }

    #[test]
    fn flood_fill_stops_at_the_nonzero_border() {
        // values along the strip: 0 0 0 1 MINE
        let mut board = board((5, 1), &[(4, 0)]);

        assert_eq!(board.reveal((0, 0)), Ok(RevealOutcome::Revealed));

        for x in 0..4 {
            assert!(!board.cell_at((x, 0)).unwrap().hidden);
        }
        assert!(board.cell_at((4, 0)).unwrap().hidden);
        assert!(board.alive());
    }

    #[test]
    fn flood_fill_skips_flagged_cells() {
        let mut board = board((3, 3), &[]);

        board.toggle_flag((2, 2)).unwrap();
        board.reveal((0, 0)).unwrap();

        assert!(board.cell_at((2, 2)).unwrap().hidden);
        assert!(!board.cell_at((1, 2)).unwrap().hidden);
    }

    #[test]
    fn zero_mine_board_floods_entirely_from_the_center() {
        let mut board = board((3, 3), &[]);

        assert_eq!(board.reveal((1, 1)), Ok(RevealOutcome::Revealed));

        for cell in board.cells() {
            assert_eq!(cell.value, 0);
            assert!(!cell.hidden);
        }
        assert!(board.alive());
        assert!(board.is_cleared());
    }

    #[test]
    fn reveal_all_uncovers_everything() {
        let mut board = board((3, 3), &[(1, 1)]);

        board.toggle_flag((0, 0)).unwrap();
        board.reveal_all();

        for cell in board.cells() {
            assert!(!cell.hidden);
        }
        assert!(board.alive());
        assert!(board.cell_at((0, 0)).unwrap().flag);
    }

    #[test]
    fn out_of_bounds_coordinates_are_errors() {
        let mut board = board((3, 3), &[]);

        assert_eq!(board.reveal((3, 0)), Err(BoardError::OutOfBounds));
        assert_eq!(board.toggle_flag((0, 5)), Err(BoardError::OutOfBounds));
        assert!(board.cell_at((3, 3)).is_none());
    }

    #[test]
    fn toggle_flag_works_on_revealed_cells() {
        let mut board = board((2, 2), &[(1, 1)]);

        board.reveal((0, 0)).unwrap();
        assert_eq!(board.toggle_flag((0, 0)), Ok(true));
        assert!(!board.cell_at((0, 0)).unwrap().hidden);
    }

    #[test]
    fn value_filter_distinguishes_zero_from_unfiltered() {
        // neighbor values around the center: M 1 0 / 1 _ 0 / 0 0 0
        let board = board((3, 3), &[(0, 0)]);

        let unfiltered = board.matching_neighbors((1, 1), None).count();
        let zeros = board.matching_neighbors((1, 1), Some(0)).count();
        let mines = board.matching_neighbors((1, 1), Some(Cell::MINE)).count();

        assert_eq!(unfiltered, 8);
        assert_eq!(zeros, 5);
        assert_eq!(mines, 1);
    }

    #[test]
    fn clearing_every_safe_cell_is_a_win() {
        let mut board = board((2, 1), &[(0, 0)]);

        assert!(!board.is_cleared());
        board.reveal((1, 0)).unwrap();
        assert!(board.is_cleared());
    }

    #[test]
    fn mines_left_tracks_flag_toggles() {
        let mut board = board((3, 3), &[(1, 1)]);

        assert_eq!(board.mines_left(), 1);
        board.toggle_flag((0, 0)).unwrap();
        board.toggle_flag((2, 2)).unwrap();
        assert_eq!(board.mines_left(), -1);
        board.toggle_flag((0, 0)).unwrap();
        assert_eq!(board.mines_left(), 0);
    }
}
