use std::collections::{HashSet, VecDeque};

use rand::Rng;

/// `(row, col)`, 0-indexed.
pub type Pos = (usize, usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellContent {
    Mine,
    /// Number of mines among the 8 neighbours, `0..=8`.
    Adjacent(u8),
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub content: CellContent,
    opened: bool,
    flagged: bool,
}

impl Cell {
    fn closed() -> Self {
        Self {
            content: CellContent::Adjacent(0),
            opened: false,
            flagged: false,
        }
    }

    pub fn is_mine(&self) -> bool {
        matches!(self.content, CellContent::Mine)
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    // Opening always drops the flag, a cell is never both.
    fn open(&mut self) {
        self.opened = true;
        self.flagged = false;
    }
}

#[derive(Clone, Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    pub fn empty(rows: usize, cols: usize) -> Self {
        let cells = (0..rows)
            .map(|_| (0..cols).map(|_| Cell::closed()).collect())
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell(&self, (row, col): Pos) -> Option<&Cell> {
        self.cells.get(row)?.get(col)
    }

    pub fn has_mines(&self) -> bool {
        self.cells.iter().flatten().any(Cell::is_mine)
    }

    pub fn neighbours(&self, (row, col): Pos) -> Vec<Pos> {
        let mut out = Vec::with_capacity(8);
        for row_offset in -1..=1isize {
            for col_offset in -1..=1isize {
                if row_offset == 0 && col_offset == 0 {
                    continue;
                }
                let row = row as isize + row_offset;
                let col = col as isize + col_offset;
                if row >= 0
                    && col >= 0
                    && (row as usize) < self.rows
                    && (col as usize) < self.cols
                {
                    out.push((row as usize, col as usize));
                }
            }
        }
        out
    }

    /// Places `total` mines by rejection sampling, keeping the first click and
    /// its neighbours mine-free, then fills in the adjacency numbers. When the
    /// board is too tight to spare the whole neighbourhood, only the clicked
    /// cell itself stays safe, so sampling still terminates for any mine count
    /// below the cell count.
    pub fn place_mines(&mut self, first: Pos, total: usize, rng: &mut impl Rng) {
        let mut safe: HashSet<Pos> = HashSet::from([first]);
        safe.extend(self.neighbours(first));
        if total > self.rows * self.cols - safe.len() {
            safe = HashSet::from([first]);
        }

        let mut placed = 0;
        while placed < total {
            let pos = (
                rng.random_range(0..self.rows),
                rng.random_range(0..self.cols),
            );
            if safe.contains(&pos) || self.cells[pos.0][pos.1].is_mine() {
                continue;
            }
            self.cells[pos.0][pos.1].content = CellContent::Mine;
            placed += 1;
        }

        self.fill_counts();
    }

    fn fill_counts(&mut self) {
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.cells[row][col].is_mine() {
                    continue;
                }
                let mines = self
                    .neighbours((row, col))
                    .into_iter()
                    .filter(|&(r, c)| self.cells[r][c].is_mine())
                    .count();
                self.cells[row][col].content = CellContent::Adjacent(mines as u8);
            }
        }
    }

    /// Opens the cell at `start` and, from every zero-adjacency cell reached,
    /// expands breadth-first into closed, unflagged, non-mine neighbours.
    /// Returns how many cells went from closed to opened.
    pub fn flood_open(&mut self, start: Pos) -> usize {
        let mut visited: HashSet<Pos> = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut newly_opened = 0;

        while let Some(pos) = queue.pop_front() {
            if !visited.insert(pos) {
                continue;
            }
            let is_zero = {
                let cell = &mut self.cells[pos.0][pos.1];
                if !cell.opened {
                    cell.open();
                    newly_opened += 1;
                }
                cell.content == CellContent::Adjacent(0)
            };
            if !is_zero {
                continue;
            }
            for neighbour in self.neighbours(pos) {
                let cell = &self.cells[neighbour.0][neighbour.1];
                if !cell.opened && !cell.flagged && !cell.is_mine() {
                    queue.push_back(neighbour);
                }
            }
        }

        newly_opened
    }

    pub fn open_all_mines(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            if cell.is_mine() {
                cell.open();
            }
        }
    }

    /// Returns whether the cell is flagged after the toggle.
    pub fn toggle_flag(&mut self, (row, col): Pos) -> bool {
        let cell = &mut self.cells[row][col];
        cell.flagged = !cell.flagged;
        cell.flagged
    }

    #[cfg(test)]
    pub(crate) fn with_mines(rows: usize, cols: usize, mines: &[Pos]) -> Self {
        let mut board = Self::empty(rows, cols);
        for &(row, col) in mines {
            board.cells[row][col].content = CellContent::Mine;
        }
        board.fill_counts();
        board
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn neighbours_are_clipped_to_bounds() {
        let board = Board::empty(3, 3);
        assert_eq!(board.neighbours((0, 0)).len(), 3);
        assert_eq!(board.neighbours((0, 1)).len(), 5);
        assert_eq!(board.neighbours((1, 1)).len(), 8);
    }

    #[test]
    fn empty_board_has_no_mines() {
        let board = Board::empty(4, 5);
        assert_eq!(board.rows(), 4);
        assert_eq!(board.cols(), 5);
        assert!(!board.has_mines());
        for row in 0..4 {
            for col in 0..5 {
                let cell = board.cell((row, col)).unwrap();
                assert_eq!(cell.content, CellContent::Adjacent(0));
                assert!(!cell.is_opened());
                assert!(!cell.is_flagged());
            }
        }
    }

    #[test]
    fn mines_avoid_first_click_and_its_neighbours() {
        for seed in 0..20 {
            let mut board = Board::empty(9, 9);
            let mut rng = StdRng::seed_from_u64(seed);
            board.place_mines((4, 4), 10, &mut rng);

            let mines = (0..9)
                .flat_map(|r| (0..9).map(move |c| (r, c)))
                .filter(|&pos| board.cell(pos).unwrap().is_mine())
                .count();
            assert_eq!(mines, 10);

            assert!(!board.cell((4, 4)).unwrap().is_mine());
            for pos in board.neighbours((4, 4)) {
                assert!(!board.cell(pos).unwrap().is_mine(), "mine at {pos:?}");
            }
        }
    }

    #[test]
    fn tight_board_keeps_only_the_clicked_cell_safe() {
        // 2x2 with one mine: the neighbourhood covers the whole board, so the
        // safe set degrades to the clicked cell alone.
        for seed in 0..20 {
            let mut board = Board::empty(2, 2);
            let mut rng = StdRng::seed_from_u64(seed);
            board.place_mines((0, 0), 1, &mut rng);
            assert!(!board.cell((0, 0)).unwrap().is_mine());
            assert!(board.has_mines());
        }
    }

    #[test]
    fn counts_match_the_mine_layout() {
        // . 1 x
        // . 2 2
        // . 1 x
        let board = Board::with_mines(3, 3, &[(0, 2), (2, 2)]);
        let count = |pos: Pos| board.cell(pos).unwrap().content;
        assert_eq!(count((0, 0)), CellContent::Adjacent(0));
        assert_eq!(count((0, 1)), CellContent::Adjacent(1));
        assert_eq!(count((0, 2)), CellContent::Mine);
        assert_eq!(count((1, 1)), CellContent::Adjacent(2));
        assert_eq!(count((1, 2)), CellContent::Adjacent(2));
        assert_eq!(count((2, 1)), CellContent::Adjacent(1));
    }

    #[test]
    fn flood_open_expands_through_zero_regions_only() {
        // Mine in the far corner: everything else is one connected region of
        // zeroes plus its numbered border, so one flood opens all safe cells.
        let mut board = Board::with_mines(4, 4, &[(3, 3)]);
        let opened = board.flood_open((0, 0));
        assert_eq!(opened, 15);
        assert!(!board.cell((3, 3)).unwrap().is_opened());
    }

    #[test]
    fn flood_open_of_numbered_cell_opens_just_that_cell() {
        let mut board = Board::with_mines(3, 3, &[(0, 0)]);
        let opened = board.flood_open((1, 1));
        assert_eq!(opened, 1);
        assert!(board.cell((1, 1)).unwrap().is_opened());
        assert!(!board.cell((2, 2)).unwrap().is_opened());
    }
}
