use rand::Rng;

use crate::board::{Board, Cell, Pos};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won,
    Lost,
}

/// One immutable game state. Every accepted move copies the board and returns
/// a new session; references to the old one keep observing the pre-move state.
/// Mines do not exist until the first reveal, which anchors the safe zone.
#[derive(Clone, Debug)]
pub struct Session {
    board: Board,
    status: Status,
    total_mines: usize,
    opened: usize,
    flagged: usize,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self {
            board: Board::empty(config.rows(), config.cols()),
            status: Status::InProgress,
            total_mines: config.mines(),
            opened: 0,
            flagged: 0,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::InProgress
    }

    pub fn is_won(&self) -> bool {
        self.status == Status::Won
    }

    pub fn is_completed(&self) -> bool {
        self.is_over() && self.is_won()
    }

    pub fn count_flagged(&self) -> usize {
        self.flagged
    }

    pub fn opened(&self) -> usize {
        self.opened
    }

    pub fn total_mines(&self) -> usize {
        self.total_mines
    }

    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    pub fn cols(&self) -> usize {
        self.board.cols()
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.board.cell(pos)
    }

    /// Reveals with the thread-local generator. See [`Session::reveal_with`].
    pub fn reveal(&self, pos: Pos) -> Session {
        self.reveal_with(pos, &mut rand::rng())
    }

    /// Opens the cell at `pos`. On the first reveal of the session this also
    /// places the mines, keeping `pos` and its neighbours clear. Revealing a
    /// mine afterwards opens every mine and ends the game as a loss. Finished
    /// games and opened, flagged, or out-of-bounds targets are no-ops that
    /// hand back an unchanged session.
    pub fn reveal_with(&self, pos: Pos, rng: &mut impl Rng) -> Session {
        let Some(cell) = self.board.cell(pos) else {
            return self.clone();
        };
        if self.is_over() || cell.is_opened() || cell.is_flagged() {
            return self.clone();
        }

        if self.is_untouched() {
            return self.first_reveal(pos, rng);
        }

        let mut next = self.clone();
        if cell.is_mine() {
            next.board.open_all_mines();
            next.status = Status::Lost;
            return next;
        }

        next.opened += next.board.flood_open(pos);
        next.check_win();
        next
    }

    /// Flips the flag on a closed cell. No-op on finished games, opened
    /// targets, and out-of-bounds targets.
    pub fn toggle_flag(&self, pos: Pos) -> Session {
        let Some(cell) = self.board.cell(pos) else {
            return self.clone();
        };
        if self.is_over() || cell.is_opened() {
            return self.clone();
        }

        let mut next = self.clone();
        if next.board.toggle_flag(pos) {
            next.flagged += 1;
        } else {
            next.flagged -= 1;
        }
        next
    }

    // No cell opened and no mine placed yet: the next reveal generates the
    // board.
    fn is_untouched(&self) -> bool {
        self.opened == 0 && !self.board.has_mines()
    }

    fn first_reveal(&self, pos: Pos, rng: &mut impl Rng) -> Session {
        let mut next = self.clone();
        next.board.place_mines(pos, self.total_mines, rng);
        next.opened += next.board.flood_open(pos);
        next.check_win();
        next
    }

    fn check_win(&mut self) {
        // A loss stays a loss.
        if self.status != Status::InProgress {
            return;
        }
        if self.opened == self.rows() * self.cols() - self.total_mines {
            self.status = Status::Won;
        }
    }
}
