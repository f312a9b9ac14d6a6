use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::game::Session;

/// End-of-game record handed to whatever persistence layer sits on top of the
/// engine. The engine only contributes its counters; difficulty label and
/// elapsed time are measured by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReport {
    pub difficulty: String,
    pub time_taken_seconds: u64,
    pub is_win: bool,
    pub mines_flagged: usize,
    pub cells_opened: usize,
}

impl GameReport {
    pub fn new(session: &Session, difficulty: impl Into<String>, time_taken: Duration) -> Self {
        Self {
            difficulty: difficulty.into(),
            time_taken_seconds: time_taken.as_secs(),
            is_win: session.is_won(),
            mines_flagged: session.count_flagged(),
            cells_opened: session.opened(),
        }
    }
}
