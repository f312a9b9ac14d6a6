use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board dimensions must be positive")]
    EmptyBoard,
    #[error("{mines} mines cannot fit a {rows}x{cols} board")]
    TooManyMines {
        rows: usize,
        cols: usize,
        mines: usize,
    },
}

/// Validated board parameters. Degenerate dimensions and mine counts are
/// rejected here, before a game ever starts; in-play moves never fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    rows: usize,
    cols: usize,
    mines: usize,
}

impl GameConfig {
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        if mines >= rows * cols {
            return Err(ConfigError::TooManyMines { rows, cols, mines });
        }
        Ok(Self { rows, cols, mines })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mines(&self) -> usize {
        self.mines
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        let (rows, cols, mines) = match difficulty {
            Difficulty::Easy => (9, 9, 10),
            Difficulty::Medium => (16, 16, 40),
            Difficulty::Hard => (16, 30, 99),
        };
        Self { rows, cols, mines }
    }
}
