pub use board::{Board, Cell, CellContent, Pos};
pub use config::{ConfigError, Difficulty, GameConfig};
pub use game::{Session, Status};
pub use stats::GameReport;

pub mod board;
pub mod config;
pub mod game;
pub mod stats;
