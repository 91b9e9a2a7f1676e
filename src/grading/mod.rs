//! Pick grading.
//!
//! A pure decision procedure: given a game's line and final score, classify
//! a spread or total pick as correct, incorrect, tie (push), or pending.

mod grade;
mod types;

pub use grade::grade;
pub use types::{GameLine, GameOutcome, GameStatus, PickResult, Selection, SelectionError, Winner};
