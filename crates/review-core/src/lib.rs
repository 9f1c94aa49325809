//! Engine-free core for game review: movetext loading, score types,
//! centipawn-loss classification, and report assembly.
//!
//! Everything in this crate is pure and synchronous; driving the actual
//! evaluation engine lives in `review-engine`.

pub mod classify;
pub mod game;
pub mod report;
pub mod score;

pub use classify::{centipawn_loss, classify, MoveTag};
pub use game::{load_game, Game, GameError, Ply};
pub use report::{summarize, GameReport, MoveReport, Summary};
pub use score::{PositionEval, Score, MATE_SCORE};
