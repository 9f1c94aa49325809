//! Engine-backed game review: Stockfish sessions, the session pool, and
//! the whole-game analyzer.

pub mod analyzer;
pub mod error;
pub mod pool;
pub mod session;

pub use analyzer::{AnalysisOptions, GameAnalyzer};
pub use error::{AnalysisError, EngineError};
pub use pool::EnginePool;
pub use session::{EngineConfig, EngineSession, StockfishSession};
