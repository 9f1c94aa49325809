//! Error taxonomy for engine sessions and whole-game analysis.

use review_core::GameError;
use thiserror::Error;

/// Failure of a single engine session operation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine process could not be started or initialized.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    /// One evaluation exceeded its time budget; the session survives.
    #[error("evaluation timed out")]
    Timeout,
    /// The engine process died or desynced mid-session.
    #[error("engine crashed: {0}")]
    Crashed(String),
}

/// Request-level failure of a game analysis. The caller either gets a
/// complete report or one of these; never a truncated result.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("malformed game: {0}")]
    MalformedGame(#[from] GameError),

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine crashed: {0}")]
    EngineCrashed(String),

    #[error("engine degraded: {0} consecutive evaluations timed out")]
    EngineDegraded(u32),
}

impl From<EngineError> for AnalysisError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Unavailable(msg) => AnalysisError::EngineUnavailable(msg),
            EngineError::Crashed(msg) => AnalysisError::EngineCrashed(msg),
            // Timeouts are handled per ply; one reaching here means the
            // session could not be salvaged afterwards.
            EngineError::Timeout => {
                AnalysisError::EngineCrashed("unrecovered evaluation timeout".into())
            }
        }
    }
}
