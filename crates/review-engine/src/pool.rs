//! Fixed pool of engine sessions, one evaluation in flight per session.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use crate::error::EngineError;
use crate::session::{EngineConfig, EngineSession, StockfishSession};

/// A set of independent engine sessions. Sessions are never shared
/// concurrently: each sits behind its own mutex and plies are assigned
/// round-robin by index.
pub struct EnginePool<S> {
    sessions: Vec<Arc<Mutex<S>>>,
}

impl EnginePool<StockfishSession> {
    /// Spawn `size` Stockfish processes up front. Any spawn failure takes
    /// the whole pool down; already-spawned sessions are killed on drop.
    pub async fn spawn(config: &EngineConfig, size: usize) -> Result<Self, EngineError> {
        let size = size.max(1);
        let mut sessions = Vec::with_capacity(size);
        for id in 0..size {
            let session = StockfishSession::spawn(config).await?;
            info!(engine_id = id, "engine session ready");
            sessions.push(Arc::new(Mutex::new(session)));
        }
        Ok(Self { sessions })
    }
}

impl<S: EngineSession> EnginePool<S> {
    /// Build a pool from pre-constructed sessions.
    pub fn from_sessions(sessions: Vec<S>) -> Self {
        assert!(!sessions.is_empty(), "engine pool must have at least one session");
        Self {
            sessions: sessions
                .into_iter()
                .map(|s| Arc::new(Mutex::new(s)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Session assigned to a ply index.
    pub(crate) fn session(&self, index: usize) -> Arc<Mutex<S>> {
        self.sessions[index % self.sessions.len()].clone()
    }

    /// Orderly shutdown of every session.
    pub async fn shutdown(&self) {
        for session in &self.sessions {
            session.lock().await.shutdown().await;
        }
    }
}
