//! Whole-game analysis: fan plies out across the engine pool, fold the
//! per-ply assessments into the final report.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{info, warn};

use review_core::{
    centipawn_loss, classify, load_game, summarize, GameReport, MoveReport, MoveTag, Ply,
    MATE_SCORE,
};

use crate::error::{AnalysisError, EngineError};
use crate::pool::EnginePool;
use crate::session::EngineSession;

/// Tunables for one analyzer instance.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Search depth used when the request does not specify one.
    pub depth: u32,
    /// Leading plies excluded from the summary counts and ACPL.
    pub opening_cutoff: usize,
    /// Abort the request when this many plies in a row time out.
    /// Zero disables the check.
    pub max_consecutive_timeouts: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            depth: 15,
            opening_cutoff: 0,
            max_consecutive_timeouts: 3,
        }
    }
}

/// Drives a full game through the engine pool and assembles the report.
pub struct GameAnalyzer<S: EngineSession> {
    pool: EnginePool<S>,
    options: AnalysisOptions,
}

impl<S: EngineSession> GameAnalyzer<S> {
    pub fn new(pool: EnginePool<S>, options: AnalysisOptions) -> Self {
        Self { pool, options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }

    /// Analyze a complete game at the given depth (falling back to the
    /// configured default). Returns a full report or an error; a partial
    /// result is never returned. Dropping the returned future cancels all
    /// outstanding engine calls.
    pub async fn analyze(
        &self,
        movetext: &str,
        depth: Option<u32>,
    ) -> Result<GameReport, AnalysisError> {
        let depth = depth.unwrap_or(self.options.depth);
        let game = load_game(movetext)?;
        info!(plies = game.len(), depth, "starting game analysis");

        // Plies are independent once loaded; fan out over the pool.
        // `buffered` yields in input order, which is ply order. Each
        // future owns its ply so the whole fan-out stays `Send` across
        // await points.
        let total = game.len();
        let futures = game.plies().to_vec().into_iter().map(|ply| {
            let session = self.pool.session(ply.index);
            async move { self.assess_ply(session, &ply, depth).await }
        });

        let mut moves: Vec<MoveReport> = Vec::with_capacity(total);
        let mut stream = stream::iter(futures).buffered(self.pool.len());
        while let Some(result) = stream.next().await {
            moves.push(result?);
        }

        if let Some(run) = timeout_run(&moves, self.options.max_consecutive_timeouts) {
            warn!(run, "aborting analysis, engine degraded");
            return Err(AnalysisError::EngineDegraded(run));
        }

        let summary = summarize(&moves, self.options.opening_cutoff);
        info!(
            inaccuracies = summary.inaccuracies,
            mistakes = summary.mistakes,
            blunders = summary.blunders,
            acpl = summary.acpl,
            "game analysis complete"
        );

        Ok(GameReport { moves, summary })
    }

    /// Assess one ply: evaluate the pre-move position for the engine's
    /// choice, the post-move position for the realized score, and classify
    /// the difference. An isolated timeout degrades the ply instead of
    /// failing the game.
    async fn assess_ply(
        &self,
        session: Arc<Mutex<S>>,
        ply: &Ply,
        depth: u32,
    ) -> Result<MoveReport, AnalysisError> {
        let mut session = session.lock().await;

        let before = match session.evaluate(&ply.fen_before, depth).await {
            Ok(eval) => eval,
            Err(EngineError::Timeout) => {
                warn!(ply = ply.index + 1, san = %ply.san, "pre-move evaluation timed out");
                return Ok(MoveReport::unevaluated(ply));
            }
            Err(e) => return Err(e.into()),
        };

        let best_cp = before.score.to_cp();
        let best_move = before.best_move;

        // Played the engine's own choice: zero loss by rule, whatever a
        // re-evaluation would report.
        if best_move.as_deref() == Some(ply.uci.as_str()) {
            return Ok(MoveReport::evaluated(
                ply,
                best_move,
                best_cp,
                best_cp,
                0,
                MoveTag::Ok,
            ));
        }

        let played_cp = if ply.gives_checkmate {
            MATE_SCORE
        } else if ply.gives_stalemate {
            0
        } else {
            match session.evaluate(&ply.fen_after, depth).await {
                // The opponent is to move afterwards; flip to the mover's
                // perspective.
                Ok(eval) => -eval.score.to_cp(),
                Err(EngineError::Timeout) => {
                    warn!(ply = ply.index + 1, san = %ply.san, "post-move evaluation timed out");
                    return Ok(MoveReport::unevaluated(ply));
                }
                Err(e) => return Err(e.into()),
            }
        };

        let delta = centipawn_loss(best_cp, played_cp);
        let tag = classify(delta);
        Ok(MoveReport::evaluated(
            ply, best_move, best_cp, played_cp, delta, tag,
        ))
    }
}

/// Longest run of consecutive unevaluated plies, if it reaches `limit`.
fn timeout_run(moves: &[MoveReport], limit: u32) -> Option<u32> {
    let mut run: u32 = 0;
    let mut longest: u32 = 0;
    for report in moves {
        if report.is_evaluated() {
            run = 0;
        } else {
            run += 1;
            longest = longest.max(run);
        }
    }
    (limit > 0 && longest >= limit).then_some(longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::game::Ply;
    use shakmaty::Color;

    fn ply(index: usize) -> Ply {
        Ply {
            index,
            color: Color::White,
            san: "e4".into(),
            uci: "e2e4".into(),
            fen_before: String::new(),
            fen_after: String::new(),
            gives_checkmate: false,
            gives_stalemate: false,
        }
    }

    fn evaluated(index: usize) -> MoveReport {
        MoveReport::evaluated(&ply(index), None, 0, 0, 0, MoveTag::Ok)
    }

    fn degraded(index: usize) -> MoveReport {
        MoveReport::unevaluated(&ply(index))
    }

    #[test]
    fn test_timeout_run_detection() {
        let moves = vec![evaluated(0), degraded(1), degraded(2), evaluated(3)];
        assert_eq!(timeout_run(&moves, 3), None);
        assert_eq!(timeout_run(&moves, 2), Some(2));
    }

    #[test]
    fn test_timeout_run_disabled() {
        let moves = vec![degraded(0), degraded(1), degraded(2)];
        assert_eq!(timeout_run(&moves, 0), None);
    }

    #[test]
    fn test_timeout_run_resets_between_runs() {
        let moves = vec![degraded(0), evaluated(1), degraded(2), degraded(3)];
        assert_eq!(timeout_run(&moves, 3), None);
        assert_eq!(timeout_run(&moves, 2), Some(2));
    }
}
