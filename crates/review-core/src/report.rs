//! Per-move reports, the aggregate summary, and the response shape.

use serde::Serialize;

use crate::classify::MoveTag;
use crate::game::Ply;

/// Assessment of a single played move. Evaluation fields are `None` when
/// the ply could not be evaluated (engine timeout); such plies are kept
/// in the `moves` array so the caller sees a complete game, but they are
/// excluded from the summary.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoveReport {
    /// 1-based ply number, matching the move list shown to users.
    pub ply: usize,
    pub san: String,
    /// Engine's preferred move for the pre-move position, UCI notation.
    pub best_move: Option<String>,
    /// Evaluation after the engine's best move, mover's perspective.
    pub best_cp: Option<i32>,
    /// Evaluation after the played move, mover's perspective.
    pub played_cp: Option<i32>,
    /// Centipawn loss, `max(0, bestCp - playedCp)`.
    pub delta_cp: Option<i32>,
    pub tag: Option<MoveTag>,
}

impl MoveReport {
    pub fn evaluated(
        ply: &Ply,
        best_move: Option<String>,
        best_cp: i32,
        played_cp: i32,
        delta_cp: i32,
        tag: MoveTag,
    ) -> Self {
        Self {
            ply: ply.index + 1,
            san: ply.san.clone(),
            best_move,
            best_cp: Some(best_cp),
            played_cp: Some(played_cp),
            delta_cp: Some(delta_cp),
            tag: Some(tag),
        }
    }

    /// Degraded report for a ply whose evaluation timed out.
    pub fn unevaluated(ply: &Ply) -> Self {
        Self {
            ply: ply.index + 1,
            san: ply.san.clone(),
            best_move: None,
            best_cp: None,
            played_cp: None,
            delta_cp: None,
            tag: None,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.delta_cp.is_some()
    }
}

/// Aggregate counts and average loss over the evaluated plies.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Summary {
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
    /// Average centipawn loss, rounded to two decimals. OK-tagged moves
    /// count toward the denominator.
    pub acpl: f64,
}

/// The complete response for one analyzed game.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GameReport {
    pub moves: Vec<MoveReport>,
    pub summary: Summary,
}

/// Fold move reports into a `Summary`.
///
/// The first `opening_cutoff` plies and any unevaluated plies are excluded
/// from both the counts and the ACPL denominator. An empty evaluated set
/// yields the all-zero summary.
pub fn summarize(moves: &[MoveReport], opening_cutoff: usize) -> Summary {
    let mut summary = Summary::default();
    let mut total_loss: i64 = 0;
    let mut counted: u32 = 0;

    for report in moves.iter().skip(opening_cutoff) {
        let Some(delta) = report.delta_cp else {
            continue;
        };
        total_loss += i64::from(delta);
        counted += 1;

        match report.tag {
            Some(MoveTag::Inaccuracy) => summary.inaccuracies += 1,
            Some(MoveTag::Mistake) => summary.mistakes += 1,
            Some(MoveTag::Blunder) => summary.blunders += 1,
            _ => {}
        }
    }

    if counted > 0 {
        summary.acpl = round2(total_loss as f64 / f64::from(counted));
    }
    summary
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
