//! Engine evaluation scores.

/// Magnitude assigned to mate-in-0 when linearizing onto the centipawn scale.
pub const MATE_SCORE: i32 = 10_000;

/// A single engine score, always from the perspective of the side to move
/// in the evaluated position (the UCI convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn evaluation.
    Cp(i32),
    /// Forced mate in N moves. Positive means the side to move mates;
    /// zero or negative means the side to move is mated.
    Mate(i32),
}

impl Score {
    /// Linearize onto the centipawn scale.
    ///
    /// Mate-in-N maps to `±(MATE_SCORE - 10*N)` so that shorter mates score
    /// higher: trading mate-in-3 for mate-in-5 still registers a positive
    /// loss even though both positions are winning.
    pub fn to_cp(self) -> i32 {
        match self {
            Score::Cp(cp) => cp,
            Score::Mate(m) if m > 0 => MATE_SCORE - 10 * m,
            Score::Mate(m) => -MATE_SCORE - 10 * m,
        }
    }

    pub fn is_mate(self) -> bool {
        matches!(self, Score::Mate(_))
    }
}

/// Result of one engine query on one position.
#[derive(Debug, Clone)]
pub struct PositionEval {
    /// Score from the side to move's perspective.
    pub score: Score,
    /// Best move in UCI notation; `None` when the position is terminal
    /// (engine reported `bestmove (none)`).
    pub best_move: Option<String>,
    /// Search depth reached.
    pub depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp_passthrough() {
        assert_eq!(Score::Cp(35).to_cp(), 35);
        assert_eq!(Score::Cp(-150).to_cp(), -150);
    }

    #[test]
    fn test_mate_linearization() {
        assert_eq!(Score::Mate(1).to_cp(), 9_990);
        assert_eq!(Score::Mate(3).to_cp(), 9_970);
        assert_eq!(Score::Mate(-3).to_cp(), -9_970);
        // Side to move is checkmated right now.
        assert_eq!(Score::Mate(0).to_cp(), -10_000);
    }

    #[test]
    fn test_shorter_mate_scores_higher() {
        assert!(Score::Mate(3).to_cp() > Score::Mate(5).to_cp());
        assert!(Score::Mate(-5).to_cp() > Score::Mate(-3).to_cp());
    }
}
