//! Centipawn-loss computation and move quality classification.

use serde::{Deserialize, Serialize};

/// Classification thresholds (centipawn loss). The bands partition
/// `[0, ∞)`: OK `[0,50)`, Inaccuracy `[50,100)`, Mistake `[100,300)`,
/// Blunder `[300,∞)`.
pub const INACCURACY_THRESHOLD: i32 = 50;
pub const MISTAKE_THRESHOLD: i32 = 100;
pub const BLUNDER_THRESHOLD: i32 = 300;

/// Quality tag for a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTag {
    #[serde(rename = "OK")]
    Ok,
    Inaccuracy,
    Mistake,
    Blunder,
}

/// Centipawn loss of the played move relative to the engine's best line,
/// both scores from the mover's perspective. Clamped at zero: a move the
/// engine underrated is not a gain.
pub fn centipawn_loss(best_cp: i32, played_cp: i32) -> i32 {
    (best_cp - played_cp).max(0)
}

/// Map a non-negative centipawn loss to its quality tag.
pub fn classify(delta_cp: i32) -> MoveTag {
    if delta_cp >= BLUNDER_THRESHOLD {
        MoveTag::Blunder
    } else if delta_cp >= MISTAKE_THRESHOLD {
        MoveTag::Mistake
    } else if delta_cp >= INACCURACY_THRESHOLD {
        MoveTag::Inaccuracy
    } else {
        MoveTag::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_bands() {
        assert_eq!(classify(0), MoveTag::Ok);
        assert_eq!(classify(49), MoveTag::Ok);
        assert_eq!(classify(50), MoveTag::Inaccuracy);
        assert_eq!(classify(99), MoveTag::Inaccuracy);
        assert_eq!(classify(100), MoveTag::Mistake);
        assert_eq!(classify(120), MoveTag::Mistake);
        assert_eq!(classify(299), MoveTag::Mistake);
        assert_eq!(classify(300), MoveTag::Blunder);
        assert_eq!(classify(20_000), MoveTag::Blunder);
    }

    #[test]
    fn test_bands_are_exhaustive() {
        // Every boundary maps to exactly one tag; no gaps at the seams.
        for delta in [0, 1, 49, 50, 51, 99, 100, 101, 299, 300, 301] {
            let _ = classify(delta);
        }
    }

    #[test]
    fn test_loss_clamped_at_zero() {
        assert_eq!(centipawn_loss(100, 80), 20);
        assert_eq!(centipawn_loss(100, 120), 0);
        assert_eq!(centipawn_loss(-50, -50), 0);
    }

    #[test]
    fn test_mate_to_mate_loss() {
        use crate::score::Score;
        // Mate-in-3 converted to mate-in-5 is a real but small loss.
        let loss = centipawn_loss(Score::Mate(3).to_cp(), Score::Mate(5).to_cp());
        assert_eq!(loss, 20);
        // Throwing away a mate for a lost position is a huge loss.
        let loss = centipawn_loss(Score::Mate(2).to_cp(), Score::Cp(-300).to_cp());
        assert!(loss >= BLUNDER_THRESHOLD);
    }

    #[test]
    fn test_tag_serialization() {
        assert_eq!(serde_json::to_string(&MoveTag::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&MoveTag::Blunder).unwrap(),
            "\"Blunder\""
        );
    }
}
