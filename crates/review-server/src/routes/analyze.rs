use axum::{Extension, Json};
use review_core::GameReport;
use serde::Deserialize;

use crate::error::AppError;
use crate::SharedAnalyzer;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub pgn: String,
    /// Overrides the configured search depth when present.
    pub depth: Option<u32>,
}

pub async fn analyze_game(
    Extension(analyzer): Extension<SharedAnalyzer>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<GameReport>, AppError> {
    if request.pgn.trim().is_empty() {
        return Err(AppError::BadRequest("pgn must not be empty".to_string()));
    }
    if request.depth == Some(0) {
        return Err(AppError::BadRequest("depth must be at least 1".to_string()));
    }

    let report = analyzer.analyze(&request.pgn, request.depth).await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_depth_is_optional() {
        let request: AnalyzeRequest = serde_json::from_str(r#"{"pgn": "1. e4 e5"}"#).unwrap();
        assert_eq!(request.pgn, "1. e4 e5");
        assert_eq!(request.depth, None);
    }

    #[test]
    fn test_request_with_depth() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"pgn": "1. d4", "depth": 12}"#).unwrap();
        assert_eq!(request.depth, Some(12));
    }
}
