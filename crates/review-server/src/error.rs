use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use review_engine::AnalysisError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(err) => match err {
                AnalysisError::MalformedGame(_) => StatusCode::BAD_REQUEST,
                AnalysisError::EngineUnavailable(_) | AnalysisError::EngineDegraded(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                AnalysisError::EngineCrashed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {message}");
        }
        (status, Json(json!({ "detail": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_core::GameError;

    #[test]
    fn test_malformed_game_is_bad_request() {
        let err = AppError::Analysis(AnalysisError::MalformedGame(GameError::Empty));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_degraded_engine_is_service_unavailable() {
        let err = AppError::Analysis(AnalysisError::EngineDegraded(3));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_unavailable_engine_is_service_unavailable() {
        let err = AppError::Analysis(AnalysisError::EngineUnavailable(
            "failed to spawn".to_string(),
        ));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_engine_crash_is_internal_error() {
        let err = AppError::Analysis(AnalysisError::EngineCrashed("broken pipe".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
