//! Domain error → HTTP response mapping.
//!
//! Exactly one failure carries its specific message across the boundary:
//! an unknown employee id (404). Everything else collapses to a generic
//! 500 body; the detail stays in the logs and the audit trail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::predict::PredictError;
use crate::store::StoreError;

/// Sanitized API-facing error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("ID salarié non trouvé")]
    NotFound,

    #[error("Erreur interne du serveur")]
    Internal,
}

impl From<PredictError> for ApiError {
    fn from(error: PredictError) -> Self {
        match error {
            PredictError::UnknownEmployee(id) => {
                tracing::info!(id_employee = id, "Prediction for unknown employee");
                ApiError::NotFound
            }
            PredictError::Store(error) => {
                tracing::error!(%error, "Prediction failed on store access");
                ApiError::Internal
            }
            PredictError::Inference(error) => {
                tracing::error!(%error, "Prediction failed on inference");
                ApiError::Internal
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        tracing::error!(%error, "Store access failed");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_its_message() {
        assert_eq!(ApiError::NotFound.to_string(), "ID salarié non trouvé");
    }

    #[test]
    fn test_internal_is_generic() {
        let err: ApiError = PredictError::Store(StoreError::Unconfigured).into();
        assert_eq!(err.to_string(), "Erreur interne du serveur");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
