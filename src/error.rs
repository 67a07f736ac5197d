use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error taxonomy shared by extractors and handlers.
///
/// `Internal` carries the underlying cause for server-side logging only; the
/// client always receives a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized access")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "unauthorized access".to_string())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(e) => {
                error!(error = %e, cause = ?e.source(), "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
