//! Error types for the daemon
//!
//! Every service-facing operation propagates failures to its caller as a
//! typed error. The check scheduler is the only component that absorbs
//! errors locally; it has no caller waiting on a result.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use caravel_types::ConstraintKey;

/// Result type for daemon lifecycle operations
pub type DaemonResult<T> = Result<T, DaemonError>;

/// Top-level daemon errors
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by storage backends
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the constraint gate
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("no constraint state for {0}")]
    NotFound(ConstraintKey),

    #[error("invalid constraint: {0}: constraint not found")]
    InvalidConstraint(ConstraintKey),

    #[error("{status} is not a judgement status for {key}")]
    NotAJudgement {
        key: ConstraintKey,
        status: caravel_types::ConstraintStatus,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from the manifest service
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("no delivery config named {0}")]
    NotFound(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned to API callers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::NotFound(_) => ApiError::NotFound(err.to_string()),
            GateError::InvalidConstraint(_) | GateError::NotAJudgement { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            GateError::Storage(e) => e.into(),
        }
    }
}

impl From<ManifestError> for ApiError {
    fn from(err: ManifestError) -> Self {
        match err {
            ManifestError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ManifestError::InvalidManifest(_) => ApiError::BadRequest(err.to_string()),
            ManifestError::Storage(e) => e.into(),
        }
    }
}
