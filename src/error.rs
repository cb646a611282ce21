//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// PostgreSQL SQLSTATE for unique_violation.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// MongoDB server code for a duplicate key on a unique index.
const MONGO_DUPLICATE_KEY: i32 = 11000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("unknown backend '{0}' (expected postgres, mongodb or memory)")]
    UnknownBackend(String),
    #[error("invalid identifier for {key}: '{value}'")]
    InvalidIdentifier { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("batch too large: {size} items (maximum {max})")]
    BatchTooLarge { size: usize, max: usize },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("backend: {0}")]
    Backend(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidFormat(_)
            | AppError::Conflict(_)
            | AppError::BatchTooLarge { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config_error",
            AppError::InvalidFormat(_) => "invalid_format",
            AppError::OutOfRange(_) => "out_of_range",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::BatchTooLarge { .. } => "batch_too_large",
            AppError::BadRequest(_) => "bad_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::Backend(_) => "backend_error",
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %message, error_code = code, "request failed with server error");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                    return AppError::Conflict("wallet address already exists".into());
                }
                AppError::Backend(format!("database error: {}", db_err))
            }
            sqlx::Error::RowNotFound => AppError::NotFound("requested wallet not found".into()),
            other => AppError::Backend(format!("database error: {}", other)),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            return AppError::Conflict("wallet address already exists".into());
        }
        AppError::Backend(format!("mongodb error: {}", err))
    }
}

/// True when a MongoDB write failed on the unique `address` index.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == MONGO_DUPLICATE_KEY,
        ErrorKind::InsertMany(e) => e
            .write_errors
            .as_ref()
            .map(|errs| errs.iter().any(|w| w.code == MONGO_DUPLICATE_KEY))
            .unwrap_or(false),
        _ => false,
    }
}
