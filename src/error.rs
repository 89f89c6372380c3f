use crate::repository;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation error: {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("event not exist")]
    EventNotFound,

    #[error("seat {0} not exist")]
    SeatMissing(i32),

    #[error("seat {0} not available")]
    SeatNotAvailable(i32),

    #[error("seat {0} not held or hold expired")]
    NotHeldOrExpired(i32),

    ///
    /// Optimistic lock loss; retried by the engine before surfacing
    ///
    #[error("seat version conflict")]
    Conflict { seat: Option<i32> },

    #[error("storage error: {0}")]
    Storage(repository::Error),

    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl From<repository::Error> for Error {
    fn from(err: repository::Error) -> Self {
        match err {
            repository::Error::StaleVersion
            | repository::Error::WriteConflict
            | repository::Error::InsertUniqueViolation => Error::Conflict { seat: None },
            err => Error::Storage(err),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation { field, message } => {
                tracing::warn!(err = %self);
                let errors = Json(serde_json::json!({ field: message }));
                (StatusCode::BAD_REQUEST, errors).into_response()
            }
            Error::EventNotFound | Error::SeatMissing(_) => {
                tracing::warn!(err = %self);
                StatusCode::NOT_FOUND.into_response()
            }
            Error::SeatNotAvailable(_) | Error::NotHeldOrExpired(_) | Error::Conflict { .. } => {
                tracing::warn!(err = %self);
                StatusCode::CONFLICT.into_response()
            }
            Error::Storage(_) => {
                let correlation_id = Uuid::new_v4();
                tracing::error!(%correlation_id, err = %self);
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            }
            Error::Internal(_) => {
                let correlation_id = Uuid::new_v4();
                tracing::error!(%correlation_id, err = %self);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
