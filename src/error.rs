use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// A referenced user is not in the known set.
    #[error("{0}")]
    InvalidUser(String),

    #[error("Cannot send message to self")]
    SelfMessage,

    /// Unknown message or chat id; the string names the entity.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after: u64 },

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) | Error::InvalidUser(_) | Error::SelfMessage => {
                StatusCode::BAD_REQUEST
            }
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Error::RateLimited { retry_after } => json!({
                "error": self.to_string(),
                "retryAfter": retry_after,
            }),
            Error::Internal(detail) => {
                // Log the original fault, never leak it to the client.
                error!("Internal error: {}", detail);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
