//! Mapping of application errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::CommandError;
use crate::domain::foundation::ErrorKind;

/// JSON error body: `{ "code": "...", "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            code: "UNAUTHORIZED".to_string(),
            message: message.into(),
        }
    }
}

/// Error returned by every HTTP handler.
#[derive(Debug)]
pub enum ApiError {
    Command(CommandError),
    BadRequest(String),
    Unauthorized(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError::Command(err)
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::IllegalTransition | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvariantViolation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Command(err) => {
                let status = status_for(err.kind());
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!(error = %err, "request failed");
                    // Infrastructure details stay in the log.
                    (
                        status,
                        ErrorResponse {
                            code: err.code().to_string(),
                            message: "internal server error".to_string(),
                        },
                    )
                } else {
                    (
                        status,
                        ErrorResponse {
                            code: err.code().to_string(),
                            message: err.to_string(),
                        },
                    )
                }
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(message))
            }
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, ErrorResponse::unauthorized(message))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Parses a path identifier, answering 400 with a JSON body on failure.
pub(crate) fn parse_id<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("invalid {} id: {}", what, raw)))
}
