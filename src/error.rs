//! The boundary layer's uniform error envelope
//!
//! Every failure leaving the service is rendered as
//! `{"success": false, "error": <status>, "message": <description>}`.
//! Status selection pattern-matches on error kind, never on message text.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::{auth::AuthError, store::DrinkNotFound};

/// The JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// The HTTP status code, repeated in the body
    pub error: u16,
    /// A human-readable description of the failure
    pub message: String,
}

pub(crate) fn envelope(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        success: false,
        error: status.as_u16(),
        message: message.into(),
    };

    (status, Json(body)).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        envelope(self.status_code(), self.to_string())
    }
}

/// A request-level failure from the resource handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested record does not exist
    #[error("resource not found")]
    NotFound,

    /// The request body could not be used
    #[error("unprocessable")]
    Unprocessable,

    /// The authorization chain rejected the request
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<DrinkNotFound> for ApiError {
    fn from(_: DrinkNotFound) -> Self {
        Self::NotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => envelope(StatusCode::NOT_FOUND, "resource not found"),
            Self::Unprocessable => envelope(StatusCode::UNPROCESSABLE_ENTITY, "unprocessable"),
            Self::Auth(err) => err.into_response(),
        }
    }
}
