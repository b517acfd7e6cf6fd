//! Request-level errors and their JSON envelope.
//!
//! # Design
//! Every failure a request can hit is one `ApiError` variant. Handlers
//! return `Result<_, ApiError>` and axum turns the error into
//! `{"error": "<message>"}` with the matching status code. Nothing here is
//! fatal: a rejected request leaves the store untouched.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request body is not valid JSON.
    #[error("Invalid JSON body.")]
    MalformedJson,

    /// The body parsed but does not describe a valid create or patch.
    #[error("{0}")]
    InvalidBody(&'static str),

    /// The `{id}` path segment is not a positive integer.
    #[error("Invalid todo id.")]
    InvalidId,

    /// No todo has the requested id.
    #[error("Todo not found.")]
    NotFound,

    /// Known resource, unsupported method. `allow` lists the supported ones.
    #[error("Method Not Allowed")]
    MethodNotAllowed { allow: &'static str },

    #[error("Not Found")]
    RouteNotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedJson | ApiError::InvalidBody(_) | ApiError::InvalidId => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// The error envelope written for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(status = status.as_u16(), error = %self, "request rejected");

        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        match self {
            ApiError::MethodNotAllowed { allow } => {
                (status, [(header::ALLOW, allow)], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
