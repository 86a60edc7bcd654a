//! Response envelope and domain → HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use calendai_domain::CalendaiError;
use serde::Serialize;
use tracing::error;

/// Uniform response envelope: `code` 0 on success, a stable numeric code on
/// failure.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub code: u32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Successful envelope around `data`.
pub fn success<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { code: 0, message: "success".into(), data: Some(data) })
}

/// Error carried out of a handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: u32,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: 40001, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, code: 40100, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, code: 40401, message: message.into() }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: 50000,
            message: "internal server error".into(),
        }
    }
}

impl From<CalendaiError> for ApiError {
    fn from(err: CalendaiError) -> Self {
        match err {
            CalendaiError::Validation(msg)
            | CalendaiError::InvalidInput(msg)
            | CalendaiError::AmbiguousTarget(msg) => Self::bad_request(msg),
            CalendaiError::NotFound(msg) => Self::not_found(msg),
            other => {
                // Infrastructure detail stays in the log, not the response.
                error!(error = %other, "request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(Envelope::<()> { code: self.code, message: self.message, data: None });
        (self.status, body).into_response()
    }
}
