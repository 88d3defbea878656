use crate::storage::relay::REMOTE_SERVER_ERROR;
use crate::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Body returned for failures whose details stay in the log.
pub const INTERNAL_ERROR_BODY: &str = "internal server error";

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::RemoteSentinel => (
                StatusCode::INTERNAL_SERVER_ERROR,
                REMOTE_SERVER_ERROR.to_string(),
            ),
            Error::Relay(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_BODY.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, body).into_response()
    }
}
