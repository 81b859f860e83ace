//! Mapping from [`DocdownError`] to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{DocdownError, ErrorKind};

use super::types::ErrorResponse;

/// An error ready to be sent as a JSON response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: DocdownError) -> Self {
        let body = ErrorResponse {
            error_type: error.kind().as_str().to_string(),
            message: error.root().to_string(),
            filename: error.filename().map(str::to_string),
            format: error.format().map(str::to_string),
            status_code: status.as_u16(),
        };
        Self { status, body }
    }

    /// A request that could not be read as a conversion upload.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, DocdownError::validation(message))
    }
}

/// Status code for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnsupportedFormat | ErrorKind::MalformedInput | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::EncodingFailure => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::ConversionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::ConversionTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Io | ErrorKind::Serialization | ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DocdownError> for ApiError {
    fn from(error: DocdownError) -> Self {
        let status = status_for(error.kind());
        if status.is_server_error() {
            tracing::error!(error = %error, "Conversion failed");
        } else {
            tracing::debug!(error = %error, "Conversion rejected");
        }
        Self::new(status, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
