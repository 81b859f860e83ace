//! API request and response types.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ConversionConfig;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// Upload size limit for `POST /v1/parse-file`.
///
/// Override with `DOCDOWN_MAX_UPLOAD_SIZE_MB`.
///
/// ```
/// use docdown::api::ApiSizeLimits;
///
/// let limits = ApiSizeLimits::from_mb(10);
/// assert_eq!(limits.max_request_body_bytes, 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    pub max_request_body_bytes: usize,
}

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self::from_mb(DEFAULT_MAX_UPLOAD_MB)
    }
}

impl ApiSizeLimits {
    pub fn from_mb(max_request_body_mb: usize) -> Self {
        Self {
            max_request_body_bytes: max_request_body_mb.saturating_mul(1024 * 1024),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body returned for every failed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind name, e.g. `MalformedInput`.
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub status_code: u16,
}

/// Shared router state.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// Configuration applied to every request.
    pub config: Arc<ConversionConfig>,
}
