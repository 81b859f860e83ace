//! REST API server for docdown.
//!
//! An axum router exposing the conversion pipeline over HTTP.
//!
//! # Endpoints
//!
//! - `POST /v1/parse-file` - Convert the uploaded `file` (multipart form data)
//! - `GET /health` - Liveness check, independent of the pipeline
//!
//! Failures are returned as JSON:
//!
//! ```json
//! {"error_type": "MalformedInput", "message": "...", "filename": "deck.pptx", "format": "pptx", "status_code": 400}
//! ```
//!
//! | Error kind | Status |
//! | --- | --- |
//! | UnsupportedFormat, MalformedInput, Validation | 400 |
//! | EncodingFailure | 422 |
//! | ConversionUnavailable | 503 |
//! | ConversionTimeout | 504 |
//! | anything else | 500 |
//!
//! # Starting the server
//!
//! ```no_run
//! use docdown::api::serve;
//!
//! #[tokio::main]
//! async fn main() -> docdown::Result<()> {
//!     serve("127.0.0.1", 8000).await
//! }
//! ```
//!
//! ```bash
//! curl -F "file=@report.xlsx" http://localhost:8000/v1/parse-file
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{ApiError, status_for};
pub use server::{create_router, create_router_with_limits, serve, serve_with_config, size_limits_from_env};
pub use types::{ApiSizeLimits, ApiState, DEFAULT_MAX_UPLOAD_MB, ErrorResponse, HealthResponse};
