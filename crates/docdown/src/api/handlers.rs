//! API request handlers.

use axum::{
    Json,
    extract::{Multipart, State},
};

use crate::{ConversionResult, convert};

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse},
};

/// Conversion endpoint handler.
///
/// POST /v1/parse-file
///
/// Accepts multipart form data with a single `file` field. The part's file
/// name decides the format. Other fields are ignored.
///
/// Uploads above the configured body limit are rejected before conversion.
pub async fn parse_file_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionResult>, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("The `file` field has no file name"))?;
        let data = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;

        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(ApiError::bad_request("No file provided in the `file` field"));
    };

    let result = convert(&filename, &data, &state.config).await?;
    Ok(Json(result))
}

/// Health check endpoint handler.
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
