//! Extraction endpoint — field photo in, result envelope out.
//!
//! `POST /api/extract` receives a photographed form and a domain id, decodes
//! the base64 image, and runs the pipeline on a blocking worker thread so
//! the provider call never ties up the async runtime. Pipeline failures are
//! 200 responses with `success: false` — only malformed requests get HTTP
//! error statuses.

use axum::extract::State;
use axum::Json;
use base64::Engine;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ExtractRequest};
use crate::pipeline::ollama::MAX_IMAGE_BYTES;
use crate::pipeline::types::PipelineResult;

/// `POST /api/extract` — run one extraction attempt.
pub async fn extract(
    State(ctx): State<ApiContext>,
    Json(payload): Json<ExtractRequest>,
) -> Result<Json<PipelineResult>, ApiError> {
    if payload.domain_id.trim().is_empty() {
        return Err(ApiError::BadRequest("domainId is required".into()));
    }

    let image = decode_data_url(&payload.image)
        .map_err(|e| ApiError::BadRequest(format!("Invalid image data: {e}")))?;
    if image.is_empty() {
        return Err(ApiError::BadRequest("Image payload is empty".into()));
    }
    if image.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Image exceeds {} byte limit ({} bytes)",
            MAX_IMAGE_BYTES,
            image.len()
        )));
    }

    let extractor = ctx.extractor.clone();
    let domain_id = payload.domain_id.clone();
    let context = payload.project_context.clone();

    // The provider call blocks for up to the configured bound; keep it off
    // the async runtime so concurrent extractions do not serialize.
    let result = tokio::task::spawn_blocking(move || {
        extractor.extract(&domain_id, &image, context.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("extraction worker: {e}")))?;

    Ok(Json(result))
}

/// Decode a base64 data URL to raw bytes.
///
/// Handles both `data:image/jpeg;base64,...` and raw base64 strings.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let base64_data = match data_url.find(',') {
        Some(idx) => &data_url[idx + 1..],
        None => data_url,
    };

    base64::engine::general_purpose::STANDARD
        .decode(base64_data.trim())
        .map_err(|e| format!("Base64 decode failed: {e}"))
}
