//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Whether the vision provider answered a model listing.
    pub provider_reachable: bool,
    pub models_count: usize,
    pub version: &'static str,
}

/// `GET /api/health` — connection check for the field client. A down
/// provider is reported, not an error: the app still works in manual mode.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let vision = ctx.vision.clone();
    let models = tokio::task::spawn_blocking(move || vision.list_models())
        .await
        .map_err(|e| ApiError::Internal(format!("health worker: {e}")))?;

    let (provider_reachable, models_count) = match models {
        Ok(models) => (true, models.len()),
        Err(_) => (false, 0),
    };

    Ok(Json(HealthResponse {
        status: "ok",
        provider_reachable,
        models_count,
        version: crate::config::APP_VERSION,
    }))
}
