//! Extraction API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is open: the field clients are mobile/web apps served from other
//! origins on the site LAN.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the extraction API router with all routes under `/api/`.
pub fn extraction_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/api/extract", post(endpoints::extract::extract))
        .route("/api/health", get(endpoints::health::check))
        .with_state(ctx)
        .layer(CorsLayer::permissive())
}
