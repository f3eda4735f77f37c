/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{MarkerError, MarkerResult},
    metrics,
    profile::ResolvedProfile,
};
use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the listener router
pub fn build_router(ctx: AppContext) -> Router {
    // The web map fetches the marker file cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/players.json", get(marker_file))
        .route("/profiles/:name", get(cached_profile))
        .with_state(ctx)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check(State(ctx): State<AppContext>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "cachedProfiles": ctx.profile_resolver.cache().len(),
        "profileCacheTtlSecs": ctx.profile_resolver.cache().ttl().num_seconds()
    }))
}

/// Prometheus text exposition
async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render_metrics(),
    )
}

/// Latest marker snapshot
async fn marker_file(State(ctx): State<AppContext>) -> Result<Response, MarkerError> {
    match ctx.snapshot_writer.read_current().await? {
        Some(raw) => Ok(([(header::CONTENT_TYPE, "application/json")], raw).into_response()),
        None => Err(MarkerError::NotFound(
            "No marker snapshot written yet".to_string(),
        )),
    }
}

/// Peek at a cached profile without starting a lookup
async fn cached_profile(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<Json<ResolvedProfile>, MarkerError> {
    ctx.profile_resolver
        .peek(&name, true)
        .await
        .map(Json)
        .ok_or_else(|| MarkerError::NotFound(format!("No cached profile for {}", name)))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "Endpoint not found"
        })),
    )
}

/// Start the HTTP listener
pub async fn serve(ctx: AppContext, addr: SocketAddr) -> MarkerResult<()> {
    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MarkerError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    info!("HTTP listener on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| MarkerError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
