//! HTTP API for the switchboard server.

use crate::channels;
use crate::engine::Engine;
use crate::metrics::MetricsRegistry;
use crate::types::{ActiveStreams, Candidate};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use prometheus_client::encoding::text::encode;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state behind every handler
pub struct AppState {
    /// The failover engine
    pub engine: Arc<Engine>,
    /// Metrics registry (optional)
    pub metrics: Option<Arc<MetricsRegistry>>,
    /// Channel list path used by /reload
    pub channels_file: PathBuf,
}

/// HTTP API server
pub struct ApiServer {
    state: Arc<AppState>,
    listen_addr: String,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(state: Arc<AppState>, listen_addr: String) -> Self {
        Self { state, listen_addr }
    }

    /// Build the router; separated out for tests
    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/streams", get(streams_handler))
            .route("/streams/:group", get(stream_handler))
            .route("/streams/:group/failed", post(failed_handler))
            .route("/reload", post(reload_handler))
            .route("/metrics", get(metrics_handler))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(state)
    }

    /// Run the HTTP server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        info!(listen_addr = %self.listen_addr, "starting API server");

        let app = Self::router(self.state);

        let listener = TcpListener::bind(&self.listen_addr).await?;
        info!(listen_addr = %self.listen_addr, "API server listening");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Handler for GET /streams: the full live selection
async fn streams_handler(State(state): State<Arc<AppState>>) -> Json<ActiveStreams> {
    Json(state.engine.active_streams().await)
}

/// Handler for GET /streams/{group}: one group's selection
async fn stream_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> Result<Json<Candidate>, StatusCode> {
    state
        .engine
        .active_streams()
        .await
        .remove(&group)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Handler for POST /streams/{group}/failed: external failure report
async fn failed_handler(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> StatusCode {
    state.engine.mark_failed(&group).await;
    StatusCode::NO_CONTENT
}

/// Handler for POST /reload: re-read the channel list
async fn reload_handler(State(state): State<Arc<AppState>>) -> Response {
    match channels::load_channels(&state.channels_file) {
        Ok(groups) => {
            state.engine.update_config(groups).await;
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            warn!(error = %e, "channel list reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reload failed: {}", e),
            )
                .into_response()
        }
    }
}

/// Handler for GET /metrics endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let Some(ref registry) = state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut buffer = String::new();
    if let Err(e) = encode(&mut buffer, &registry.registry) {
        warn!(error = %e, "failed to encode metrics");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", e),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
        .into_response()
}
