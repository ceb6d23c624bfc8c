//! HTTP API for the playback session
//!
//! Exposes the session status snapshot, the SSE event and command streams,
//! the widget event intake, and the embedded playback widget page.

pub mod handlers;
pub mod sse;

use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::playback::SessionMessage;
use crate::state::SharedState;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Session state snapshot
    pub state: Arc<SharedState>,
    /// Message queue into the session engine
    pub engine_tx: UnboundedSender<SessionMessage>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Embedded playback widget page
        .route("/", get(widget_page))

        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))

        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Session status snapshot
                .route("/status", get(handlers::get_status))

                // Widget event intake
                .route("/player/event", post(handlers::post_player_event))

                // SSE streams
                .route("/player/commands", get(sse::command_stream))
                .route("/events", get(sse::event_stream)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - embedded playback widget page
async fn widget_page() -> Html<&'static str> {
    Html(include_str!("widget.html"))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "tubeloop-player",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port
    }))
}
