//! HTTP request handlers
//!
//! Implements the session status endpoint and the widget event intake.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use tubeloop_common::events::{PlaybackPhase, PlayerEvent};

use crate::api::AppState;
use crate::playback::scheduler::interval_progress;
use crate::playback::SessionMessage;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    phase: PlaybackPhase,
    now_playing: Option<NowPlayingInfo>,
    ad_break: Option<AdBreakInfo>,
    /// Delay between ad breaks in milliseconds
    ad_interval_ms: Option<u64>,
    /// Fraction of the ad interval elapsed since the last tick, 0.0 to 1.0
    ad_progress: Option<f64>,
    last_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NowPlayingInfo {
    playlist_id: String,
    video_id: String,
}

#[derive(Debug, Serialize)]
pub struct AdBreakInfo {
    video_id: String,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    status: String,
}

// ============================================================================
// Status Endpoint
// ============================================================================

/// GET /api/v1/status - session status snapshot
pub async fn get_status(State(app): State<AppState>) -> Json<StatusResponse> {
    let phase = app.state.get_phase().await;
    let now_playing = app
        .state
        .get_now_playing()
        .await
        .map(|playing| NowPlayingInfo {
            playlist_id: playing.playlist_id,
            video_id: playing.video_id,
        });
    let ad_break = app.state.get_ad_break().await.map(|ad| AdBreakInfo {
        video_id: ad.video_id,
        started_at: ad.started_at,
    });
    let timing = app.state.get_ad_timing().await;
    let ad_interval_ms = timing.map(|timing| timing.interval.as_millis() as u64);
    let ad_progress =
        timing.map(|timing| interval_progress(timing.last_tick.elapsed(), timing.interval));
    let last_error = app.state.get_last_error().await;

    Json(StatusResponse {
        phase,
        now_playing,
        ad_break,
        ad_interval_ms,
        ad_progress,
        last_error,
    })
}

// ============================================================================
// Widget Event Intake
// ============================================================================

/// POST /api/v1/player/event - widget event intake
///
/// Forwards ready and state-change reports from the playback widget into
/// the session engine's message queue.
pub async fn post_player_event(
    State(app): State<AppState>,
    Json(event): Json<PlayerEvent>,
) -> Result<Json<AckResponse>, StatusCode> {
    debug!(?event, "Player event received");

    if app
        .engine_tx
        .send(SessionMessage::Player(event))
        .is_err()
    {
        warn!("Session engine is not running, dropping player event");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(AckResponse {
        status: "ok".to_string(),
    }))
}
