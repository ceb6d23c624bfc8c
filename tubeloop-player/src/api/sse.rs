//! Server-Sent Events (SSE) broadcasters
//!
//! Streams session events to observers and player commands to connected
//! playback widgets.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

use crate::api::AppState;

/// GET /api/v1/events - session event stream
pub async fn event_stream(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE event client connected");

    let rx = app.state.subscribe_events();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => {
                    let event_type = event.event_type().to_string();
                    debug!("Broadcasting SSE event: {}", event_type);

                    Some(Ok(Event::default().event(event_type).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize session event: {}", e);
                    None
                }
            },
            Err(e) => {
                // BroadcastStream error (lagged or closed)
                warn!("SSE event stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// GET /api/v1/player/commands - player command stream
///
/// The playback widget holds this stream open and applies each command to
/// its player surfaces.
pub async fn command_stream(
    State(app): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("New SSE command client connected");

    let rx = app.state.subscribe_commands();

    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(command) => match serde_json::to_string(&command) {
                Ok(json) => {
                    let command_type = command.command_type().to_string();
                    debug!("Broadcasting SSE command: {}", command_type);

                    Some(Ok(Event::default().event(command_type).data(json)))
                }
                Err(e) => {
                    warn!("Failed to serialize player command: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("SSE command stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
