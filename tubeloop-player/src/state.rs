//! Shared session state
//!
//! Thread-safe snapshot of the playback session, written by the session
//! engine and read by the HTTP handlers. Also owns the broadcast channels
//! carrying session events (to SSE subscribers) and player commands (to the
//! widget).

use std::time::{Duration, Instant};

use tokio::sync::{broadcast, RwLock};
use tubeloop_common::events::{PlaybackPhase, PlayerCommand, SessionEvent};

/// Currently selected main video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// Playlist the video came from
    pub playlist_id: String,
    /// Video identifier
    pub video_id: String,
}

/// Active ad break information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdBreak {
    /// Ad video currently playing
    pub video_id: String,
    /// When the break started
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// Ad timer bookkeeping for the interval progress indicator
#[derive(Debug, Clone, Copy)]
pub struct AdTiming {
    /// When the ad timer last fired (or the session started)
    pub last_tick: Instant,
    /// Interval between scheduler ticks
    pub interval: Duration,
}

/// Shared state accessible by all components
///
/// Uses RwLock for concurrent read access with rare writes
pub struct SharedState {
    /// Current session phase
    pub phase: RwLock<PlaybackPhase>,

    /// Currently selected main video (None until the first playlist loads)
    pub now_playing: RwLock<Option<NowPlaying>>,

    /// Active ad break (None outside ad breaks)
    pub ad_break: RwLock<Option<AdBreak>>,

    /// Last session error, kept while the session is stalled
    pub last_error: RwLock<Option<String>>,

    /// Ad timer bookkeeping (None until the engine starts)
    pub ad_timing: RwLock<Option<AdTiming>>,

    /// Event broadcaster for SSE events
    pub event_tx: broadcast::Sender<SessionEvent>,

    /// Command broadcaster for connected widgets
    pub command_tx: broadcast::Sender<PlayerCommand>,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100); // Buffer up to 100 events
        let (command_tx, _) = broadcast::channel(100);
        Self {
            phase: RwLock::new(PlaybackPhase::Loading),
            now_playing: RwLock::new(None),
            ad_break: RwLock::new(None),
            last_error: RwLock::new(None),
            ad_timing: RwLock::new(None),
            event_tx,
            command_tx,
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: SessionEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to the session event stream
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Send a player command to all connected widgets
    pub fn send_command(&self, command: PlayerCommand) {
        // Ignore send errors (no widget connected is OK)
        let _ = self.command_tx.send(command);
    }

    /// Subscribe to the player command stream
    pub fn subscribe_commands(&self) -> broadcast::Receiver<PlayerCommand> {
        self.command_tx.subscribe()
    }

    /// Get current session phase
    pub async fn get_phase(&self) -> PlaybackPhase {
        *self.phase.read().await
    }

    /// Set session phase
    pub async fn set_phase(&self, phase: PlaybackPhase) {
        *self.phase.write().await = phase;
    }

    /// Get currently selected main video
    pub async fn get_now_playing(&self) -> Option<NowPlaying> {
        self.now_playing.read().await.clone()
    }

    /// Set currently selected main video
    pub async fn set_now_playing(&self, now_playing: Option<NowPlaying>) {
        *self.now_playing.write().await = now_playing;
    }

    /// Get active ad break
    pub async fn get_ad_break(&self) -> Option<AdBreak> {
        self.ad_break.read().await.clone()
    }

    /// Set active ad break
    pub async fn set_ad_break(&self, ad_break: Option<AdBreak>) {
        *self.ad_break.write().await = ad_break;
    }

    /// Get last session error
    pub async fn get_last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Set last session error
    pub async fn set_last_error(&self, error: Option<String>) {
        *self.last_error.write().await = error;
    }

    /// Initialize ad timer bookkeeping at session start
    pub async fn set_ad_interval(&self, interval: Duration) {
        *self.ad_timing.write().await = Some(AdTiming {
            last_tick: Instant::now(),
            interval,
        });
    }

    /// Record an ad timer tick
    pub async fn mark_ad_tick(&self) {
        let mut timing = self.ad_timing.write().await;
        if let Some(timing) = timing.as_mut() {
            timing.last_tick = Instant::now();
        }
    }

    /// Get ad timer bookkeeping
    pub async fn get_ad_timing(&self) -> Option<AdTiming> {
        *self.ad_timing.read().await
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}
