//! Session engine orchestration
//!
//! One task owns every playback decision. Widget events, ad pacing ticks,
//! and completed playlist fetches all arrive as messages on a single queue
//! and are handled strictly in arrival order, so no decision races another.
//! Outbound work is a broadcast: player commands to whichever widgets are
//! connected, session events to SSE subscribers.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tracing::{debug, error, info, warn};

use tubeloop_common::config::Config;
use tubeloop_common::events::{
    PlaybackPhase, PlayerCommand, PlayerEvent, SessionEvent, Surface, PLAYER_STATE_ENDED,
};

use crate::error::{Error, Result};
use crate::playback::cursor::{AdvanceOutcome, PlaybackCursor};
use crate::playback::scheduler::AdScheduler;
use crate::state::{AdBreak, NowPlaying, SharedState};
use crate::youtube::{PlaylistClient, YouTubeError};

/// Input processed by the session engine
///
/// Every external influence on playback arrives as one of these.
#[derive(Debug)]
pub enum SessionMessage {
    /// Event reported by the playback widget
    Player(PlayerEvent),

    /// The ad pacing timer fired
    AdTick,

    /// A playlist fetch finished
    ///
    /// Stamped with the generation of the request that started it; the
    /// engine drops results whose generation is no longer current.
    PlaylistFetched {
        generation: u64,
        playlist_id: String,
        result: std::result::Result<Vec<String>, YouTubeError>,
    },
}

/// Session engine, the coordinator of the playback session
///
/// Owns the playlist cursor and ad scheduler outright. Nothing else
/// mutates them; the HTTP API observes the session through `SharedState`
/// and injects widget events through the message queue.
pub struct SessionEngine {
    /// Shared state mirror read by the HTTP API
    state: Arc<SharedState>,

    /// Playlist API client
    client: PlaylistClient,

    /// Position in the playlist rotation
    cursor: PlaybackCursor,

    /// Ad rotation and pacing
    scheduler: AdScheduler,

    /// Weak sender handed to the ticker and fetch tasks
    ///
    /// Weak so the engine's helper tasks never keep the queue alive on
    /// their own: once every external sender is dropped the queue closes,
    /// the engine drains and exits, and the ticker stops on its next tick.
    tx: WeakUnboundedSender<SessionMessage>,

    /// Message queue drained by `run`
    rx: UnboundedReceiver<SessionMessage>,

    /// Generation stamp of the most recent fetch request
    fetch_generation: u64,

    /// Whether the widget's main surface has reported ready
    main_ready: bool,

    /// Whether the widget's ad surface has reported ready
    ad_ready: bool,

    /// Video id of the ad break in progress, if any
    active_ad: Option<String>,
}

impl SessionEngine {
    /// Create a session engine from validated configuration
    ///
    /// Returns the engine plus a sender for injecting messages (the HTTP
    /// API uses it to deliver widget events).
    pub fn new(
        config: Config,
        state: Arc<SharedState>,
    ) -> Result<(Self, UnboundedSender<SessionMessage>)> {
        let client = PlaylistClient::new(config.api_base_url.clone(), config.api_key.clone())
            .map_err(|e| Error::Internal(format!("failed to build playlist client: {}", e)))?;
        let scheduler = AdScheduler::new(config.ad_video_ids.clone(), config.ads_per_hour)?;
        let cursor = PlaybackCursor::new(config.playlists.clone());

        let (engine_tx, rx) = mpsc::unbounded_channel();

        Ok((
            Self {
                state,
                client,
                cursor,
                scheduler,
                tx: engine_tx.downgrade(),
                rx,
                fetch_generation: 0,
                main_ready: false,
                ad_ready: false,
                active_ad: None,
            },
            engine_tx,
        ))
    }

    /// Run the session until the message queue closes
    ///
    /// Starts the ad ticker, kicks off the first playlist fetch, then
    /// processes messages in arrival order.
    pub async fn run(mut self) {
        info!("Session engine starting");

        self.state.set_ad_interval(self.scheduler.interval()).await;
        spawn_ticker(self.tx.clone(), self.scheduler.interval());
        self.start_session().await;

        while let Some(message) = self.rx.recv().await {
            self.handle_message(message).await;
        }

        info!("Session engine stopped");
    }

    /// Begin the session by fetching the first configured playlist
    ///
    /// With no playlists configured the fetcher is never called; the
    /// session stalls in `Loading` until the configuration is fixed.
    async fn start_session(&mut self) {
        let playlist_id = match self.cursor.current_playlist_id() {
            Some(id) => id.to_string(),
            None => {
                error!("Configuration error: no playlists configured, session stalled");
                self.stall("no playlists configured".to_string()).await;
                return;
            }
        };

        self.start_fetch(playlist_id).await;
    }

    /// Process one message
    pub async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Player(event) => self.handle_player_event(event).await,
            SessionMessage::AdTick => self.handle_ad_tick().await,
            SessionMessage::PlaylistFetched {
                generation,
                playlist_id,
                result,
            } => {
                self.handle_playlist_fetched(generation, playlist_id, result)
                    .await
            }
        }
    }

    async fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready { surface } => self.handle_surface_ready(surface).await,
            PlayerEvent::StateChanged { surface, code } => {
                if code != PLAYER_STATE_ENDED {
                    debug!(surface = %surface, code, "Ignoring player state change");
                    return;
                }
                match surface {
                    Surface::Main => self.handle_main_ended().await,
                    Surface::Ad => self.handle_ad_ended().await,
                }
            }
        }
    }

    /// A widget surface finished initializing
    ///
    /// Commands are only deliverable to a ready surface, so the current
    /// video (main or ad) is sent again here. This both completes the
    /// initial ready/play handshake and restores a widget that reconnects
    /// mid session.
    async fn handle_surface_ready(&mut self, surface: Surface) {
        info!(surface = %surface, "Player surface ready");

        match surface {
            Surface::Main => {
                self.main_ready = true;
                if let Some(video_id) = self.cursor.current_video_id() {
                    self.state.send_command(PlayerCommand::LoadVideo {
                        surface: Surface::Main,
                        video_id: video_id.to_string(),
                    });
                    // During an ad break the main video stays cued and
                    // unstarted until the break's Resume.
                    if self.active_ad.is_none() {
                        self.state.send_command(PlayerCommand::Play {
                            surface: Surface::Main,
                        });
                    }
                }
            }
            Surface::Ad => {
                self.ad_ready = true;
                if let Some(video_id) = &self.active_ad {
                    self.state.send_command(PlayerCommand::LoadVideo {
                        surface: Surface::Ad,
                        video_id: video_id.clone(),
                    });
                    self.state.send_command(PlayerCommand::Play {
                        surface: Surface::Ad,
                    });
                }
            }
        }
    }

    /// The main surface reported its video ended
    async fn handle_main_ended(&mut self) {
        if self.active_ad.is_some() {
            // The main surface is paused for the whole ad break; an ended
            // report here is stale.
            debug!("Ignoring main video ended during ad break");
            return;
        }

        let from = self.cursor.phase();
        match self.cursor.advance() {
            AdvanceOutcome::NextVideo(video_id) => {
                self.start_main_video(video_id).await;
            }
            AdvanceOutcome::LoadPlaylist(playlist_id) => {
                self.publish_phase(from).await;
                info!(playlist_id = %playlist_id, "Playlist exhausted, advancing rotation");
                self.start_fetch(playlist_id).await;
            }
            AdvanceOutcome::NotPlaying => {
                debug!("Ignoring video ended outside main playback");
            }
        }
    }

    /// The ad pacing timer fired
    ///
    /// A tick only starts a break when a main video is actually playing
    /// and the ad surface can take the video. Skipped ticks do not
    /// advance the ad rotation.
    async fn handle_ad_tick(&mut self) {
        self.state.mark_ad_tick().await;

        if self.active_ad.is_some() {
            debug!("Ad tick during an active ad break, skipping");
            return;
        }
        if !self.cursor.is_playing() {
            debug!(phase = %self.cursor.phase(), "Ad tick outside main playback, skipping");
            return;
        }
        if !self.ad_ready {
            warn!("Ad tick with no ready ad surface, skipping break");
            return;
        }

        let video_id = self.scheduler.next_ad_video();
        info!(video_id = %video_id, "Starting ad break");

        self.state.send_command(PlayerCommand::Pause {
            surface: Surface::Main,
        });
        self.state.send_command(PlayerCommand::LoadVideo {
            surface: Surface::Ad,
            video_id: video_id.clone(),
        });
        self.state.send_command(PlayerCommand::Play {
            surface: Surface::Ad,
        });

        self.active_ad = Some(video_id.clone());
        self.state
            .set_ad_break(Some(AdBreak {
                video_id: video_id.clone(),
                started_at: Utc::now(),
            }))
            .await;
        self.state.broadcast_event(SessionEvent::AdBreakStarted {
            video_id,
            timestamp: Utc::now(),
        });
    }

    /// The ad surface reported its video ended
    ///
    /// The main video stayed loaded and paused for the whole break, so a
    /// resume continues from the pause point. No position is saved or
    /// restored here.
    async fn handle_ad_ended(&mut self) {
        let video_id = match self.active_ad.take() {
            Some(id) => id,
            None => {
                debug!("Ignoring ad ended with no ad break active");
                return;
            }
        };

        info!(video_id = %video_id, "Ad break finished, resuming main playback");

        self.state.set_ad_break(None).await;
        self.state.send_command(PlayerCommand::Resume {
            surface: Surface::Main,
        });
        self.state.broadcast_event(SessionEvent::AdBreakFinished {
            video_id,
            timestamp: Utc::now(),
        });
    }

    /// A playlist fetch task finished
    async fn handle_playlist_fetched(
        &mut self,
        generation: u64,
        playlist_id: String,
        result: std::result::Result<Vec<String>, YouTubeError>,
    ) {
        if generation != self.fetch_generation {
            debug!(
                generation,
                current = self.fetch_generation,
                "Dropping stale playlist fetch result"
            );
            return;
        }

        match result {
            Ok(video_ids) => {
                let video_count = video_ids.len();
                let from = self.cursor.phase();
                match self.cursor.playlist_loaded(video_ids) {
                    Ok(first_video) => {
                        info!(playlist_id = %playlist_id, video_count, "Playlist loaded");
                        self.state.set_last_error(None).await;
                        self.publish_phase(from).await;
                        self.state.broadcast_event(SessionEvent::PlaylistLoaded {
                            playlist_id: playlist_id.clone(),
                            video_count,
                            timestamp: Utc::now(),
                        });
                        self.start_main_video(first_video).await;
                    }
                    Err(e) => {
                        error!(playlist_id = %playlist_id, "Fetch error: {}", e);
                        self.stall(e.to_string()).await;
                    }
                }
            }
            Err(e) => {
                error!(playlist_id = %playlist_id, "Fetch error: playlist fetch failed: {}", e);
                self.stall(format!("playlist {} fetch failed: {}", playlist_id, e))
                    .await;
            }
        }
    }

    /// Make a video the active main playback target
    async fn start_main_video(&mut self, video_id: String) {
        let playlist_id = self
            .cursor
            .current_playlist_id()
            .unwrap_or_default()
            .to_string();

        info!(playlist_id = %playlist_id, video_id = %video_id, "Starting video");

        self.state
            .set_now_playing(Some(NowPlaying {
                playlist_id: playlist_id.clone(),
                video_id: video_id.clone(),
            }))
            .await;

        if self.main_ready {
            self.state.send_command(PlayerCommand::LoadVideo {
                surface: Surface::Main,
                video_id: video_id.clone(),
            });
            self.state.send_command(PlayerCommand::Play {
                surface: Surface::Main,
            });
        }

        self.state.broadcast_event(SessionEvent::VideoStarted {
            playlist_id,
            video_id,
            timestamp: Utc::now(),
        });
    }

    /// Start an asynchronous playlist fetch for the cursor's playlist
    ///
    /// Bumps the fetch generation so any result still in flight from an
    /// earlier request is dropped when it lands.
    async fn start_fetch(&mut self, playlist_id: String) {
        let from = self.cursor.phase();
        self.cursor.begin_loading();
        self.publish_phase(from).await;
        self.state.set_now_playing(None).await;

        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        let client = self.client.clone();
        let tx = self.tx.clone();

        debug!(playlist_id = %playlist_id, generation, "Fetching playlist");

        tokio::spawn(async move {
            let result = client.fetch_playlist_items(&playlist_id).await;
            // The queue may have closed mid-fetch; a result with nowhere
            // to go is simply dropped.
            if let Some(sender) = tx.upgrade() {
                let _ = sender.send(SessionMessage::PlaylistFetched {
                    generation,
                    playlist_id,
                    result,
                });
            }
        });
    }

    /// Record a stall and notify subscribers
    ///
    /// The caller logs the underlying error; this only publishes it.
    async fn stall(&self, reason: String) {
        self.state.set_last_error(Some(reason.clone())).await;
        self.state.broadcast_event(SessionEvent::SessionStalled {
            reason,
            timestamp: Utc::now(),
        });
    }

    /// Mirror a cursor phase change into shared state and the event stream
    async fn publish_phase(&self, from: PlaybackPhase) {
        let to = self.cursor.phase();
        if from == to {
            return;
        }

        debug!(from = %from, to = %to, "Session phase changed");
        self.state.set_phase(to).await;
        self.state.broadcast_event(SessionEvent::PhaseChanged {
            from,
            to,
            timestamp: Utc::now(),
        });
    }
}

/// Post `AdTick` messages at the scheduler's pacing interval
///
/// Holds only a weak sender; once the queue closes the upgrade fails and
/// the ticker exits instead of posting into a torn-down session.
fn spawn_ticker(tx: WeakUnboundedSender<SessionMessage>, period: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // An interval's first tick completes immediately; consume it so
        // the first ad break fires one full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(sender) = tx.upgrade() else {
                break;
            };
            if sender.send(SessionMessage::AdTick).is_err() {
                break;
            }
        }
    });
}
