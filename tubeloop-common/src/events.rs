//! Event types for the TubeLoop session event system
//!
//! Holds the session-level events broadcast to SSE subscribers and the wire
//! types exchanged with the playback widget (commands out, player events in).

use serde::{Deserialize, Serialize};

/// Player state-change code reported by the widget when a video finishes
pub const PLAYER_STATE_ENDED: i32 = 0;

/// Phase of the playback session state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Waiting for playlist contents (initial state, also the stalled state)
    Loading,
    /// A main playlist video is the active playback target
    PlayingMain,
    /// Current playlist exhausted; the next playlist is about to be fetched
    AdvancingPlaylist,
}

impl std::fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackPhase::Loading => write!(f, "loading"),
            PlaybackPhase::PlayingMain => write!(f, "playing_main"),
            PlaybackPhase::AdvancingPlaylist => write!(f, "advancing_playlist"),
        }
    }
}

/// Which widget player instance a command or event concerns
///
/// The widget keeps two player surfaces: the main playlist video and the ad
/// video. Exactly one of them is the active playback target at any time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Main,
    Ad,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Surface::Main => write!(f, "main"),
            Surface::Ad => write!(f, "ad"),
        }
    }
}

/// Command sent to the playback widget over the command stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Cue a video on the given surface without starting playback
    LoadVideo { surface: Surface, video_id: String },

    /// Start playback of the cued video on the given surface
    Play { surface: Surface },

    /// Pause the given surface, keeping the video loaded
    Pause { surface: Surface },

    /// Resume a previously paused surface without reloading it
    Resume { surface: Surface },
}

impl PlayerCommand {
    /// Get command type as string for SSE event naming
    pub fn command_type(&self) -> &str {
        match self {
            PlayerCommand::LoadVideo { .. } => "LoadVideo",
            PlayerCommand::Play { .. } => "Play",
            PlayerCommand::Pause { .. } => "Pause",
            PlayerCommand::Resume { .. } => "Resume",
        }
    }
}

/// Event reported by the playback widget
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// A player surface finished initializing and can accept playback
    Ready { surface: Surface },

    /// A player surface changed state; code 0 means the video ended
    StateChanged { surface: Surface, code: i32 },
}

/// TubeLoop session event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Session phase changed
    PhaseChanged {
        from: PlaybackPhase,
        to: PlaybackPhase,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playlist contents fetched and applied
    PlaylistLoaded {
        playlist_id: String,
        video_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A main playlist video became the active playback target
    VideoStarted {
        playlist_id: String,
        video_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The scheduler interrupted main playback with an ad video
    AdBreakStarted {
        video_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The ad video finished and main playback resumed
    AdBreakFinished {
        video_id: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The session cannot proceed (configuration or fetch failure)
    SessionStalled {
        reason: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            SessionEvent::PhaseChanged { .. } => "PhaseChanged",
            SessionEvent::PlaylistLoaded { .. } => "PlaylistLoaded",
            SessionEvent::VideoStarted { .. } => "VideoStarted",
            SessionEvent::AdBreakStarted { .. } => "AdBreakStarted",
            SessionEvent::AdBreakFinished { .. } => "AdBreakFinished",
            SessionEvent::SessionStalled { .. } => "SessionStalled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&PlaybackPhase::PlayingMain).unwrap();
        assert_eq!(json, "\"playing_main\"");

        let parsed: PlaybackPhase = serde_json::from_str("\"advancing_playlist\"").unwrap();
        assert_eq!(parsed, PlaybackPhase::AdvancingPlaylist);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(PlaybackPhase::Loading.to_string(), "loading");
        assert_eq!(PlaybackPhase::PlayingMain.to_string(), "playing_main");
        assert_eq!(PlaybackPhase::AdvancingPlaylist.to_string(), "advancing_playlist");
    }

    #[test]
    fn test_player_command_serialization() {
        let cmd = PlayerCommand::LoadVideo {
            surface: Surface::Main,
            video_id: "dQw4w9WgXcQ".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"LoadVideo\""));
        assert!(json.contains("\"surface\":\"main\""));
        assert!(json.contains("\"video_id\":\"dQw4w9WgXcQ\""));

        let parsed: PlayerCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, cmd);
    }

    #[test]
    fn test_player_event_deserialization() {
        // The widget posts events in exactly this shape
        let ready: PlayerEvent =
            serde_json::from_str(r#"{"type":"Ready","surface":"ad"}"#).unwrap();
        assert_eq!(ready, PlayerEvent::Ready { surface: Surface::Ad });

        let ended: PlayerEvent =
            serde_json::from_str(r#"{"type":"StateChanged","surface":"main","code":0}"#).unwrap();
        assert_eq!(
            ended,
            PlayerEvent::StateChanged {
                surface: Surface::Main,
                code: PLAYER_STATE_ENDED
            }
        );
    }

    #[test]
    fn test_session_event_serialization() {
        let event = SessionEvent::AdBreakStarted {
            video_id: "a3ICNMQW7Ok".to_string(),
            timestamp: Utc::now(),
        };

        assert_eq!(event.event_type(), "AdBreakStarted");

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"AdBreakStarted\""));
        assert!(json.contains("\"video_id\":\"a3ICNMQW7Ok\""));

        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            SessionEvent::AdBreakStarted { video_id, .. } => {
                assert_eq!(video_id, "a3ICNMQW7Ok");
            }
            _ => panic!("Wrong event type deserialized"),
        }
    }

    #[test]
    fn test_phase_changed_round_trip() {
        let event = SessionEvent::PhaseChanged {
            from: PlaybackPhase::Loading,
            to: PlaybackPhase::PlayingMain,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"PhaseChanged\""));
        assert!(json.contains("\"from\":\"loading\""));
        assert!(json.contains("\"to\":\"playing_main\""));

        let deserialized: SessionEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            SessionEvent::PhaseChanged { from, to, .. } => {
                assert_eq!(from, PlaybackPhase::Loading);
                assert_eq!(to, PlaybackPhase::PlayingMain);
            }
            _ => panic!("Wrong event type deserialized"),
        }
    }

    #[test]
    fn test_event_types_are_distinct() {
        let now = Utc::now();
        let events = [
            SessionEvent::PhaseChanged {
                from: PlaybackPhase::Loading,
                to: PlaybackPhase::PlayingMain,
                timestamp: now,
            },
            SessionEvent::PlaylistLoaded {
                playlist_id: "PL1".to_string(),
                video_count: 3,
                timestamp: now,
            },
            SessionEvent::VideoStarted {
                playlist_id: "PL1".to_string(),
                video_id: "v1".to_string(),
                timestamp: now,
            },
            SessionEvent::AdBreakStarted {
                video_id: "a1".to_string(),
                timestamp: now,
            },
            SessionEvent::AdBreakFinished {
                video_id: "a1".to_string(),
                timestamp: now,
            },
            SessionEvent::SessionStalled {
                reason: "no playlists configured".to_string(),
                timestamp: now,
            },
        ];

        let mut types: Vec<&str> = events.iter().map(|e| e.event_type()).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), events.len());
    }
}
