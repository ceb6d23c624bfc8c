//! Playlist rotation and video position tracking
//!
//! Tracks which playlist is active, which video within it is playing,
//! and what phase the session is in. The cursor is a pure state machine;
//! the engine drives it and performs the actual fetches and commands.

use tubeloop_common::events::PlaybackPhase;
use tubeloop_common::{Error, Result};

/// Result of advancing past the end of a video
///
/// Tells the engine what work is needed to continue playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Another video is available in the already-loaded playlist
    NextVideo(String),

    /// The loaded playlist is exhausted; fetch the playlist with this id
    LoadPlaylist(String),

    /// No main video is playing (loading, or mid playlist switch)
    NotPlaying,
}

/// Cursor over the configured playlist rotation
///
/// Playlists rotate in configuration order. Within a playlist, videos
/// play in fetched order. When the last video of a playlist finishes the
/// cursor moves to the next playlist, wrapping at the end of the list.
/// A single-playlist rotation wraps within the loaded video list without
/// requiring a refetch.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    /// Configured playlist ids, in rotation order
    playlist_ids: Vec<String>,

    /// Index into `playlist_ids` of the playlist being played (or fetched)
    playlist_index: usize,

    /// Video ids of the currently loaded playlist, in fetched order
    video_ids: Vec<String>,

    /// Index into `video_ids` of the video being played
    video_index: usize,

    /// Current session phase
    phase: PlaybackPhase,
}

impl PlaybackCursor {
    /// Create a cursor positioned at the first configured playlist
    ///
    /// Starts in `Loading`; call `playlist_loaded` once the first fetch
    /// completes.
    pub fn new(playlist_ids: Vec<String>) -> Self {
        Self {
            playlist_ids,
            playlist_index: 0,
            video_ids: Vec::new(),
            video_index: 0,
            phase: PlaybackPhase::Loading,
        }
    }

    /// Current session phase
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Id of the playlist the cursor currently points at
    ///
    /// Returns None when no playlists are configured.
    pub fn current_playlist_id(&self) -> Option<&str> {
        self.playlist_ids.get(self.playlist_index).map(|s| s.as_str())
    }

    /// Id of the video the cursor currently points at
    ///
    /// Returns None until a playlist has been loaded.
    pub fn current_video_id(&self) -> Option<&str> {
        if self.phase == PlaybackPhase::PlayingMain {
            self.video_ids.get(self.video_index).map(|s| s.as_str())
        } else {
            None
        }
    }

    /// Whether a main video is currently playing
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::PlayingMain
    }

    /// Mark the start of a playlist fetch
    ///
    /// Clears any previously loaded videos so a stale list cannot be
    /// advanced into while the fetch is in flight.
    pub fn begin_loading(&mut self) {
        self.video_ids.clear();
        self.video_index = 0;
        self.phase = PlaybackPhase::Loading;
    }

    /// Install a fetched video list and return the first video to play
    ///
    /// Transitions to `PlayingMain`. An empty list leaves the cursor in
    /// its current non-playing phase and returns an error; the session
    /// stalls rather than spinning on an unplayable playlist.
    pub fn playlist_loaded(&mut self, video_ids: Vec<String>) -> Result<String> {
        if video_ids.is_empty() {
            return Err(Error::Fetch(format!(
                "playlist {} contains no videos",
                self.current_playlist_id().unwrap_or("<none>")
            )));
        }

        self.video_ids = video_ids;
        self.video_index = 0;
        self.phase = PlaybackPhase::PlayingMain;
        Ok(self.video_ids[0].clone())
    }

    /// Advance past the video that just ended
    ///
    /// Only meaningful while `PlayingMain`; in any other phase the ended
    /// signal is stale and the caller should ignore it.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.phase != PlaybackPhase::PlayingMain {
            return AdvanceOutcome::NotPlaying;
        }

        self.video_index += 1;
        if self.video_index < self.video_ids.len() {
            return AdvanceOutcome::NextVideo(self.video_ids[self.video_index].clone());
        }

        // Playlist exhausted. With a single configured playlist the loaded
        // list is still current, so wrap without refetching.
        if self.playlist_ids.len() <= 1 {
            self.video_index = 0;
            return match self.video_ids.first() {
                Some(id) => AdvanceOutcome::NextVideo(id.clone()),
                None => AdvanceOutcome::NotPlaying,
            };
        }

        self.playlist_index = (self.playlist_index + 1) % self.playlist_ids.len();
        self.phase = PlaybackPhase::AdvancingPlaylist;
        AdvanceOutcome::LoadPlaylist(self.playlist_ids[self.playlist_index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cursor_starts_loading() {
        let cursor = PlaybackCursor::new(vec!["PL1".to_string(), "PL2".to_string()]);
        assert_eq!(cursor.phase(), PlaybackPhase::Loading);
        assert_eq!(cursor.current_playlist_id(), Some("PL1"));
        assert_eq!(cursor.current_video_id(), None);
        assert!(!cursor.is_playing());
    }

    #[test]
    fn test_playlist_loaded_starts_first_video() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string()]);
        let first = cursor
            .playlist_loaded(vec!["v1".to_string(), "v2".to_string()])
            .unwrap();
        assert_eq!(first, "v1");
        assert_eq!(cursor.phase(), PlaybackPhase::PlayingMain);
        assert_eq!(cursor.current_video_id(), Some("v1"));
    }

    #[test]
    fn test_empty_playlist_is_an_error() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string()]);
        let err = cursor.playlist_loaded(vec![]).unwrap_err();
        assert!(matches!(err, Error::Fetch(_)));
        // Cursor stays in Loading so the session reports a stall instead
        // of claiming playback.
        assert_eq!(cursor.phase(), PlaybackPhase::Loading);
        assert_eq!(cursor.current_video_id(), None);
    }

    #[test]
    fn test_advance_within_playlist() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string(), "PL2".to_string()]);
        cursor
            .playlist_loaded(vec!["v1".to_string(), "v2".to_string(), "v3".to_string()])
            .unwrap();

        assert_eq!(cursor.advance(), AdvanceOutcome::NextVideo("v2".to_string()));
        assert_eq!(cursor.current_video_id(), Some("v2"));
        assert_eq!(cursor.advance(), AdvanceOutcome::NextVideo("v3".to_string()));
        assert_eq!(cursor.current_video_id(), Some("v3"));
    }

    #[test]
    fn test_single_playlist_wraps_without_refetch() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string()]);
        cursor
            .playlist_loaded(vec!["v1".to_string(), "v2".to_string()])
            .unwrap();

        assert_eq!(cursor.advance(), AdvanceOutcome::NextVideo("v2".to_string()));
        // End of the only playlist: wrap to the first video, stay playing.
        assert_eq!(cursor.advance(), AdvanceOutcome::NextVideo("v1".to_string()));
        assert_eq!(cursor.phase(), PlaybackPhase::PlayingMain);
        assert_eq!(cursor.current_playlist_id(), Some("PL1"));
    }

    #[test]
    fn test_playlist_rotation_order() {
        let mut cursor = PlaybackCursor::new(vec![
            "PL1".to_string(),
            "PL2".to_string(),
            "PL3".to_string(),
        ]);

        cursor.playlist_loaded(vec!["a1".to_string()]).unwrap();
        assert_eq!(
            cursor.advance(),
            AdvanceOutcome::LoadPlaylist("PL2".to_string())
        );
        assert_eq!(cursor.phase(), PlaybackPhase::AdvancingPlaylist);
        assert_eq!(cursor.current_playlist_id(), Some("PL2"));

        cursor.playlist_loaded(vec!["b1".to_string()]).unwrap();
        assert_eq!(
            cursor.advance(),
            AdvanceOutcome::LoadPlaylist("PL3".to_string())
        );

        cursor.playlist_loaded(vec!["c1".to_string()]).unwrap();
        // Wraps back to the first configured playlist.
        assert_eq!(
            cursor.advance(),
            AdvanceOutcome::LoadPlaylist("PL1".to_string())
        );
    }

    #[test]
    fn test_advance_ignored_while_not_playing() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string(), "PL2".to_string()]);
        assert_eq!(cursor.advance(), AdvanceOutcome::NotPlaying);

        cursor.playlist_loaded(vec!["v1".to_string()]).unwrap();
        assert_eq!(
            cursor.advance(),
            AdvanceOutcome::LoadPlaylist("PL2".to_string())
        );
        // A second stale ended signal while the next playlist is fetching
        // must not advance anything.
        assert_eq!(cursor.advance(), AdvanceOutcome::NotPlaying);
    }

    #[test]
    fn test_begin_loading_clears_loaded_videos() {
        let mut cursor = PlaybackCursor::new(vec!["PL1".to_string(), "PL2".to_string()]);
        cursor.playlist_loaded(vec!["v1".to_string()]).unwrap();

        cursor.begin_loading();
        assert_eq!(cursor.phase(), PlaybackPhase::Loading);
        assert_eq!(cursor.current_video_id(), None);
        assert_eq!(cursor.advance(), AdvanceOutcome::NotPlaying);
    }
}
