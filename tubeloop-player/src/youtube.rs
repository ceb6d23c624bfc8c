//! YouTube playlist-items API client
//!
//! Fetches the ordered video IDs of a remote playlist. One outbound request
//! per call, credentialed with the configured API key. Errors are typed here
//! and logged by the caller; there is no retry.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("tubeloop/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size requested from the playlist-items endpoint
const MAX_RESULTS: u32 = 20;

/// Playlist client errors
#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid API key")]
    InvalidApiKey,
}

/// playlistItems list response
///
/// Only the fields the session needs are modeled; a response missing any of
/// them fails deserialization rather than producing undefined values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItemsResponse {
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub resource_id: VideoResourceId,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResourceId {
    pub video_id: String,
}

/// Playlist-items API client
#[derive(Debug, Clone)]
pub struct PlaylistClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlaylistClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, YouTubeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    /// Fetch the ordered video IDs of a playlist
    pub async fn fetch_playlist_items(
        &self,
        playlist_id: &str,
    ) -> Result<Vec<String>, YouTubeError> {
        let url = self.request_url(playlist_id);

        tracing::debug!(playlist_id = %playlist_id, "Querying playlist-items API");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| YouTubeError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(YouTubeError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(YouTubeError::ApiError(status.as_u16(), error_text));
        }

        let items_response: PlaylistItemsResponse = response
            .json()
            .await
            .map_err(|e| YouTubeError::ParseError(e.to_string()))?;

        let video_ids: Vec<String> = items_response
            .items
            .into_iter()
            .map(|item| item.snippet.resource_id.video_id)
            .collect();

        tracing::info!(
            playlist_id = %playlist_id,
            videos = video_ids.len(),
            "Playlist items fetched"
        );

        Ok(video_ids)
    }

    /// Build the playlist-items request URL
    fn request_url(&self, playlist_id: &str) -> String {
        format!(
            "{}?part=id%2Csnippet&playlistId={}&key={}&type=video&order=date&maxResults={}",
            self.base_url, playlist_id, self.api_key, MAX_RESULTS
        )
    }
}
