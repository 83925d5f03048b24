//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with API key handling, typed response deserialization, and
//! the Google error envelope. Requests are strictly sequential: each page or
//! batch waits for the previous one to complete.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tubecast_core::VideoRecord;

use crate::error::CollectorError;
use crate::types::{ChannelItem, ErrorEnvelope, ListResponse, PlaylistItem, VideoItem};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3/";

/// The `videos` endpoint accepts at most this many comma-separated ids.
pub const VIDEO_BATCH_SIZE: usize = 50;

/// Maximum number of playlist pages to walk before giving up.
/// Prevents infinite loops on a cycling `nextPageToken`.
pub const MAX_PAGES: usize = 1_000;

/// Explicit collector settings, built by the caller from [`tubecast_core::AppConfig`].
#[derive(Clone)]
pub struct CollectorConfig {
    pub api_key: String,
    pub channel_id: String,
    /// `maxResults` for playlist pages (1..=50).
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("api_key", &"[redacted]")
            .field("channel_id", &self.channel_id)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or [`YoutubeClient::with_base_url`]
/// to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    config: CollectorConfig,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: CollectorConfig) -> Result<Self, CollectorError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`CollectorError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(config: CollectorConfig, base_url: &str) -> Result<Self, CollectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash so `Url::join` appends the endpoint
        // instead of replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CollectorError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    /// Channel configured at construction.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.config.channel_id
    }

    /// Collects every upload of the configured channel.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_channel_video_records`].
    pub async fn collect(&self) -> Result<Vec<VideoRecord>, CollectorError> {
        let channel_id = self.config.channel_id.clone();
        self.fetch_channel_video_records(&channel_id).await
    }

    /// Fetches raw records for every video uploaded by `channel_id`.
    ///
    /// Resolves the uploads playlist, walks all of its pages, then fetches
    /// statistics in batches of [`VIDEO_BATCH_SIZE`].
    ///
    /// # Errors
    ///
    /// Propagates the first failure from any step; nothing is retried.
    pub async fn fetch_channel_video_records(
        &self,
        channel_id: &str,
    ) -> Result<Vec<VideoRecord>, CollectorError> {
        let playlist_id = self.fetch_uploads_playlist_id(channel_id).await?;
        let video_ids = self.fetch_video_ids(&playlist_id).await?;
        let records = self.fetch_video_stats(&video_ids).await?;
        tracing::info!(
            channel_id,
            videos = video_ids.len(),
            records = records.len(),
            "collected channel video records"
        );
        Ok(records)
    }

    /// Looks up the id of the channel's uploads playlist.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::ChannelNotFound`] if the API returns no items.
    /// - [`CollectorError::Api`] / [`CollectorError::Http`] on request failure.
    /// - [`CollectorError::Deserialize`] if the body has an unexpected shape.
    pub async fn fetch_uploads_playlist_id(
        &self,
        channel_id: &str,
    ) -> Result<String, CollectorError> {
        tracing::debug!(channel_id, "fetching uploads playlist id");
        let url = self.build_url(
            "channels",
            &[("part", "contentDetails"), ("id", channel_id)],
        )?;
        let response: ListResponse<ChannelItem> = self
            .request_json(url, &format!("channels(id={channel_id})"))
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.content_details.related_playlists.uploads)
            .ok_or_else(|| CollectorError::ChannelNotFound {
                channel_id: channel_id.to_owned(),
            })
    }

    /// Walks every page of a playlist and returns its video ids in API order.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::PaginationLimit`] after [`MAX_PAGES`] pages,
    /// or the first request/deserialization failure.
    pub async fn fetch_video_ids(&self, playlist_id: &str) -> Result<Vec<String>, CollectorError> {
        let page_size = self.config.page_size.to_string();
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CollectorError::PaginationLimit {
                    playlist_id: playlist_id.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let url = {
                let mut params = vec![
                    ("part", "contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", page_size.as_str()),
                ];
                if let Some(token) = page_token.as_deref() {
                    params.push(("pageToken", token));
                }
                self.build_url("playlistItems", &params)?
            };
            let response: ListResponse<PlaylistItem> = self
                .request_json(
                    url,
                    &format!("playlistItems(playlistId={playlist_id}, page={page_count})"),
                )
                .await?;

            video_ids.extend(
                response
                    .items
                    .into_iter()
                    .map(|item| item.content_details.video_id),
            );

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        tracing::info!(playlist_id, videos = video_ids.len(), "found playlist videos");
        Ok(video_ids)
    }

    /// Fetches snippet, statistics, and content details for `video_ids`.
    ///
    /// Ids the API does not return (deleted or private videos) are silently
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Returns the first request/deserialization failure.
    pub async fn fetch_video_stats(
        &self,
        video_ids: &[String],
    ) -> Result<Vec<VideoRecord>, CollectorError> {
        let mut records = Vec::with_capacity(video_ids.len());

        for (batch_idx, batch) in video_ids.chunks(VIDEO_BATCH_SIZE).enumerate() {
            let ids = batch.join(",");
            let url = self.build_url(
                "videos",
                &[("part", "snippet,statistics,contentDetails"), ("id", &ids)],
            )?;
            let response: ListResponse<VideoItem> = self
                .request_json(url, &format!("videos(batch={batch_idx})"))
                .await?;
            records.extend(response.items.into_iter().map(VideoItem::into_record));
        }

        Ok(records)
    }

    /// Builds an endpoint URL with percent-encoded query parameters and the API key.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, CollectorError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| CollectorError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.config.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request and parses a 2xx body as `T`.
    ///
    /// `context` names the call in errors; it never contains the API key.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, CollectorError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = extract_api_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
            tracing::error!(status = status.as_u16(), %message, context, "YouTube API request failed");
            return Err(CollectorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| CollectorError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

/// Pulls `error.message` out of a Google API error body, if present.
fn extract_api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CollectorConfig {
        CollectorConfig {
            api_key: "test-key".to_string(),
            channel_id: "UC123".to_string(),
            page_size: 50,
            request_timeout_secs: 30,
            user_agent: "tubecast-test/0.1".to_string(),
        }
    }

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::with_base_url(test_config(), base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_appends_endpoint_and_key() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client
            .build_url("channels", &[("part", "contentDetails"), ("id", "UC123")])
            .expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/channels?part=contentDetails&id=UC123&key=test-key"
        );
    }

    #[test]
    fn build_url_tolerates_trailing_slash() {
        let client = test_client("https://www.googleapis.com/youtube/v3/");
        let url = client.build_url("videos", &[]).expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/videos?key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_comma_separated_ids() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client
            .build_url("videos", &[("id", "a,b c")])
            .expect("valid url");
        assert!(
            url.as_str().contains("id=a%2Cb+c"),
            "ids should be percent-encoded: {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = YoutubeClient::with_base_url(test_config(), "not a url");
        assert!(matches!(result, Err(CollectorError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", test_config());
        assert!(!rendered.contains("test-key"));
    }

    #[test]
    fn extract_api_error_message_reads_google_envelope() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota."}}"#;
        assert_eq!(
            extract_api_error_message(body).as_deref(),
            Some("The request cannot be completed because you have exceeded your quota.")
        );
    }

    #[test]
    fn extract_api_error_message_ignores_non_json() {
        assert_eq!(extract_api_error_message("<html>bad gateway</html>"), None);
    }
}
