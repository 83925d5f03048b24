use thiserror::Error;

/// Errors returned by the `YouTube` Data API collector.
///
/// None of these are retried; a failed run produces no raw CSV.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("YouTube API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("channel not found: {channel_id}")]
    ChannelNotFound { channel_id: String },

    #[error("pagination limit reached for playlist {playlist_id}: exceeded {max_pages} pages")]
    PaginationLimit {
        playlist_id: String,
        max_pages: usize,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
