//! Response shapes for the three `YouTube` Data API list endpoints the
//! collector calls. Only the fields the pipeline needs are modelled.

use serde::Deserialize;

/// Common list envelope: `{ "items": [...], "nextPageToken": "..." }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    #[serde(default)]
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: VideoContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    pub category_id: Option<String>,
}

/// Counts arrive as decimal strings; any of them may be hidden by the owner.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    pub view_count: Option<String>,
    pub like_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
}

/// Google API error envelope: `{ "error": { "code": 403, "message": "..." } }`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}

impl VideoItem {
    /// Flattens an API item into a raw record, filling the same defaults the
    /// platform documents for absent fields.
    #[must_use]
    pub fn into_record(self) -> tubecast_core::VideoRecord {
        tubecast_core::VideoRecord {
            video_id: self.id,
            title: self.snippet.title,
            published_at: self.snippet.published_at,
            category: self
                .snippet
                .category_id
                .unwrap_or_else(|| "Unknown".to_string()),
            duration: self
                .content_details
                .duration
                .unwrap_or_else(|| "PT0S".to_string()),
            views: self.statistics.view_count.unwrap_or_else(zero),
            likes: self.statistics.like_count.unwrap_or_else(zero),
            comments: self.statistics.comment_count.unwrap_or_else(zero),
        }
    }
}

fn zero() -> String {
    "0".to_string()
}
