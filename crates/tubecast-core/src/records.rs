use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the raw collector output, exactly as the platform API
/// reported it. Every field is text; nothing has been validated yet.
/// Absent columns deserialize as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
    #[serde(rename = "VideoID")]
    pub video_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    /// Upload timestamp in the platform's format, e.g. `"2024-01-01T00:00:00Z"`.
    /// A cleaned file's `UploadDate` column is accepted too, so cleaned
    /// output can be fed back through the cleaner.
    #[serde(rename = "PublishedAt", alias = "UploadDate")]
    pub published_at: String,
    /// Platform category code, or `"Unknown"`.
    #[serde(rename = "Category")]
    pub category: String,
    /// ISO 8601 duration, e.g. `"PT4M13S"`.
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Views")]
    pub views: String,
    #[serde(rename = "Likes")]
    pub likes: String,
    #[serde(rename = "Comments")]
    pub comments: String,
}

/// A video row that passed the cleaner: unique id, non-empty title, parsed
/// upload date, and non-negative counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanedVideoRecord {
    pub video_id: String,
    pub title: String,
    pub upload_date: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub category: String,
    pub duration: String,
}
