//! `YouTube` Data API v3 collector: resolves a channel's uploads playlist,
//! pages through its video ids, and fetches per-video statistics as raw
//! [`tubecast_core::VideoRecord`]s.

pub mod client;
pub mod error;
pub mod types;

pub use client::{CollectorConfig, YoutubeClient};
pub use error::CollectorError;
