//! Read-only aggregations over cleaned rows, shaped for charting.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tubecast_core::CleanedVideoRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewsPoint {
    pub upload_date: DateTime<Utc>,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoViews {
    pub video_id: String,
    pub title: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryViews {
    pub category: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    /// `None` only when there are no rows.
    pub top_category: Option<String>,
    pub video_count: usize,
    pub total_views: u64,
}

/// One point per video, oldest first. Equal dates keep input order.
#[must_use]
pub fn views_over_time(records: &[CleanedVideoRecord]) -> Vec<ViewsPoint> {
    let mut points: Vec<ViewsPoint> = records
        .iter()
        .map(|r| ViewsPoint {
            upload_date: r.upload_date,
            views: r.views,
        })
        .collect();
    points.sort_by_key(|p| p.upload_date);
    points
}

/// The `limit` most viewed videos. Equal view counts keep input order.
#[must_use]
pub fn top_videos(records: &[CleanedVideoRecord], limit: usize) -> Vec<VideoViews> {
    let mut ranked: Vec<&CleanedVideoRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.views.cmp(&a.views));
    ranked
        .into_iter()
        .take(limit)
        .map(|r| VideoViews {
            video_id: r.video_id.clone(),
            title: r.title.clone(),
            views: r.views,
        })
        .collect()
}

/// Views summed per category, most viewed first, ties broken by name.
#[must_use]
pub fn category_views(records: &[CleanedVideoRecord]) -> Vec<CategoryViews> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in records {
        let total = totals.entry(r.category.as_str()).or_default();
        *total = total.saturating_add(r.views);
    }

    let mut out: Vec<CategoryViews> = totals
        .into_iter()
        .map(|(category, views)| CategoryViews {
            category: category.to_string(),
            views,
        })
        .collect();
    // BTreeMap order is by name, so a stable sort on views keeps name order for ties.
    out.sort_by(|a, b| b.views.cmp(&a.views));
    out
}

/// Category with the most total views.
#[must_use]
pub fn top_category(records: &[CleanedVideoRecord]) -> Option<String> {
    category_views(records)
        .into_iter()
        .next()
        .map(|c| c.category)
}

#[must_use]
pub fn summarize(records: &[CleanedVideoRecord]) -> ChannelSummary {
    ChannelSummary {
        top_category: top_category(records),
        video_count: records.len(),
        total_views: records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.views)),
    }
}
