//! Feature engineering: temporal features from the upload date plus a
//! `ln(1 + views)` target.

use chrono::{DateTime, Datelike, Timelike, Utc};
use tubecast_core::CleanedVideoRecord;

pub const FEATURE_COUNT: usize = 6;

/// Column order of every feature row, at training and at inference.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Likes",
    "Comments",
    "UploadDay",
    "UploadMonth",
    "UploadHour",
    "UploadDayOfWeek",
];

pub type FeatureRow = [f64; FEATURE_COUNT];

/// Calendar features of an upload timestamp (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadFeatures {
    /// 1..=31
    pub day: u32,
    /// 1..=12
    pub month: u32,
    /// 0..=23
    pub hour: u32,
    /// Monday = 0 … Sunday = 6
    pub day_of_week: u32,
}

#[must_use]
pub fn upload_features(ts: DateTime<Utc>) -> UploadFeatures {
    UploadFeatures {
        day: ts.day(),
        month: ts.month(),
        hour: ts.hour(),
        day_of_week: ts.weekday().num_days_from_monday(),
    }
}

/// Assembles one row in [`FEATURE_NAMES`] order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn feature_row(likes: u64, comments: u64, upload: UploadFeatures) -> FeatureRow {
    [
        likes as f64,
        comments as f64,
        f64::from(upload.day),
        f64::from(upload.month),
        f64::from(upload.hour),
        f64::from(upload.day_of_week),
    ]
}

/// `ln(1 + views)`; defined at zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn log_views(views: u64) -> f64 {
    (views as f64).ln_1p()
}

/// Exact inverse of [`log_views`]: `exp(x) - 1`.
#[must_use]
pub fn views_from_log(log_views: f64) -> f64 {
    log_views.exp_m1()
}

/// Design matrix for training: rows, log targets, and the original-scale
/// views the metrics are computed against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    pub x: Vec<FeatureRow>,
    pub y: Vec<f64>,
    pub views: Vec<f64>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Copies the rows at `indices`, in that order.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> FeatureMatrix {
        FeatureMatrix {
            x: indices.iter().map(|&i| self.x[i]).collect(),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            views: indices.iter().map(|&i| self.views[i]).collect(),
        }
    }
}

/// Builds the training matrix from cleaned rows.
///
/// Counts are typed, so there is nothing left to drop here: rows with
/// missing Views, Likes, or Comments never survive
/// [`crate::storage::read_cleaned_records`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn prepare_features(records: &[CleanedVideoRecord]) -> FeatureMatrix {
    let mut matrix = FeatureMatrix {
        x: Vec::with_capacity(records.len()),
        y: Vec::with_capacity(records.len()),
        views: Vec::with_capacity(records.len()),
    };

    for record in records {
        let upload = upload_features(record.upload_date);
        matrix
            .x
            .push(feature_row(record.likes, record.comments, upload));
        matrix.y.push(log_views(record.views));
        matrix.views.push(record.views as f64);
    }

    tracing::debug!(rows = matrix.len(), "prepared feature matrix");
    matrix
}
