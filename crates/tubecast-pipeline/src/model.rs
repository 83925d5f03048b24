//! The persisted model artifact and single-row inference.
//!
//! A model is one JSON document: a format version, the feature order it was
//! trained with, its hyper-parameters and held-out metrics, and the forest.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelLoadError, PipelineError, PredictError};
use crate::features::{
    feature_row, upload_features, views_from_log, UploadFeatures, FEATURE_COUNT, FEATURE_NAMES,
};
use crate::forest::{ForestParams, RandomForest};
use crate::storage::write_atomically;
use crate::train::Metrics;

/// Bumped whenever the artifact layout changes incompatibly.
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub params: ForestParams,
    pub metrics: Metrics,
    pub trained_at: DateTime<Utc>,
    pub forest: RandomForest,
}

impl TrainedModel {
    #[must_use]
    pub fn new(forest: RandomForest, params: ForestParams, metrics: Metrics) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            params,
            metrics,
            trained_at: Utc::now(),
            forest,
        }
    }

    /// Predicted view count for `input`, floored and never negative.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError::FeatureOutOfRange`] for an impossible calendar
    /// value, or [`PredictError::NonFinite`] if the forest output overflows.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn predict(&self, input: &PredictionInput) -> Result<u64, PredictError> {
        input.validate()?;
        let row = feature_row(input.likes, input.comments, input.upload_features());
        let views = views_from_log(self.forest.predict_row(&row));
        if !views.is_finite() {
            return Err(PredictError::NonFinite);
        }
        Ok(views.max(0.0).floor() as u64)
    }
}

/// One video to score. Field names match the JSON body of the predict
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub likes: u64,
    pub comments: u64,
    pub upload_day: u32,
    pub upload_month: u32,
    pub upload_hour: u32,
    /// Monday = 0
    pub upload_day_of_week: u32,
}

impl PredictionInput {
    /// Derives the calendar fields from an upload timestamp.
    #[must_use]
    pub fn from_timestamp(likes: u64, comments: u64, uploaded: DateTime<Utc>) -> Self {
        let f = upload_features(uploaded);
        Self {
            likes,
            comments,
            upload_day: f.day,
            upload_month: f.month,
            upload_hour: f.hour,
            upload_day_of_week: f.day_of_week,
        }
    }

    /// # Errors
    ///
    /// Returns [`PredictError::FeatureOutOfRange`] naming the first field
    /// outside its calendar range.
    pub fn validate(&self) -> Result<(), PredictError> {
        let checks = [
            ("UploadDay", self.upload_day, 1..=31),
            ("UploadMonth", self.upload_month, 1..=12),
            ("UploadHour", self.upload_hour, 0..=23),
            ("UploadDayOfWeek", self.upload_day_of_week, 0..=6),
        ];
        for (feature, value, range) in checks {
            if !range.contains(&value) {
                return Err(PredictError::FeatureOutOfRange {
                    feature,
                    value: u64::from(value),
                });
            }
        }
        Ok(())
    }

    fn upload_features(&self) -> UploadFeatures {
        UploadFeatures {
            day: self.upload_day,
            month: self.upload_month,
            hour: self.upload_hour,
            day_of_week: self.upload_day_of_week,
        }
    }
}

/// # Errors
///
/// See [`TrainedModel::predict`].
pub fn predict(model: &TrainedModel, input: &PredictionInput) -> Result<u64, PredictError> {
    model.predict(input)
}

/// Loads the model at `path` and scores `input` against it.
///
/// # Errors
///
/// Returns [`ModelError::Load`] if the artifact cannot be used, or
/// [`ModelError::Predict`] if the input is rejected.
pub fn predict_from_artifact(path: &Path, input: &PredictionInput) -> Result<u64, ModelError> {
    let model = load_model(path)?;
    Ok(model.predict(input)?)
}

/// Writes `model` as JSON to `path`, replacing any previous artifact
/// atomically.
///
/// # Errors
///
/// Returns [`PipelineError::Serialize`] or [`PipelineError::Io`].
pub fn save_model(model: &TrainedModel, path: &Path) -> Result<(), PipelineError> {
    let bytes = serde_json::to_vec(model).map_err(PipelineError::Serialize)?;
    write_atomically(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "model saved");
    Ok(())
}

/// Version field read on its own, so a newer artifact reports
/// `UnsupportedFormat` rather than a parse error.
#[derive(Deserialize)]
struct FormatProbe {
    format_version: u32,
}

/// # Errors
///
/// Returns [`ModelLoadError::NotFound`] if nothing exists at `path`,
/// [`ModelLoadError::Corrupt`] if the JSON is unreadable or the forest is
/// inconsistent, and [`ModelLoadError::UnsupportedFormat`] for another
/// format version.
pub fn load_model(path: &Path) -> Result<TrainedModel, ModelLoadError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ModelLoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ModelLoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let corrupt = |source| ModelLoadError::Corrupt {
        path: path.to_path_buf(),
        source,
    };

    let probe: FormatProbe = serde_json::from_slice(&bytes).map_err(corrupt)?;
    if probe.format_version != MODEL_FORMAT_VERSION {
        return Err(ModelLoadError::UnsupportedFormat {
            found: probe.format_version,
            expected: MODEL_FORMAT_VERSION,
        });
    }

    let model: TrainedModel = serde_json::from_slice(&bytes).map_err(corrupt)?;
    if model.forest.n_features() != FEATURE_COUNT || !model.forest.is_well_formed() {
        return Err(corrupt(<serde_json::Error as serde::de::Error>::custom(
            "forest does not match the feature layout",
        )));
    }

    tracing::debug!(
        path = %path.display(),
        trees = model.forest.trees().len(),
        trained_at = %model.trained_at,
        "model loaded"
    );
    Ok(model)
}

/// Like [`load_model`], but an absent artifact is `Ok(None)`.
///
/// # Errors
///
/// Every [`ModelLoadError`] except `NotFound`.
pub fn load_model_if_present(path: &Path) -> Result<Option<TrainedModel>, ModelLoadError> {
    match load_model(path) {
        Ok(model) => Ok(Some(model)),
        Err(ModelLoadError::NotFound { .. }) => Ok(None),
        Err(err) => Err(err),
    }
}
