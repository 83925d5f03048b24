use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tubecast_core::CleanedVideoRecord;
use tubecast_pipeline::storage::read_cleaned_records;
use tubecast_pipeline::{load_model_if_present, TrainedModel};

/// Everything the handlers read. Loaded once at startup; never mutated.
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<Vec<CleanedVideoRecord>>,
    pub model: Option<Arc<TrainedModel>>,
}

impl AppState {
    pub fn new(videos: Vec<CleanedVideoRecord>, model: Option<TrainedModel>) -> Self {
        Self {
            videos: Arc::new(videos),
            model: model.map(Arc::new),
        }
    }
}

/// Loads the cleaned dataset and, if one has been trained, the model.
///
/// A missing model only disables prediction. A model file that exists but
/// cannot be read is an error, as is a missing dataset.
pub fn load_dashboard_state(cleaned_path: &Path, model_path: &Path) -> anyhow::Result<AppState> {
    let videos = read_cleaned_records(cleaned_path)
        .with_context(|| format!("failed to load cleaned data from {}", cleaned_path.display()))?;

    let model = load_model_if_present(model_path)
        .with_context(|| format!("failed to load model from {}", model_path.display()))?;
    if model.is_none() {
        tracing::warn!(
            path = %model_path.display(),
            "no trained model found; prediction disabled"
        );
    }

    tracing::info!(
        videos = videos.len(),
        model_loaded = model.is_some(),
        "dashboard state loaded"
    );
    Ok(AppState::new(videos, model))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use tubecast_pipeline::storage::write_cleaned_records;

    use super::*;

    fn one_video() -> Vec<CleanedVideoRecord> {
        vec![CleanedVideoRecord {
            video_id: "v1".to_string(),
            title: "First".to_string(),
            upload_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            views: 10,
            likes: 1,
            comments: 0,
            category: "22".to_string(),
            duration: "PT1M".to_string(),
        }]
    }

    #[test]
    fn missing_model_is_tolerated() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("clean.csv");
        write_cleaned_records(&csv, &one_video()).unwrap();

        let state = load_dashboard_state(&csv, &dir.path().join("none.json")).unwrap();
        assert_eq!(state.videos.len(), 1);
        assert!(state.model.is_none());
    }

    #[test]
    fn corrupt_model_is_fatal() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("clean.csv");
        let model = dir.path().join("model.json");
        write_cleaned_records(&csv, &one_video()).unwrap();
        std::fs::write(&model, "not a model").unwrap();

        assert!(load_dashboard_state(&csv, &model).is_err());
    }

    #[test]
    fn missing_dataset_is_fatal() {
        let dir = TempDir::new().unwrap();
        let result = load_dashboard_state(
            &dir.path().join("absent.csv"),
            &dir.path().join("model.json"),
        );
        assert!(result.is_err());
    }
}
