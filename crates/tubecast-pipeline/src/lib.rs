//! Cleaning, feature engineering, training, and scoring for channel video
//! statistics.
//!
//! Data moves one way: raw CSV → [`clean`] → cleaned CSV →
//! [`features`] → [`train`] → [`model::TrainedModel`] artifact. The
//! [`insights`] module holds the read-only aggregations the dashboard serves.

pub mod clean;
pub mod error;
pub mod features;
pub mod forest;
pub mod insights;
pub mod model;
pub mod storage;
pub mod train;

pub use clean::{clean, clean_cleaned, clean_file, CleanReport};
pub use error::{ModelError, ModelLoadError, PipelineError, PredictError};
pub use features::{prepare_features, upload_features, FeatureMatrix, UploadFeatures};
pub use forest::{ForestParams, RandomForest};
pub use model::{
    load_model, load_model_if_present, predict, predict_from_artifact, save_model,
    PredictionInput, TrainedModel,
};
pub use train::{run_training, train, train_test_split, Metrics, TrainConfig};
