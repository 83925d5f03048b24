use std::path::PathBuf;

use thiserror::Error;

/// Structural failures of a cleaning or training run. Malformed cells never
/// show up here; they are coerced or their rows dropped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file not found: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("not enough rows to train: {rows} usable, need at least {required}")]
    InsufficientData { rows: usize, required: usize },

    #[error("test split ratio must be strictly between 0 and 1, got {0}")]
    InvalidSplitRatio(f64),

    #[error("invalid model parameters: {0}")]
    InvalidParams(String),

    #[error("failed to serialize model: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Failures reading a serialized model. `NotFound` is an expected state for
/// callers that can run without a model; the rest mean the artifact is bad.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact format version {found} is not supported (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },
}

/// Failures scoring a single input against a loaded model.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("{feature} out of range: {value}")]
    FeatureOutOfRange { feature: &'static str, value: u64 },

    #[error("model produced a non-finite prediction")]
    NonFinite,
}

/// Either half of load-then-predict, kept apart so callers can tell a bad
/// artifact from a bad input.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load model: {0}")]
    Load(#[from] ModelLoadError),

    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),
}
