//! Split, fit, and evaluate a view-count model.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::features::{prepare_features, views_from_log, FeatureMatrix};
use crate::forest::{ForestParams, RandomForest};
use crate::model::TrainedModel;
use crate::storage::read_cleaned_records;

/// Minimum rows for a split with a non-empty train and test side.
const MIN_TRAINING_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Fraction of rows held out for evaluation, in `(0, 1)`.
    pub test_ratio: f64,
    /// Forest hyper-parameters. `forest.seed` also drives the split.
    pub forest: ForestParams,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            forest: ForestParams::default(),
        }
    }
}

/// Held-out evaluation, in original view units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub mse: f64,
    pub r2: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Seeded shuffle of `0..n` into `(train, test)` index sets.
///
/// The test side gets `ceil(n * test_ratio)` rows.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidSplitRatio`] unless `0 < test_ratio < 1`,
/// and [`PipelineError::InsufficientData`] if either side would be empty.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn train_test_split(
    n: usize,
    test_ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(PipelineError::InvalidSplitRatio(test_ratio));
    }

    let n_test = (n as f64 * test_ratio).ceil() as usize;
    if n < MIN_TRAINING_ROWS || n_test == 0 || n_test >= n {
        return Err(PipelineError::InsufficientData {
            rows: n,
            required: MIN_TRAINING_ROWS,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_idx = indices.split_off(n_test);
    Ok((train_idx, indices))
}

/// # Panics
///
/// Panics in debug builds if the slices differ in length.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    sse / actual.len() as f64
}

/// Coefficient of determination.
///
/// With zero variance in `actual` the ratio is undefined; this returns 1.0
/// for a perfect prediction and 0.0 otherwise.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    debug_assert_eq!(actual.len(), predicted.len());
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Splits `data`, fits a forest on the log targets of the train side, and
/// scores the test side after mapping predictions back to view counts.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidSplitRatio`],
/// [`PipelineError::InsufficientData`], or [`PipelineError::InvalidParams`].
pub fn train(
    data: &FeatureMatrix,
    config: &TrainConfig,
) -> Result<(TrainedModel, Metrics), PipelineError> {
    let (train_idx, test_idx) = train_test_split(data.len(), config.test_ratio, config.forest.seed)?;
    let train_set = data.select(&train_idx);
    let test_set = data.select(&test_idx);

    tracing::info!(
        train_rows = train_set.len(),
        test_rows = test_set.len(),
        trees = config.forest.n_trees,
        seed = config.forest.seed,
        "fitting random forest"
    );
    let forest = RandomForest::fit(&train_set.x, &train_set.y, &config.forest)?;

    let predicted: Vec<f64> = forest
        .predict(&test_set.x)
        .into_iter()
        .map(views_from_log)
        .collect();
    let metrics = Metrics {
        mse: mean_squared_error(&test_set.views, &predicted),
        r2: r2_score(&test_set.views, &predicted),
        train_rows: train_set.len(),
        test_rows: test_set.len(),
    };

    tracing::info!(mse = metrics.mse, r2 = metrics.r2, "model evaluated");
    Ok((TrainedModel::new(forest, config.forest.clone(), metrics), metrics))
}

/// Loads the cleaned CSV at `cleaned_path` and runs [`train`] on it.
///
/// # Errors
///
/// Returns [`PipelineError::InputMissing`] if the file does not exist, a CSV
/// or I/O error if it cannot be read, or any error from [`train`].
pub fn run_training(
    cleaned_path: &Path,
    config: &TrainConfig,
) -> Result<(TrainedModel, Metrics), PipelineError> {
    tracing::info!(input = %cleaned_path.display(), "loading cleaned data");
    let records = read_cleaned_records(cleaned_path)?;
    let data = prepare_features(&records);
    train(&data, config)
}

#[cfg(test)]
#[path = "train_test.rs"]
mod tests;
