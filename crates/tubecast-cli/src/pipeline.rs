//! `clean`, `train`, and `predict` command handlers.
//!
//! All three are synchronous: they only touch local files.

use std::path::PathBuf;

use anyhow::Context;
use tubecast_core::AppConfig;
use tubecast_pipeline::{
    clean_file, predict_from_artifact, run_training, save_model, ForestParams, PredictionInput,
    TrainConfig,
};

use crate::{PredictArgs, TrainArgs};

/// Reference video scored after every training run: 200 likes, 10
/// comments, uploaded 15 August at 16:00 on a Friday.
pub(crate) const SAMPLE_INPUT: PredictionInput = PredictionInput {
    likes: 200,
    comments: 10,
    upload_day: 15,
    upload_month: 8,
    upload_hour: 16,
    upload_day_of_week: 4,
};

/// # Errors
///
/// Returns an error if the raw CSV is missing or unreadable, or the cleaned
/// CSV cannot be written.
pub(crate) fn run_clean(
    config: &AppConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.raw_data_path.clone());
    let output = output.unwrap_or_else(|| config.cleaned_data_path.clone());

    let report = clean_file(&input, &output)
        .with_context(|| format!("failed to clean {}", input.display()))?;

    println!(
        "Kept {} of {} rows ({} duplicates, {} missing date or title).",
        report.records.len(),
        report.input_rows,
        report.duplicate_rows,
        report.invalid_rows
    );
    println!("Cleaned data saved to {}", output.display());
    Ok(())
}

/// Merges `train` flags over the configured model settings.
pub(crate) fn train_config(config: &AppConfig, args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        test_ratio: args.test_ratio.unwrap_or(config.model_test_ratio),
        forest: ForestParams {
            n_trees: args.trees.unwrap_or(config.model_trees),
            max_depth: config.model_max_depth,
            seed: args.seed.unwrap_or(config.model_seed),
            ..ForestParams::default()
        },
    }
}

/// # Errors
///
/// Returns an error if training fails or the model cannot be saved.
pub(crate) fn run_train(config: &AppConfig, args: TrainArgs) -> anyhow::Result<()> {
    let train_config = train_config(config, &args);
    let input = args.input.unwrap_or_else(|| config.cleaned_data_path.clone());
    let model_out = args.model_out.unwrap_or_else(|| config.model_path.clone());

    let (model, metrics) = run_training(&input, &train_config)
        .with_context(|| format!("training on {} failed", input.display()))?;

    println!("Model evaluation with RandomForest:");
    println!("Mean Squared Error: {}", metrics.mse);
    println!("R² Score: {}", metrics.r2);
    println!(
        "Trained on {} rows, evaluated on {}.",
        metrics.train_rows, metrics.test_rows
    );

    let predicted = model
        .predict(&SAMPLE_INPUT)
        .context("failed to score the sample input")?;
    println!("Predicted views for sample input: {predicted}");

    if args.no_save {
        tracing::info!("--no-save given, model not written");
        return Ok(());
    }
    save_model(&model, &model_out)
        .with_context(|| format!("failed to save model to {}", model_out.display()))?;
    println!("Model saved to {}", model_out.display());
    Ok(())
}

/// # Errors
///
/// Returns an error if the model cannot be loaded or rejects the input.
pub(crate) fn run_predict(config: &AppConfig, args: &PredictArgs) -> anyhow::Result<()> {
    let model_path = args.model.clone().unwrap_or_else(|| config.model_path.clone());
    let input = PredictionInput {
        likes: args.likes,
        comments: args.comments,
        upload_day: args.day,
        upload_month: args.month,
        upload_hour: args.hour,
        upload_day_of_week: args.day_of_week,
    };

    let predicted = predict_from_artifact(&model_path, &input)
        .with_context(|| format!("prediction with {} failed", model_path.display()))?;
    println!("Predicted views: {predicted}");
    Ok(())
}
