mod collect;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tubecast")]
#[command(about = "Collect, clean, and model YouTube channel statistics")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every upload of a channel into the raw CSV
    Collect {
        /// Channel to collect (overrides `TUBECAST_CHANNEL_ID`)
        #[arg(long)]
        channel: Option<String>,

        /// Raw CSV destination (overrides `TUBECAST_RAW_DATA_PATH`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Deduplicate and normalize the raw CSV into the cleaned CSV
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Train the view-count model on the cleaned CSV and report metrics
    Train(TrainArgs),
    /// Predict views for one video with a saved model
    Predict(PredictArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// Cleaned CSV to train on (overrides `TUBECAST_CLEANED_DATA_PATH`)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the model (overrides `TUBECAST_MODEL_PATH`)
    #[arg(long)]
    model_out: Option<PathBuf>,

    #[arg(long)]
    trees: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    test_ratio: Option<f64>,

    /// Report metrics without writing the model artifact
    #[arg(long)]
    no_save: bool,
}

#[derive(Debug, Args)]
struct PredictArgs {
    #[arg(long)]
    likes: u64,

    #[arg(long)]
    comments: u64,

    /// Day of month, 1-31
    #[arg(long)]
    day: u32,

    /// Month, 1-12
    #[arg(long)]
    month: u32,

    /// Hour of day (UTC), 0-23
    #[arg(long)]
    hour: u32,

    /// Monday = 0 through Sunday = 6
    #[arg(long)]
    day_of_week: u32,

    /// Model artifact to load (overrides `TUBECAST_MODEL_PATH`)
    #[arg(long)]
    model: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tubecast_core::load_app_config().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Collect { channel, out } => {
            collect::run_collect(&config, channel, out).await?;
        }
        Commands::Clean { input, output } => {
            pipeline::run_clean(&config, input, output)?;
        }
        Commands::Train(args) => pipeline::run_train(&config, args)?,
        Commands::Predict(args) => pipeline::run_predict(&config, &args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
