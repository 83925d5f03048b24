//! `collect` command handler.

use std::path::PathBuf;

use anyhow::Context;
use tubecast_collector::{CollectorConfig, YoutubeClient};
use tubecast_core::AppConfig;
use tubecast_pipeline::storage::write_raw_records;

/// Builds the collector settings from config, with `--channel` taking
/// precedence over `TUBECAST_CHANNEL_ID`.
///
/// # Errors
///
/// Returns an error if no API key or no channel id is available.
pub(crate) fn collector_config(
    config: &AppConfig,
    channel: Option<String>,
) -> anyhow::Result<CollectorConfig> {
    let api_key = config.require_api_key()?.to_string();
    let channel_id = channel
        .or_else(|| config.channel_id.clone())
        .context("no channel given: pass --channel or set TUBECAST_CHANNEL_ID")?;

    Ok(CollectorConfig {
        api_key,
        channel_id,
        page_size: config.collector_page_size,
        request_timeout_secs: config.collector_request_timeout_secs,
        user_agent: config.collector_user_agent.clone(),
    })
}

/// Fetches every upload of the channel and writes them to the raw CSV,
/// replacing whatever was there.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, any API call fails, or
/// the CSV cannot be written. Nothing is written on an API failure.
pub(crate) async fn run_collect(
    config: &AppConfig,
    channel: Option<String>,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let collector = collector_config(config, channel)?;
    let out = out.unwrap_or_else(|| config.raw_data_path.clone());

    let client = YoutubeClient::new(collector).context("failed to build YouTube client")?;
    let records = client
        .collect()
        .await
        .with_context(|| format!("failed to collect videos for channel {}", client.channel_id()))?;

    write_raw_records(&out, &records)
        .with_context(|| format!("failed to write raw data to {}", out.display()))?;

    tracing::info!(
        channel_id = client.channel_id(),
        videos = records.len(),
        path = %out.display(),
        "collection complete"
    );
    println!("Found {} videos.", records.len());
    println!("Data saved to {}", out.display());
    Ok(())
}
