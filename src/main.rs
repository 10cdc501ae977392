//! Metaculus Median Tracker
//!
//! Samples the community forecast of one Metaculus date question and logs
//! its median event date into an `.xlsx` time series, one row per day.
//! Meant to be run periodically by an external scheduler, one instance at
//! a time.
//!
//! Usage:
//!   metaculus-median [--config tracker.toml] [--ledger-path data/out.xlsx]
//!
//! Environment:
//!   TRACKER_CONFIG_PATH - Optional TOML config file
//!   METACULUS_QUESTION_ID - Question to sample (default: 3684)
//!   METACULUS_API_BASE - API host (default: https://www.metaculus.com)
//!   LEDGER_PATH - Workbook path (default: data/metaculus_shor_rsa_median.xlsx)
//!   LEDGER_SHEET_NAME - Sheet name for a new workbook
//!   HTTP_TIMEOUT_SECS - Request timeout (default: 30)

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metaculus_median::{pipeline, TrackerConfig};

#[derive(Parser, Debug)]
#[command(name = "metaculus-median")]
#[command(about = "Append today's Metaculus median event date to a spreadsheet ledger")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "TRACKER_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Metaculus question id
    #[arg(long)]
    question_id: Option<u64>,

    /// Forecasting API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// Workbook to append to
    #[arg(long)]
    ledger_path: Option<PathBuf>,

    /// Sheet name used when the workbook is created
    #[arg(long)]
    sheet_name: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<TrackerConfig> {
        let mut config = match &self.config {
            Some(path) => TrackerConfig::from_toml_file(path)?,
            None => TrackerConfig::default(),
        };
        config.apply_env()?;

        if let Some(id) = self.question_id {
            config.question_id = id;
        }
        if let Some(base) = self.api_base {
            config.api_base = base;
        }
        if let Some(path) = self.ledger_path {
            config.ledger_path = path;
        }
        if let Some(name) = self.sheet_name {
            config.sheet_name = name;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let args = Args::parse();
    let config = args.into_config().context("Failed to load configuration")?;

    // read once, before the fetch, so a run straddling midnight keys on its start day
    let snapshot_date = Local::now().date_naive();

    info!(
        question_id = config.question_id,
        url = %config.question_url(),
        ledger = %config.ledger_path.display(),
        %snapshot_date,
        "📡 Sampling Metaculus community forecast"
    );

    let summary = pipeline::run(&config, snapshot_date)
        .await
        .with_context(|| format!("Tracker run for question {} failed", config.question_id))?;

    info!(
        snapshot_date = %summary.snapshot_date,
        median_event_date = %summary.median_event_date,
        update = summary.update.as_str(),
        ledger = %summary.ledger_path.display(),
        "💾 Ledger updated"
    );

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metaculus_median=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_env() {
    // Standard dotenv search (cwd + parents); a missing .env is fine
    let _ = dotenv();
}
