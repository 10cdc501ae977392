//! One tracker run: fetch → extract → ledger upsert → save.
//!
//! The ledger is only opened after the median has been extracted, so a
//! failed fetch or a bad snapshot never touches the file.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::info;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::ledger::{LedgerUpdate, XlsxLedger};
use crate::median::extract_median_date;
use crate::scrapers::MetaculusClient;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub snapshot_date: NaiveDate,
    pub median_event_date: NaiveDate,
    pub update: LedgerUpdate,
    pub ledger_path: PathBuf,
}

pub async fn run(
    config: &TrackerConfig,
    snapshot_date: NaiveDate,
) -> Result<RunSummary, TrackerError> {
    let client = MetaculusClient::new(config)?;
    let snapshot = client.fetch_question().await?;

    let median_event_date = extract_median_date(&snapshot)?;
    info!(
        question_id = config.question_id,
        %median_event_date,
        "median event date extracted"
    );

    let mut ledger = XlsxLedger::open_or_create(&config.ledger_path, &config.sheet_name)?;
    let update = ledger.upsert(snapshot_date, median_event_date)?;
    ledger.save()?;

    Ok(RunSummary {
        snapshot_date,
        median_event_date,
        update,
        ledger_path: config.ledger_path.clone(),
    })
}
