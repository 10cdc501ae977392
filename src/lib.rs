//! Metaculus Median Tracker Library
//!
//! Samples the community forecast of a single Metaculus date question,
//! derives the median event date and logs it into an `.xlsx` time series.
//! The binary in main.rs is a thin wrapper around [`pipeline::run`].

pub mod config;
pub mod error;
pub mod ledger;
pub mod median;
pub mod models;
pub mod pipeline;
pub mod scrapers;

pub use config::TrackerConfig;
pub use error::{LedgerError, SchemaError, TrackerError};
pub use ledger::{LedgerUpdate, XlsxLedger};
pub use models::LedgerRow;
pub use pipeline::{run, RunSummary};
