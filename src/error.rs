//! Error taxonomy for a single tracker run.
//!
//! Nothing here is recovered from: every variant propagates to the process
//! boundary and ends the run with a non-zero exit.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level failure of a run
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { status: StatusCode, url: String },

    #[error("response body is not valid JSON")]
    JsonParse(#[source] serde_json::Error),

    #[error("question snapshot schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// The snapshot JSON does not have the shape the median extractor needs
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("continuous_range and forecast_values length mismatch ({range_len} vs {cdf_len})")]
    LengthMismatch { range_len: usize, cdf_len: usize },

    #[error("forecast distribution is empty")]
    EmptyDistribution,

    #[error("unparseable timestamp in continuous_range: {value:?}")]
    InvalidTimestamp { value: String },
}

/// Reading or writing the ledger workbook failed
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger workbook {} could not be processed: {detail}", path.display())]
    Spreadsheet { path: PathBuf, detail: String },
}

impl TrackerError {
    /// Classify a transport error from reqwest
    pub(crate) fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                source,
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}
