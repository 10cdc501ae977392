//! Tracker configuration
//!
//! Defaults describe the one question this tool was built for. Each layer
//! (TOML file, environment, CLI flags) only overrides what it sets.

use crate::error::TrackerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_QUESTION_ID: u64 = 3684;
pub const DEFAULT_API_BASE: &str = "https://www.metaculus.com";
pub const DEFAULT_LEDGER_PATH: &str = "data/metaculus_shor_rsa_median.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "metaculus_shor_rsa_median";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for one tracker run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Metaculus question id
    pub question_id: u64,

    /// Scheme + host of the forecasting API
    pub api_base: String,

    /// Workbook the time series is appended to
    pub ledger_path: PathBuf,

    /// Sheet name used when the workbook is created
    pub sheet_name: String,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: u64,

    pub user_agent: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            question_id: DEFAULT_QUESTION_ID,
            api_base: DEFAULT_API_BASE.to_string(),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("metaculus-median/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TrackerConfig {
    /// Load from TOML file. Keys absent from the file keep their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overlay process environment variables. Call [`Self::validate`] once
    /// every layer has been applied.
    pub fn apply_env(&mut self) -> Result<(), TrackerError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup (blank values are ignored)
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), TrackerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get("METACULUS_QUESTION_ID") {
            self.question_id = parse_number("METACULUS_QUESTION_ID", &raw)?;
        }
        if let Some(base) = get("METACULUS_API_BASE") {
            self.api_base = base.trim().to_string();
        }
        if let Some(path) = get("LEDGER_PATH") {
            self.ledger_path = PathBuf::from(path.trim());
        }
        if let Some(name) = get("LEDGER_SHEET_NAME") {
            self.sheet_name = name.trim().to_string();
        }
        if let Some(raw) = get("HTTP_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("HTTP_TIMEOUT_SECS", &raw)?;
        }

        Ok(())
    }

    /// Reject settings that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.request_timeout_secs == 0 {
            return Err(TrackerError::Config(
                "request timeout must be at least one second".into(),
            ));
        }
        if self.api_base.trim().is_empty() {
            return Err(TrackerError::Config("api_base is empty".into()));
        }
        if self.sheet_name.trim().is_empty() {
            return Err(TrackerError::Config("sheet_name is empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `{api_base}/api2/questions/{id}/`
    pub fn question_url(&self) -> String {
        format!(
            "{}/api2/questions/{}/",
            self.api_base.trim_end_matches('/'),
            self.question_id
        )
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64, TrackerError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| TrackerError::Config(format!("{key}={raw:?} is not a non-negative integer")))
}
