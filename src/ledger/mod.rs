//! Median ledger
//!
//! The ledger is a two-column time series keyed by snapshot date. At most
//! one row exists per calendar day: a second run on the same day overwrites
//! the median of the last row instead of appending.

pub mod xlsx;

pub use xlsx::XlsxLedger;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

pub const HEADER: [&str; 2] = ["snapshot_date", "median_event_date"];

/// `NaiveDate::num_days_from_ce()` of 1899-12-30, day zero of spreadsheet serials
const SERIAL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// What a run did to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// Last row already belonged to today; its median was replaced
    OverwroteLast,
    /// A new row was added after all existing rows
    Appended,
}

impl LedgerUpdate {
    pub fn as_str(&self) -> &str {
        match self {
            LedgerUpdate::OverwroteLast => "overwrote_last",
            LedgerUpdate::Appended => "appended",
        }
    }
}

/// Same-day overwrite, otherwise append
pub fn plan_update(last_snapshot: Option<NaiveDate>, today: NaiveDate) -> LedgerUpdate {
    match last_snapshot {
        Some(last) if last == today => LedgerUpdate::OverwroteLast,
        _ => LedgerUpdate::Appended,
    }
}

/// Date as a spreadsheet serial day number
pub fn to_serial(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce() - SERIAL_EPOCH_DAYS_FROM_CE)
}

/// Serial day number (fraction = time of day) back to a date
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial > f64::from(i32::MAX / 2) {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(serial.floor() as i32 + SERIAL_EPOCH_DAYS_FROM_CE)
}

/// Read a stored cell value as a calendar date.
///
/// Accepts serials, ISO dates and ISO date-times; date-times are cut down
/// to their date.
pub fn parse_cell_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(serial) = raw.parse::<f64>() {
        return from_serial(serial);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_update() {
        let today = ymd(2026, 10, 19);
        assert_eq!(plan_update(None, today), LedgerUpdate::Appended);
        assert_eq!(
            plan_update(Some(ymd(2026, 10, 18)), today),
            LedgerUpdate::Appended
        );
        assert_eq!(plan_update(Some(today), today), LedgerUpdate::OverwroteLast);
    }

    #[test]
    fn test_serial_anchors() {
        assert_eq!(to_serial(ymd(1899, 12, 30)), 0.0);
        assert_eq!(to_serial(ymd(1970, 1, 1)), 25569.0);
        assert_eq!(to_serial(ymd(2024, 1, 1)), 45292.0);
        assert_eq!(from_serial(45292.0), Some(ymd(2024, 1, 1)));
    }

    #[test]
    fn test_fractional_serial_truncates_to_date() {
        // 2024-01-01 18:00
        assert_eq!(from_serial(45292.75), Some(ymd(2024, 1, 1)));
        assert_eq!(from_serial(-1.0), None);
        assert_eq!(from_serial(f64::NAN), None);
    }

    #[test]
    fn test_parse_cell_date_forms() {
        let d = ymd(2026, 10, 19);
        assert_eq!(parse_cell_date(&to_serial(d).to_string()), Some(d));
        assert_eq!(parse_cell_date("2026-10-19"), Some(d));
        assert_eq!(parse_cell_date("2026-10-19 13:45:00"), Some(d));
        assert_eq!(parse_cell_date("2026-10-19T13:45:00.5"), Some(d));
        assert_eq!(parse_cell_date("2026-10-19T13:45:00+02:00"), Some(d));
        assert_eq!(parse_cell_date(""), None);
        assert_eq!(parse_cell_date("snapshot_date"), None);
    }
}
