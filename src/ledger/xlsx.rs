//! `.xlsx` ledger storage
//!
//! The workbook is loaded whole, mutated in memory and written back whole.
//! There is no locking; callers must not run two writers on one file.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{NumberingFormat, Spreadsheet, Worksheet};

use super::{parse_cell_date, plan_update, to_serial, LedgerUpdate, HEADER};
use crate::error::LedgerError;
use crate::models::LedgerRow;

const SNAPSHOT_COL: u32 = 1;
const MEDIAN_COL: u32 = 2;
const FIRST_DATA_ROW: u32 = 2;

pub struct XlsxLedger {
    path: PathBuf,
    book: Spreadsheet,
    sheet_index: usize,
    created: bool,
}

impl XlsxLedger {
    /// Load the workbook at `path`, or start a new one with a header row.
    ///
    /// An existing workbook is read from the sheet called `sheet_name` when
    /// it has one, otherwise from its first sheet.
    pub fn open_or_create(path: impl AsRef<Path>, sheet_name: &str) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();

        if path.exists() {
            let book = umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| {
                LedgerError::Spreadsheet {
                    path: path.clone(),
                    detail: e.to_string(),
                }
            })?;
            let sheet_index = book
                .get_sheet_collection()
                .iter()
                .position(|s| s.get_name() == sheet_name)
                .unwrap_or(0);

            let ledger = Self {
                path,
                book,
                sheet_index,
                created: false,
            };
            let sheet = ledger.sheet()?;
            debug!(
                path = %ledger.path.display(),
                sheet = sheet.get_name(),
                highest_row = sheet.get_highest_row(),
                "ledger loaded"
            );
            return Ok(ledger);
        }

        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book
            .new_sheet(sheet_name)
            .map_err(|e| LedgerError::Spreadsheet {
                path: path.clone(),
                detail: format!("cannot create sheet {sheet_name:?}: {e}"),
            })?;
        for (col, title) in (1u32..).zip(HEADER) {
            sheet.get_cell_mut((col, 1)).set_value_string(title);
        }

        info!(path = %path.display(), sheet = sheet_name, "new ledger created");

        Ok(Self {
            path,
            book,
            sheet_index: 0,
            created: true,
        })
    }

    /// True when this workbook did not exist on disk before this run
    pub fn is_new(&self) -> bool {
        self.created
    }

    pub fn sheet_name(&self) -> Result<String, LedgerError> {
        Ok(self.sheet()?.get_name().to_string())
    }

    /// Snapshot date stored in the last data row, if there is one and it reads as a date
    pub fn last_snapshot_date(&self) -> Result<Option<NaiveDate>, LedgerError> {
        let sheet = self.sheet()?;
        let last_row = sheet.get_highest_row();
        if last_row < FIRST_DATA_ROW {
            return Ok(None);
        }
        Ok(read_date(sheet, SNAPSHOT_COL, last_row))
    }

    /// All data rows whose two cells read as dates, in sheet order
    pub fn rows(&self) -> Result<Vec<LedgerRow>, LedgerError> {
        let sheet = self.sheet()?;
        let rows = (FIRST_DATA_ROW..=sheet.get_highest_row())
            .filter_map(|row| {
                Some(LedgerRow {
                    snapshot_date: read_date(sheet, SNAPSHOT_COL, row)?,
                    median_event_date: read_date(sheet, MEDIAN_COL, row)?,
                })
            })
            .collect();
        Ok(rows)
    }

    /// Record today's median. Overwrites the last row when it is already
    /// today's, appends otherwise.
    pub fn upsert(
        &mut self,
        snapshot_date: NaiveDate,
        median_date: NaiveDate,
    ) -> Result<LedgerUpdate, LedgerError> {
        let update = plan_update(self.last_snapshot_date()?, snapshot_date);
        let sheet = self.sheet_mut()?;

        match update {
            LedgerUpdate::OverwroteLast => {
                let row = sheet.get_highest_row();
                write_date(sheet, MEDIAN_COL, row, median_date);
                debug!(row, %snapshot_date, %median_date, "overwrote today's row");
            }
            LedgerUpdate::Appended => {
                let row = sheet.get_highest_row() + 1;
                write_date(sheet, SNAPSHOT_COL, row, snapshot_date);
                write_date(sheet, MEDIAN_COL, row, median_date);
                debug!(row, %snapshot_date, %median_date, "appended row");
            }
        }

        Ok(update)
    }

    /// Write the whole workbook to its path, creating parent directories
    pub fn save(&self) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LedgerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path).map_err(|e| {
            LedgerError::Spreadsheet {
                path: self.path.clone(),
                detail: e.to_string(),
            }
        })?;

        debug!(path = %self.path.display(), "ledger saved");
        Ok(())
    }

    fn sheet(&self) -> Result<&Worksheet, LedgerError> {
        self.book
            .get_sheet(&self.sheet_index)
            .ok_or_else(|| self.no_sheet_error())
    }

    fn sheet_mut(&mut self) -> Result<&mut Worksheet, LedgerError> {
        let err = self.no_sheet_error();
        self.book.get_sheet_mut(&self.sheet_index).ok_or(err)
    }

    fn no_sheet_error(&self) -> LedgerError {
        LedgerError::Spreadsheet {
            path: self.path.clone(),
            detail: "workbook has no worksheet".into(),
        }
    }
}

fn read_date(sheet: &Worksheet, col: u32, row: u32) -> Option<NaiveDate> {
    let cell = sheet.get_cell((col, row))?;
    parse_cell_date(&cell.get_value())
}

fn write_date(sheet: &mut Worksheet, col: u32, row: u32, date: NaiveDate) {
    let cell = sheet.get_cell_mut((col, row));
    cell.set_value_number(to_serial(date));
    cell.get_style_mut()
        .get_number_format_mut()
        .set_format_code(NumberingFormat::FORMAT_DATE_YYYYMMDD);
}
