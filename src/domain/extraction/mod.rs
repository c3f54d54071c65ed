//! Heuristic extraction of branch rows and the reference period from a
//! loosely structured, hand-built spreadsheet.

pub mod fields;
pub mod header;
pub mod period;
pub mod rows;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_HEADER_SCAN: usize = 25;
pub const MAX_PERIOD_ROWS: usize = 12;
pub const MAX_PERIOD_COLS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanLimits {
    pub header_rows: usize,
    pub period_rows: usize,
    pub period_cols: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            header_rows: MAX_HEADER_SCAN,
            period_rows: MAX_PERIOD_ROWS,
            period_cols: MAX_PERIOD_COLS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("workbook has no worksheet")]
    EmptyWorkbook,

    #[error("header row with the state registration column not found in the first {scanned_rows} rows")]
    HeaderNotFound { scanned_rows: usize },

    #[error("reference period not found in the first {rows} rows x {cols} columns")]
    PeriodNotFound { rows: usize, cols: usize },

    #[error("state registration column not found in the header map")]
    TaxIdColumnMissing,
}
