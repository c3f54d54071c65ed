use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::domain::entities::record::{ExtractedRow, HeaderMap, Period, Record};
use crate::domain::entities::sheet::Sheet;
use crate::domain::extraction::fields::{amount_atc, amount_difal, amount_normal};
use crate::domain::extraction::header::{locate_header, map_columns};
use crate::domain::extraction::period::locate_period;
use crate::domain::extraction::rows::extract_rows;
use crate::domain::extraction::{ExtractionError, ScanLimits};
use crate::infra::import::csv::read_csv_sheet;
use crate::infra::import::xlsx::read_first_sheet;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub rows: Vec<ExtractedRow>,
    pub header_map: HeaderMap,
    pub period: Period,
}

pub struct ExtractionService {
    limits: ScanLimits,
}

impl ExtractionService {
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits }
    }

    pub fn load_sheet(&self, path: &Path) -> Result<Sheet> {
        if !path.exists() {
            return Err(ExtractionError::FileNotFound(path.to_path_buf()).into());
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            read_csv_sheet(path)
        } else {
            read_first_sheet(path)
        }
    }

    pub fn extract_sheet(&self, sheet: &Sheet) -> Result<Extraction, ExtractionError> {
        let header_row = locate_header(sheet, &self.limits)?;
        let header_map = map_columns(sheet, header_row);
        let rows = extract_rows(sheet, header_row, &header_map);
        let period = locate_period(sheet, &self.limits)?;
        info!(
            sheet = %sheet.name,
            header_row,
            columns = header_map.columns().len(),
            rows = rows.len(),
            %period,
            "sheet extracted"
        );
        Ok(Extraction {
            rows,
            header_map,
            period,
        })
    }

    pub fn extract_all(&self, path: &Path) -> Result<Extraction> {
        info!(path = %path.display(), "loading spreadsheet");
        let sheet = self.load_sheet(path)?;
        Ok(self.extract_sheet(&sheet)?)
    }
}

pub fn derive_records(
    rows: &[ExtractedRow],
    header_map: &HeaderMap,
    period: Period,
) -> Result<Vec<Record>, ExtractionError> {
    if header_map.tax_id_name().is_none() {
        return Err(ExtractionError::TaxIdColumnMissing);
    }
    let records: Vec<Record> = rows
        .iter()
        .map(|row| Record {
            tax_id: row.tax_id.clone(),
            amount_atc: amount_atc(row),
            amount_normal: amount_normal(row),
            amount_difal: amount_difal(row),
            period,
            source_row: row.clone(),
        })
        .collect();
    info!(records = records.len(), "records ready for filing");
    Ok(records)
}
