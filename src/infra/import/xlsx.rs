use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::entities::sheet::{RawCell, Sheet};
use crate::domain::extraction::ExtractionError;

pub fn data_to_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::String(v) => RawCell::Text(v.clone()),
        Data::Float(v) => RawCell::Number(*v),
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Bool(v) => RawCell::Text(v.to_string()),
        Data::DateTime(v) => match v.as_datetime() {
            Some(dt) if !v.is_duration() => RawCell::Date(dt),
            _ => RawCell::Number(v.as_f64()),
        },
        Data::DateTimeIso(v) => parse_iso_datetime(v)
            .map(RawCell::Date)
            .unwrap_or_else(|| RawCell::Text(v.clone())),
        Data::DurationIso(v) => RawCell::Text(v.clone()),
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>().ok().or_else(|| {
        text.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Loads the first worksheet, keeping absolute row/column positions even
/// when the used range does not start at A1.
pub fn read_first_sheet(xlsx_path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(xlsx_path)
        .with_context(|| format!("failed to open workbook: {}", xlsx_path.display()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ExtractionError::EmptyWorkbook)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ExtractionError::EmptyWorkbook)?
        .with_context(|| format!("failed to read sheet: {sheet_name}"))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<RawCell>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![RawCell::Empty; start_col as usize];
        cells.extend(row.iter().map(data_to_cell));
        rows.push(cells);
    }

    tracing::debug!(
        sheet = %sheet_name,
        rows = rows.len(),
        "loaded worksheet"
    );
    Ok(Sheet::new(sheet_name, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_conversion_keeps_types() {
        assert_eq!(data_to_cell(&Data::Empty), RawCell::Empty);
        assert_eq!(data_to_cell(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(
            data_to_cell(&Data::String("I.E.".to_string())),
            RawCell::text("I.E.")
        );
        let expected = NaiveDate::from_ymd_opt(2026, 5, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        assert_eq!(
            data_to_cell(&Data::DateTimeIso("2026-05-01".to_string())),
            RawCell::Date(expected)
        );
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let path = std::env::temp_dir().join("dar-filer-does-not-exist.xlsx");

        assert!(read_first_sheet(&path).is_err());
    }
}
