use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::sheet::{RawCell, Sheet};

pub fn read_csv_sheet(csv_path: &Path) -> Result<Sheet> {
    let delimiter = sniff_delimiter(csv_path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let cells = record
            .iter()
            .map(|value| {
                if value.trim().is_empty() {
                    RawCell::Empty
                } else {
                    RawCell::text(value)
                }
            })
            .collect();
        rows.push(cells);
    }

    let name = csv_path
        .file_stem()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("sheet")
        .to_string();
    Ok(Sheet::new(name, rows))
}

/// Brazilian spreadsheet exports use `;` since `,` is the decimal separator.
fn sniff_delimiter(csv_path: &Path) -> Result<u8> {
    let text = std::fs::read_to_string(csv_path)
        .with_context(|| format!("failed to read csv: {}", csv_path.display()))?;
    let first_line = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    Ok(if semicolons > 0 && semicolons >= commas {
        b';'
    } else {
        b','
    })
}
