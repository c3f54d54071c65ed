use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::entities::record::{ExtractedRow, HeaderMap};
use crate::domain::entities::sheet::{RawCell, Sheet};

pub const TAX_ID_DIGITS: usize = 9;

/// Any of these in a row's text marks the end of the data region. Matched
/// after lower-casing and stripping diacritics.
const FOOTER_KEYWORDS: &[&str] = &[
    "total",
    "apresentacao ao fisco",
    "sumario",
    "fim",
    "piavai",
    "piaui",
];

/// Digits of `cell`, left-padded with zeros to [`TAX_ID_DIGITS`]. Blank or
/// digit-free values give an empty string.
pub fn normalize_tax_id(cell: Option<&RawCell>) -> String {
    let Some(cell) = cell else {
        return String::new();
    };
    let digits: String = cell
        .to_string()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return digits;
    }
    format!("{digits:0>width$}", width = TAX_ID_DIGITS)
}

pub fn is_footer_row(cells: &[RawCell]) -> bool {
    let joined = cells
        .iter()
        .map(RawCell::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let text: String = joined
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    if text.is_empty() {
        return true;
    }
    FOOTER_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

pub fn extract_rows(sheet: &Sheet, header_row: usize, header_map: &HeaderMap) -> Vec<ExtractedRow> {
    let tax_id_col = header_map.tax_id_column();
    let mut rows = Vec::new();
    let mut idx = header_row + 1;
    while let Some(cells) = sheet.row(idx) {
        if is_footer_row(cells) {
            break;
        }
        let fields = header_map
            .columns()
            .iter()
            .map(|column| {
                let value = cells.get(column.index).cloned().unwrap_or(RawCell::Empty);
                (column.name.clone(), value)
            })
            .collect();
        let tax_id = normalize_tax_id(tax_id_col.and_then(|col| cells.get(col)));
        rows.push(ExtractedRow { fields, tax_id });
        idx += 1;
    }
    rows
}
