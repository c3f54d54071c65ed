use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::entities::record::HeaderMap;
use crate::domain::entities::sheet::{RawCell, Sheet};
use crate::domain::extraction::{ExtractionError, ScanLimits};

const TAX_ID_SYNONYMS: &[&str] = &[
    "INSC.ESTADUAL",
    "INSC. ESTADUAL",
    "i.e.",
    "ie",
    "i..e.",
    "inscrição estadual",
    "inscricao estadual",
];

pub fn normalize_header(text: &str) -> String {
    let stripped: String = text
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && *c != '.')
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn is_tax_id_header(text: &str) -> bool {
    let normalized = normalize_header(text);
    if normalized.is_empty() {
        return false;
    }
    TAX_ID_SYNONYMS
        .iter()
        .any(|synonym| normalize_header(synonym) == normalized)
}

fn cell_is_tax_id_header(cell: &RawCell) -> bool {
    match cell {
        RawCell::Text(v) => is_tax_id_header(v),
        _ => false,
    }
}

pub fn locate_header(sheet: &Sheet, limits: &ScanLimits) -> Result<usize, ExtractionError> {
    (0..limits.header_rows.min(sheet.row_count()))
        .find(|&idx| {
            sheet
                .row(idx)
                .is_some_and(|row| row.iter().any(cell_is_tax_id_header))
        })
        .ok_or(ExtractionError::HeaderNotFound {
            scanned_rows: limits.header_rows,
        })
}

/// Builds the header map for `header_row`. Blank headers become `col_<index>`;
/// repeated names get `_<index>` appended until unique.
pub fn map_columns(sheet: &Sheet, header_row: usize) -> HeaderMap {
    let mut map = HeaderMap::default();
    let cells = sheet.row(header_row).unwrap_or(&[]);
    for (idx, cell) in cells.iter().enumerate() {
        let mut name = if cell.is_blank() {
            format!("col_{idx}")
        } else {
            cell.to_string().trim().to_string()
        };
        while map.contains(&name) {
            name = format!("{name}_{idx}");
        }
        map.push(name, idx);
        if cell_is_tax_id_header(cell) {
            map.set_tax_id_column(idx);
        }
    }
    map
}
