use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::domain::entities::record::Period;
use crate::domain::entities::sheet::{RawCell, Sheet};
use crate::domain::extraction::{ExtractionError, ScanLimits};

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").expect("valid regex"));
static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{2,4})$").expect("valid regex"));
static YEAR_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{2,4}").expect("valid regex"));

const MONTH_ABBREVIATIONS: [(&str, u32); 12] = [
    ("jan", 1),
    ("fev", 2),
    ("mar", 3),
    ("abr", 4),
    ("mai", 5),
    ("jun", 6),
    ("jul", 7),
    ("ago", 8),
    ("set", 9),
    ("out", 10),
    ("nov", 11),
    ("dez", 12),
];

pub fn locate_period(sheet: &Sheet, limits: &ScanLimits) -> Result<Period, ExtractionError> {
    for row in 0..limits.period_rows.min(sheet.row_count()) {
        for col in 0..limits.period_cols {
            if let Some(period) = period_from_cell(sheet.cell(row, col)) {
                return Ok(period);
            }
        }
    }
    Err(ExtractionError::PeriodNotFound {
        rows: limits.period_rows,
        cols: limits.period_cols,
    })
}

fn period_from_cell(cell: &RawCell) -> Option<Period> {
    match cell {
        RawCell::Date(value) => Some(Period::new(value.month(), value.year())),
        RawCell::Text(text) if !text.trim().is_empty() => period_from_text(text),
        RawCell::Text(_) | RawCell::Empty | RawCell::Number(_) => None,
    }
}

fn expand_year(year: i32) -> i32 {
    if year < 100 {
        year + 2000
    } else {
        year
    }
}

fn checked(month: u32, year: i32) -> Option<Period> {
    let period = Period::new(month, expand_year(year));
    period.is_valid().then_some(period)
}

/// Parses `D/M/Y`, `M/Y` or `<mmm> ... <year>` text (Portuguese month
/// abbreviations). `-` and `\` count as `/`.
pub fn period_from_text(text: &str) -> Option<Period> {
    let text: String = text
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '\\' || c == '-' { '/' } else { c })
        .collect();

    if let Some(caps) = DAY_MONTH_YEAR.captures(&text) {
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return checked(month, year);
    }
    if let Some(caps) = MONTH_YEAR.captures(&text) {
        let month = caps[1].parse().ok()?;
        let year = caps[2].parse().ok()?;
        return checked(month, year);
    }

    for (abbreviation, month) in MONTH_ABBREVIATIONS {
        if !text.contains(abbreviation) {
            continue;
        }
        if let Some(year) = YEAR_DIGITS.find_iter(&text).last() {
            let year = year.as_str().parse().ok()?;
            return checked(month, year);
        }
    }
    None
}
