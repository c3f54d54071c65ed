use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entities::sheet::RawCell;

/// Day of the reference month used for both due and payment dates.
pub const DUE_DAY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn new(month: u32, year: i32) -> Self {
        Self { month, year }
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && self.year > 0
    }

    /// The 15th of the reference month, or `None` for an out-of-range period.
    pub fn due_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, DUE_DAY)
    }

    pub fn portal_text(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    pub name: String,
    pub index: usize,
}

/// Column display name to 0-based column index, in sheet order. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: Vec<HeaderColumn>,
    tax_id_column: Option<usize>,
}

impl HeaderMap {
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Inserts `name`; the caller guarantees it is not already present.
    pub(crate) fn push(&mut self, name: String, index: usize) {
        debug_assert!(!self.contains(&name), "duplicate header name {name}");
        self.columns.push(HeaderColumn { name, index });
    }

    pub(crate) fn set_tax_id_column(&mut self, index: usize) {
        self.tax_id_column = Some(index);
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.index)
    }

    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn tax_id_column(&self) -> Option<usize> {
        self.tax_id_column
    }

    pub fn tax_id_name(&self) -> Option<&str> {
        let idx = self.tax_id_column?;
        self.columns
            .iter()
            .find(|c| c.index == idx)
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedRow {
    pub fields: Vec<(String, RawCell)>,
    pub tax_id: String,
}

impl ExtractedRow {
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&RawCell> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    Atc,
    Normal,
    Difal,
}

impl Process {
    pub const ALL: [Process; 3] = [Process::Atc, Process::Normal, Process::Difal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Process::Atc => "atc",
            Process::Normal => "normal",
            Process::Difal => "difal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Process::Atc => "ATC",
            Process::Normal => "Normal",
            Process::Difal => "DIFAL",
        }
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub tax_id: String,
    pub amount_atc: Option<f64>,
    pub amount_normal: Option<f64>,
    pub amount_difal: Option<f64>,
    pub period: Period,
    pub source_row: ExtractedRow,
}

impl Record {
    pub fn amount_for(&self, process: Process) -> Option<f64> {
        match process {
            Process::Atc => self.amount_atc,
            Process::Normal => self.amount_normal,
            Process::Difal => self.amount_difal,
        }
    }

    pub fn is_actionable(&self, process: Process) -> bool {
        matches!(self.amount_for(process), Some(v) if v != 0.0 && !v.is_nan())
    }
}

pub fn count_actionable(records: &[Record], processes: &[Process]) -> (usize, usize) {
    let processes = if processes.is_empty() {
        &[Process::Atc][..]
    } else {
        processes
    };
    let actionable = records
        .iter()
        .filter(|r| processes.iter().any(|p| r.is_actionable(*p)))
        .count();
    (actionable, records.len() - actionable)
}

pub fn tax_ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.tax_id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
