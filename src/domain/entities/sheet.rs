use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Date(NaiveDateTime),
    Text(String),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(v) => v.trim().is_empty(),
            RawCell::Number(_) | RawCell::Date(_) => false,
        }
    }
}

impl std::fmt::Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawCell::Empty => Ok(()),
            RawCell::Number(v) => write!(f, "{}", format_number(*v)),
            RawCell::Date(v) => write!(f, "{v}"),
            RawCell::Text(v) => write!(f, "{v}"),
        }
    }
}

fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract().abs() < f64::EPSILON && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<RawCell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> Option<&[RawCell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> &RawCell {
        const EMPTY: &RawCell = &RawCell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }
}
