use crate::domain::entities::record::ExtractedRow;
use crate::domain::entities::sheet::RawCell;

pub fn parse_br_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn cell_amount(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(v) => Some(*v),
        RawCell::Text(v) => parse_br_number(v),
        RawCell::Empty | RawCell::Date(_) => None,
    }
}

fn first_amount(row: &ExtractedRow, matches: impl Fn(&str) -> bool) -> Option<f64> {
    row.fields
        .iter()
        .filter(|(name, _)| matches(name))
        .find_map(|(_, value)| cell_amount(value))
}

pub fn amount_atc(row: &ExtractedRow) -> Option<f64> {
    first_amount(row, |name| name.to_lowercase().contains("atc"))
}

pub fn amount_normal(row: &ExtractedRow) -> Option<f64> {
    first_amount(row, |name| name.trim().to_lowercase() == "normal")
}

pub fn amount_difal(row: &ExtractedRow) -> Option<f64> {
    first_amount(row, |name| {
        let name = name.to_lowercase();
        name.contains("dif") && name.contains("aliquota")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: Vec<(&str, RawCell)>) -> ExtractedRow {
        ExtractedRow {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            tax_id: "000000001".to_string(),
        }
    }

    #[test]
    fn brazilian_numbers_parse() {
        assert_eq!(parse_br_number("1.234,56"), Some(1234.56));
        assert_eq!(parse_br_number(" 10 "), Some(10.0));
        assert_eq!(parse_br_number("-"), None);
        assert_eq!(parse_br_number("abc"), None);
    }

    #[test]
    fn unparsable_text_falls_through_to_next_matching_column() {
        let row = row(vec![
            ("VALOR ATC", RawCell::text("n/d")),
            ("ATC AJUSTADO", RawCell::text("2.000,10")),
        ]);

        assert_eq!(amount_atc(&row), Some(2000.1));
    }

    #[test]
    fn normal_requires_exact_name() {
        let row = row(vec![
            ("ANORMAL", RawCell::Number(1.0)),
            (" Normal ", RawCell::Number(99.5)),
        ]);

        assert_eq!(amount_normal(&row), Some(99.5));
    }

    #[test]
    fn difal_needs_both_tokens() {
        let row = row(vec![
            ("DIF.", RawCell::Number(1.0)),
            ("DIF. ALIQUOTA", RawCell::text("300,00")),
        ]);

        assert_eq!(amount_difal(&row), Some(300.0));
    }

    #[test]
    fn missing_or_unparsable_values_yield_none() {
        let row = row(vec![
            ("ATC", RawCell::Empty),
            ("NORMAL", RawCell::text("null")),
        ]);

        assert_eq!(amount_atc(&row), None);
        assert_eq!(amount_normal(&row), None);
        assert_eq!(amount_difal(&row), None);
    }
}
