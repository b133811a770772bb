//! Locale-formatted number parsing
//!
//! Supplier spreadsheets export numbers like "12 500,75" with plain,
//! non-breaking (U+00A0) or narrow no-break (U+202F) spaces as thousands
//! separators and a comma as decimal mark. All such spaces are dropped and
//! every comma becomes a decimal point before parsing.

use crate::error::{Result, SeedError};
use crate::utils::Quantity;

const NARROW_NO_BREAK_SPACE: char = '\u{202f}';
const NO_BREAK_SPACE: char = '\u{a0}';

/// Parse one raw cell into a `Quantity`.
///
/// Missing cells, blank cells and literal "nan" are invalid quantities, not
/// errors. Anything else that does not parse is a `SeedError::Parse` naming the
/// raw value and its column.
pub fn parse_locale_number(raw: Option<&str>, column: &str) -> Result<Quantity> {
    let Some(raw) = raw else {
        return Ok(Quantity::INVALID);
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(*c, NARROW_NO_BREAK_SPACE | NO_BREAK_SPACE | ' ' | '\t'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return Ok(Quantity::INVALID);
    }

    cleaned
        .parse::<f64>()
        .map(Quantity::new)
        .map_err(|_| SeedError::Parse {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Parse a whole column of raw cells, failing on the first malformed value
pub fn parse_locale_column<'a, I>(values: I, column: &str) -> Result<Vec<Quantity>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    values
        .into_iter()
        .map(|raw| parse_locale_number(raw, column))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(raw: &str) -> Quantity {
        parse_locale_number(Some(raw), "test").unwrap()
    }

    #[test]
    fn test_plain_numbers() {
        assert_relative_eq!(parse("1500").value().unwrap(), 1500.0);
        assert_relative_eq!(parse("0.25").value().unwrap(), 0.25);
        assert_relative_eq!(parse("-3").value().unwrap(), -3.0);
    }

    #[test]
    fn test_comma_decimal_and_space_separators() {
        assert_relative_eq!(parse("12,5").value().unwrap(), 12.5);
        assert_relative_eq!(parse("12 500").value().unwrap(), 12500.0);
        assert_relative_eq!(parse("12\u{a0}500,75").value().unwrap(), 12500.75);
        assert_relative_eq!(parse("1\u{202f}234\u{202f}567").value().unwrap(), 1234567.0);
        assert_relative_eq!(parse("  42  ").value().unwrap(), 42.0);
    }

    #[test]
    fn test_missing_values_are_invalid() {
        assert!(!parse_locale_number(None, "test").unwrap().is_valid());
        assert!(!parse("").is_valid());
        assert!(!parse("   ").is_valid());
        assert!(!parse("nan").is_valid());
        assert!(!parse("NaN").is_valid());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = parse_locale_number(Some("about 30"), "Seeds/kg").unwrap_err();
        match err {
            SeedError::Parse { column, value } => {
                assert_eq!(column, "Seeds/kg");
                assert_eq!(value, "about 30");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_column_stops_at_first_error() {
        let ok = parse_locale_column(vec![Some("1"), None, Some("2,5")], "c").unwrap();
        assert_eq!(ok.len(), 3);
        assert!(!ok[1].is_valid());

        assert!(parse_locale_column(vec![Some("1"), Some("x")], "c").is_err());
    }
}
