//! User-entered due dates

use crate::error::{DeckError, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Formats tried in order. Month-first wins over day-first when both parse.
const ACCEPTED_FORMATS: &[&str] = &["%b %d %Y", "%b %d, %Y", "%m/%d/%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// Hint shown when prompting for a date
pub const DATE_HINT: &str = r#"Enter a date like "Jun 15 2018", "06/15/2018", "15/06/2018" or "2018-06-15""#;

/// Parse a due date typed by the user. The result is midnight UTC.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.split_whitespace().collect::<Vec<_>>().join(" ");
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DeckError::validation("date", format!("unrecognized date '{input}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(date: DateTime<Utc>) -> (i32, u32, u32) {
        (date.year(), date.month(), date.day())
    }

    #[test]
    fn test_month_name_formats() {
        assert_eq!(ymd(parse_due_date("Aug 30 2018").unwrap()), (2018, 8, 30));
        assert_eq!(ymd(parse_due_date("August 30 2018").unwrap()), (2018, 8, 30));
        assert_eq!(ymd(parse_due_date("  aug  30,  2018 ").unwrap()), (2018, 8, 30));
    }

    #[test]
    fn test_numeric_formats_prefer_month_first() {
        assert_eq!(ymd(parse_due_date("06/15/2018").unwrap()), (2018, 6, 15));
        assert_eq!(ymd(parse_due_date("15/06/2018").unwrap()), (2018, 6, 15));
        // Both readings are valid; month-first is tried first
        assert_eq!(ymd(parse_due_date("03/04/2018").unwrap()), (2018, 3, 4));
    }

    #[test]
    fn test_iso_format() {
        let date = parse_due_date("2018-08-30").unwrap();
        assert_eq!(date.to_rfc3339(), "2018-08-30T00:00:00+00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "tomorrow", "13/13/2018", "Aug 32 2018"] {
            assert!(
                matches!(parse_due_date(input), Err(DeckError::Validation { .. })),
                "{input} should not parse"
            );
        }
    }
}
