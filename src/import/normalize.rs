//! Turns one raw spreadsheet row into a `CandidateRecord` or a `ValidationError`.

use crate::model::{CandidateRecord, Category, Cell};
use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

/// The number of cells a row needs before it is considered at all.
pub const ROW_WIDTH: usize = 4;

/// Numeric date cells in this range are spreadsheet serial dates: any number that prints in at
/// most five characters.
const SERIAL_DATE_MIN: f64 = -9_999.0;
const SERIAL_DATE_MAX: f64 = 99_999.0;

/// ASCII digits only; `\d` would also accept other Unicode digits.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}[-/][0-9]{1,2}[-/][0-9]{1,2}$").expect("the date pattern is valid")
});

/// The longest prefix of a string that reads as a decimal number.
static NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(Infinity|([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?)")
        .expect("the number pattern is valid")
});

/// A row that failed validation. Only the first failing field of a row is reported.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// 1-based spreadsheet row, so the first data row under the header is row 2.
    pub row_number: usize,
    pub message: String,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// What became of a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Structurally incomplete. Neither a record nor an error.
    Skipped,
    Record(CandidateRecord),
    Invalid(ValidationError),
}

/// Validates and normalizes one row. `row_number` is only used in error messages.
pub fn normalize_row(row: Option<&[Cell]>, row_number: usize) -> RowOutcome {
    let Some(row) = row else {
        return RowOutcome::Skipped;
    };
    if row.len() < ROW_WIDTH {
        return RowOutcome::Skipped;
    }

    let date = date_text(&row[0]);
    let Some(date) = normalize_date(&date) else {
        return invalid(
            row_number,
            format!(
                "Row {row_number}: Invalid date format \"{date}\". Use YYYY-MM-DD or YYYY/MM/DD format."
            ),
        );
    };

    let category_text = row[1].text();
    let Some(category) = Category::from_exact(&category_text) else {
        return invalid(
            row_number,
            format!(
                "Row {row_number}: Invalid category \"{category_text}\". Allowed categories: {}.",
                Category::allowed_list()
            ),
        );
    };

    let amount = amount_value(&row[3]);
    if !(amount.is_finite() && amount > 0.0) {
        return invalid(
            row_number,
            format!(
                "Row {row_number}: Invalid amount \"{}\". Must be a positive number.",
                number_text(amount)
            ),
        );
    }

    RowOutcome::Record(CandidateRecord {
        date,
        category,
        description: row[2].text(),
        amount,
    })
}

fn invalid(row_number: usize, message: String) -> RowOutcome {
    RowOutcome::Invalid(ValidationError {
        row_number,
        message,
    })
}

/// The date cell as text, converting serial dates to `YYYY-MM-DD` first. Text cells are never
/// treated as serials, even when they look like one.
fn date_text(cell: &Cell) -> String {
    match cell.as_number() {
        Some(serial) if (SERIAL_DATE_MIN..=SERIAL_DATE_MAX).contains(&serial) => excel_serial_to_date(serial)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.text()),
        _ => cell.text().trim().to_string(),
    }
}

/// Converts a spreadsheet serial day count to a calendar date. The fractional part (time of day)
/// is dropped.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // 1899-12-30 rather than 12-31 absorbs the 1900 leap-year bug for every date after Feb 1900.
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Checks `date` against the accepted pattern and returns `YYYY-MM-DDT00:00`.
pub fn normalize_date(date: &str) -> Option<String> {
    if !DATE_PATTERN.is_match(date) {
        return None;
    }
    let normalized = date.replace('/', "-");
    let mut parts = normalized.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    Some(format!("{year}-{month:0>2}-{day:0>2}T00:00"))
}

/// The amount cell as a number. Text is read up to the end of its leading number, so `"12abc"` is
/// 12 and `"$5"` is NaN.
fn amount_value(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => parse_leading_number(s),
        Cell::Empty => f64::NAN,
    }
}

/// Reads the number at the start of `text`, after any leading whitespace. Returns NaN if there is
/// none.
pub fn parse_leading_number(text: &str) -> f64 {
    let Some(prefix) = NUMBER_PREFIX.find(text.trim_start()) else {
        return f64::NAN;
    };
    match prefix.as_str() {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        digits => digits.parse().unwrap_or(f64::NAN),
    }
}

/// Formats a parsed amount for an error message: `-5.5`, `0`, `NaN`, `Infinity`.
fn number_text(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: Vec<Cell>) -> RowOutcome {
        normalize_row(Some(cells.as_slice()), 2)
    }

    fn record(outcome: RowOutcome) -> CandidateRecord {
        match outcome {
            RowOutcome::Record(r) => r,
            other => panic!("expected a record, got {other:?}"),
        }
    }

    fn error(outcome: RowOutcome) -> ValidationError {
        match outcome {
            RowOutcome::Invalid(e) => e,
            other => panic!("expected an error, got {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_are_skipped() {
        assert_eq!(normalize_row(None, 2), RowOutcome::Skipped);
        assert_eq!(row(vec![]), RowOutcome::Skipped);
        assert_eq!(
            row(vec!["2024-01-01".into(), "Food".into(), "Lunch".into()]),
            RowOutcome::Skipped
        );
        // Invalid content does not matter if the row is short.
        assert_eq!(
            row(vec!["garbage".into(), "Travel".into()]),
            RowOutcome::Skipped
        );
    }

    #[test]
    fn test_dash_date() {
        let r = record(row(vec![
            "2024-01-01".into(),
            "Food".into(),
            "Lunch".into(),
            12.5.into(),
        ]));
        assert_eq!(r.date, "2024-01-01T00:00");
        assert_eq!(r.category, Category::Food);
        assert_eq!(r.description, "Lunch");
        assert_eq!(r.amount, 12.5);
    }

    #[test]
    fn test_slash_date_is_padded() {
        let r = record(row(vec![
            "2024/2/3".into(),
            "Bills".into(),
            Cell::Empty,
            20i64.into(),
        ]));
        assert_eq!(r.date, "2024-02-03T00:00");
        assert_eq!(r.description, "");
    }

    #[test]
    fn test_mixed_separators_are_accepted() {
        let r = record(row(vec![
            "2024-1/9".into(),
            "Other".into(),
            "x".into(),
            "1".into(),
        ]));
        assert_eq!(r.date, "2024-01-09T00:00");
    }

    #[test]
    fn test_date_text_is_trimmed() {
        let r = record(row(vec![
            " 2024-01-01 ".into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(r.date, "2024-01-01T00:00");
    }

    #[test]
    fn test_serial_date() {
        let r = record(row(vec![
            45000i64.into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(r.date, "2023-03-15T00:00");
    }

    #[test]
    fn test_serial_date_with_time_of_day() {
        let r = record(row(vec![
            45292.75.into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(r.date, "2024-01-01T00:00");
    }

    #[test]
    fn test_negative_serial_date() {
        let r = record(row(vec![
            (-5i64).into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(r.date, "1899-12-25T00:00");

        let e = error(row(vec![
            (-10_000i64).into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert!(e.message.contains("\"-10000\""), "{}", e.message);
    }

    #[test]
    fn test_excel_serial_to_date() {
        let d = excel_serial_to_date(1.0).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(1899, 12, 31).unwrap());
        let d = excel_serial_to_date(44927.0).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn test_text_serial_is_not_converted() {
        let e = error(row(vec![
            "45000".into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(
            e.message,
            "Row 2: Invalid date format \"45000\". Use YYYY-MM-DD or YYYY/MM/DD format."
        );
    }

    #[test]
    fn test_large_number_is_not_a_serial() {
        let e = error(row(vec![
            20240101i64.into(),
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert!(e.message.contains("\"20240101\""));
    }

    #[test]
    fn test_invalid_date() {
        for bad in ["01/02/2024", "2024-01", "24-01-01", "2024-001-01", "2024.01.01"] {
            let e = error(row(vec![
                bad.into(),
                "Food".into(),
                "desc".into(),
                10i64.into(),
            ]));
            assert_eq!(
                e.message,
                format!("Row 2: Invalid date format \"{bad}\". Use YYYY-MM-DD or YYYY/MM/DD format.")
            );
        }
    }

    #[test]
    fn test_empty_date() {
        let e = error(row(vec![
            Cell::Empty,
            "Food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert_eq!(
            e.message,
            "Row 2: Invalid date format \"\". Use YYYY-MM-DD or YYYY/MM/DD format."
        );
    }

    #[test]
    fn test_invalid_category() {
        let cells: Vec<Cell> = vec![
            "2024-01-01".into(),
            "Travel".into(),
            "desc".into(),
            10i64.into(),
        ];
        let e = error(normalize_row(Some(cells.as_slice()), 7));
        assert_eq!(e.row_number, 7);
        assert_eq!(
            e.message,
            "Row 7: Invalid category \"Travel\". Allowed categories: Food, Entertainment, Shopping, Bills, Other."
        );
    }

    #[test]
    fn test_category_is_case_sensitive() {
        let e = error(row(vec![
            "2024-01-01".into(),
            "food".into(),
            "desc".into(),
            10i64.into(),
        ]));
        assert!(e.message.contains("\"food\""));
    }

    #[test]
    fn test_negative_amount() {
        let e = error(row(vec![
            "2024-01-01".into(),
            "Food".into(),
            "desc".into(),
            (-5i64).into(),
        ]));
        assert_eq!(
            e.message,
            "Row 2: Invalid amount \"-5\". Must be a positive number."
        );
    }

    fn amount_error(amount: Cell) -> String {
        error(row(vec![
            "2024-01-01".into(),
            "Food".into(),
            "desc".into(),
            amount,
        ]))
        .message
    }

    #[test]
    fn test_amount_message_quotes_parsed_value() {
        for (cell, shown) in [
            (Cell::from("-5.50"), "-5.5"),
            (Cell::from("$5"), "NaN"),
            (Cell::from("abc"), "NaN"),
            (Cell::from("-0"), "0"),
            (Cell::from("0.000"), "0"),
            (Cell::from("-2e1x"), "-20"),
            (Cell::Number(-0.25), "-0.25"),
        ] {
            assert_eq!(
                amount_error(cell),
                format!("Row 2: Invalid amount \"{shown}\". Must be a positive number.")
            );
        }
    }

    #[test]
    fn test_amount_reads_leading_number() {
        for (text, expected) in [
            ("12abc", 12.0),
            ("1,234.50", 1.0),
            ("  3.5 EUR", 3.5),
            (".5", 0.5),
            ("7.", 7.0),
            ("+8", 8.0),
            ("1e3", 1000.0),
            ("2e", 2.0),
        ] {
            let r = record(row(vec![
                "2024-01-01".into(),
                "Food".into(),
                "desc".into(),
                text.into(),
            ]));
            assert_eq!(r.amount, expected, "{text}");
        }
    }

    #[test]
    fn test_parse_leading_number() {
        assert!(parse_leading_number("").is_nan());
        assert!(parse_leading_number("-").is_nan());
        assert!(parse_leading_number("e5").is_nan());
        assert_eq!(parse_leading_number("Infinity and more"), f64::INFINITY);
        assert_eq!(parse_leading_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(parse_leading_number("\t42"), 42.0);
    }

    #[test]
    fn test_infinite_amount_is_rejected() {
        assert_eq!(
            amount_error("Infinity".into()),
            "Row 2: Invalid amount \"Infinity\". Must be a positive number."
        );
    }

    #[test]
    fn test_bad_amounts() {
        let bad: Vec<Cell> = vec![
            0i64.into(),
            "0".into(),
            "abc".into(),
            "NaN".into(),
            "inf".into(),
            f64::INFINITY.into(),
        ];
        for amount in bad {
            let e = error(row(vec![
                "2024-01-01".into(),
                "Food".into(),
                "desc".into(),
                amount.clone(),
            ]));
            assert!(
                e.message.starts_with("Row 2: Invalid amount"),
                "{amount:?} gave {}",
                e.message
            );
        }
    }

    #[test]
    fn test_text_amount() {
        let r = record(row(vec![
            "2024-01-01".into(),
            "Shopping".into(),
            "desc".into(),
            " 7.25 ".into(),
        ]));
        assert_eq!(r.amount, 7.25);
    }

    #[test]
    fn test_first_failure_wins() {
        let e = error(row(vec![
            "bad".into(),
            "Travel".into(),
            "desc".into(),
            (-1i64).into(),
        ]));
        assert!(e.message.contains("Invalid date format"));

        let e = error(row(vec![
            "2024-01-01".into(),
            "Travel".into(),
            "desc".into(),
            (-1i64).into(),
        ]));
        assert!(e.message.contains("Invalid category"));
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let r = record(row(vec![
            "2024-01-01".into(),
            "Food".into(),
            "desc".into(),
            3i64.into(),
            "extra".into(),
        ]));
        assert_eq!(r.amount, 3.0);
    }

    #[test]
    fn test_idempotent() {
        let cells: Vec<Cell> = vec![45000i64.into(), "Food".into(), "d".into(), 1i64.into()];
        assert_eq!(
            normalize_row(Some(cells.as_slice()), 3),
            normalize_row(Some(cells.as_slice()), 3)
        );
        let cells: Vec<Cell> = vec!["x".into(), "Food".into(), "d".into(), 1i64.into()];
        assert_eq!(
            normalize_row(Some(cells.as_slice()), 3),
            normalize_row(Some(cells.as_slice()), 3)
        );
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024/12/31").unwrap(), "2024-12-31T00:00");
        assert_eq!(normalize_date("2024-1-1").unwrap(), "2024-01-01T00:00");
        assert!(normalize_date("").is_none());
        assert!(normalize_date("２０２４-01-01").is_none());
    }
}
