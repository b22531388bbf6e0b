//! Validates every data row of a grid and decides whether the file may be submitted.

use crate::import::normalize::{normalize_row, RowOutcome, ValidationError};
use crate::model::{CandidateRecord, Grid};
use serde::Serialize;
use tracing::debug;

/// Shown when a file produced neither records nor errors.
pub const NO_VALID_DATA: &str = "No valid data found in the file.";

/// The result of validating one uploaded file. A file is submitted in full or not at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "rows")]
pub enum ImportBatch {
    /// Every populated row is valid. Never empty.
    Accepted(Vec<CandidateRecord>),
    /// At least one row is invalid. Holds every error in row order. Never empty.
    Rejected(Vec<ValidationError>),
    /// Only a header, only short rows, or nothing at all.
    Empty,
}

impl ImportBatch {
    /// Runs the row normalizer over every row after the header. The header is the first row that is
    /// not blank, and rows are numbered by their position in the grid, so leading blank rows count.
    pub fn validate(grid: &Grid) -> Self {
        let header = grid
            .iter()
            .position(|row| !row.is_empty())
            .unwrap_or(grid.len());
        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (ix, row) in grid.iter().enumerate().skip(header + 1) {
            match normalize_row(Some(row.as_slice()), ix + 1) {
                RowOutcome::Skipped => {}
                RowOutcome::Record(record) => records.push(record),
                RowOutcome::Invalid(error) => errors.push(error),
            }
        }
        debug!(
            "Validated {} data rows: {} valid, {} invalid",
            grid.len().saturating_sub(1),
            records.len(),
            errors.len()
        );
        if !errors.is_empty() {
            ImportBatch::Rejected(errors)
        } else if !records.is_empty() {
            ImportBatch::Accepted(records)
        } else {
            ImportBatch::Empty
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ImportBatch::Accepted(_))
    }

    /// The records to submit, if the batch was accepted.
    pub fn records(&self) -> Option<&[CandidateRecord]> {
        match self {
            ImportBatch::Accepted(records) => Some(records),
            _ => None,
        }
    }

    /// The message a user sees for a batch that will not be submitted. Accepted batches have none.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ImportBatch::Accepted(_) => None,
            ImportBatch::Rejected(errors) => {
                let lines: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                Some(format!("Upload failed:\n{}", lines.join("\n")))
            }
            ImportBatch::Empty => Some(NO_VALID_DATA.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Cell};

    fn header() -> Vec<Cell> {
        vec![
            "Date".into(),
            "Category".into(),
            "Description".into(),
            "Amount".into(),
        ]
    }

    fn data(date: impl Into<Cell>, category: &str, description: &str, amount: impl Into<Cell>) -> Vec<Cell> {
        vec![date.into(), category.into(), description.into(), amount.into()]
    }

    #[test]
    fn test_two_valid_rows() {
        let grid = vec![
            header(),
            data("2024-01-01", "Food", "Lunch", 12.5),
            vec!["2024/02/03".into(), "Bills".into(), Cell::Empty, 20i64.into()],
        ];
        let batch = ImportBatch::validate(&grid);
        let records = batch.records().unwrap();
        assert_eq!(
            records,
            &[
                CandidateRecord {
                    date: "2024-01-01T00:00".to_string(),
                    category: Category::Food,
                    description: "Lunch".to_string(),
                    amount: 12.5,
                },
                CandidateRecord {
                    date: "2024-02-03T00:00".to_string(),
                    category: Category::Bills,
                    description: String::new(),
                    amount: 20.0,
                },
            ]
        );
        assert!(batch.user_message().is_none());
    }

    #[test]
    fn test_serial_date_row() {
        let grid = vec![header(), data(45000i64, "Food", "desc", 10i64)];
        let batch = ImportBatch::validate(&grid);
        assert_eq!(batch.records().unwrap()[0].date, "2023-03-15T00:00");
    }

    #[test]
    fn test_one_bad_row_rejects_everything() {
        let grid = vec![
            header(),
            data("2024-01-01", "Travel", "desc", 10i64),
            data("2024-01-02", "Food", "fine", 10i64),
        ];
        let batch = ImportBatch::validate(&grid);
        let ImportBatch::Rejected(errors) = &batch else {
            panic!("expected rejection, got {batch:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row_number, 2);
        assert!(errors[0].message.contains("\"Travel\""));
        assert!(batch.records().is_none());
    }

    #[test]
    fn test_leading_blank_rows_come_before_the_header() {
        let grid = vec![
            vec![],
            vec![],
            header(),
            data("2024-01-01", "Food", "ok", 1i64),
            data("2024-01-02", "Travel", "bad", 1i64),
        ];
        let batch = ImportBatch::validate(&grid);
        assert_eq!(
            batch.user_message().unwrap(),
            "Upload failed:\nRow 5: Invalid category \"Travel\". Allowed categories: Food, Entertainment, Shopping, Bills, Other."
        );
        assert_eq!(ImportBatch::validate(&vec![vec![], header()]), ImportBatch::Empty);
    }

    #[test]
    fn test_negative_amount_rejects() {
        let grid = vec![header(), data("2024-01-01", "Food", "desc", -5i64)];
        let batch = ImportBatch::validate(&grid);
        assert_eq!(
            batch.user_message().unwrap(),
            "Upload failed:\nRow 2: Invalid amount \"-5\". Must be a positive number."
        );
    }

    #[test]
    fn test_errors_are_reported_in_row_order() {
        let grid = vec![
            header(),
            data("bad", "Food", "desc", 1i64),
            data("2024-01-01", "Food", "ok", 1i64),
            vec!["short".into()],
            data("2024-01-01", "Food", "desc", "x"),
        ];
        let ImportBatch::Rejected(errors) = ImportBatch::validate(&grid) else {
            panic!("expected rejection");
        };
        let rows: Vec<usize> = errors.iter().map(|e| e.row_number).collect();
        assert_eq!(rows, vec![2, 5]);
    }

    #[test]
    fn test_header_only() {
        let batch = ImportBatch::validate(&vec![header()]);
        assert_eq!(batch, ImportBatch::Empty);
        assert_eq!(batch.user_message().unwrap(), NO_VALID_DATA);
    }

    #[test]
    fn test_nothing_at_all() {
        assert_eq!(ImportBatch::validate(&Vec::new()), ImportBatch::Empty);
    }

    #[test]
    fn test_only_short_rows() {
        let grid = vec![
            header(),
            vec!["2024-01-01".into(), "Food".into()],
            Vec::new(),
        ];
        assert_eq!(ImportBatch::validate(&grid), ImportBatch::Empty);
    }

    #[test]
    fn test_header_is_never_validated() {
        // The header would fail every check if it were treated as data.
        let grid = vec![header(), data("2024-01-01", "Other", "", 1i64)];
        assert!(ImportBatch::validate(&grid).is_accepted());
    }
}
