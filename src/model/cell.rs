//! Raw spreadsheet cell values.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A single cell value as decoded from a spreadsheet, before any validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

/// One row of cells, positionally indexed.
pub type RawRow = Vec<Cell>;

/// The rows of the first sheet of a workbook, header included.
pub type Grid = Vec<RawRow>;

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the value if this is a numeric cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The cell's text form: empty cells are `""` and numbers print without a trailing `.0`.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            // f64's Display already omits the fractional part for whole numbers (20.0 -> "20")
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Drops trailing empty cells so that a row's length reflects its last populated column.
pub(crate) fn trim_trailing_empty(mut row: RawRow) -> RawRow {
    while matches!(row.last(), Some(Cell::Empty)) {
        row.pop();
    }
    row
}
