//! Writes the downloadable import template: a single `Template` sheet with the header row and one
//! example row.

use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::Context;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tracing::debug;

pub const SHEET_NAME: &str = "Template";
pub const HEADER: [&str; 4] = ["Date", "Category", "Description", "Amount"];

/// The example row. The amount is stored as a number, not text.
pub const EXAMPLE_DATE: &str = "2024-01-01";
pub const EXAMPLE_CATEGORY: &str = "Food";
pub const EXAMPLE_DESCRIPTION: &str = "Example description";
pub const EXAMPLE_AMOUNT: f64 = 12.5;

/// Builds the template workbook in memory.
pub fn template_bytes() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name(SHEET_NAME)
        .context("Unable to name the template sheet")?;
    for (col, title) in (0u16..).zip(HEADER) {
        worksheet
            .write_string(0, col, title)
            .with_context(|| format!("Unable to write the '{title}' header"))?;
    }
    worksheet
        .write_string(1, 0, EXAMPLE_DATE)
        .and_then(|w| w.write_string(1, 1, EXAMPLE_CATEGORY))
        .and_then(|w| w.write_string(1, 2, EXAMPLE_DESCRIPTION))
        .and_then(|w| w.write_number(1, 3, EXAMPLE_AMOUNT))
        .context("Unable to write the example row")?;
    workbook
        .save_to_buffer()
        .context("Unable to serialize the template workbook")
}

/// Writes the template workbook to `path`, replacing any existing file.
pub async fn write_template(path: &Path) -> Result<()> {
    let bytes = template_bytes().pub_result(ErrorType::Spreadsheet)?;
    utils::write(path, &bytes).await.pub_result(ErrorType::Io)?;
    debug!("Wrote the import template to {}", path.display());
    Ok(())
}
