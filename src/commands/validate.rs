use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::import::{ImportBatch, SpreadsheetReader};
use crate::Result;
use anyhow::anyhow;
use std::path::Path;

/// Reads and validates `file` without contacting the server. A batch that would not be uploaded
/// is an error so that the exit status reflects it.
pub async fn validate(reader: &dyn SpreadsheetReader, file: &Path) -> Result<Out<ImportBatch>> {
    let grid = reader
        .read(file)
        .await
        .map_err(|e| anyhow!("Unable to read the spreadsheet: {e:#}"))
        .pub_result(ErrorType::Spreadsheet)?;
    let batch = ImportBatch::validate(&grid);
    if let Some(message) = batch.user_message() {
        return Err(anyhow!(message)).pub_result(ErrorType::Spreadsheet);
    }
    let count = batch.records().map_or(0, |records| records.len());
    Ok(Out::new(
        format!("All {count} rows are valid and ready to upload"),
        batch,
    ))
}
