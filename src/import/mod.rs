//! The bulk import pipeline: read a spreadsheet, normalize each row, decide whether the whole file
//! can be submitted, then submit it.
mod batch;
mod normalize;
mod reader;
mod submit;

pub use batch::{ImportBatch, NO_VALID_DATA};
pub use normalize::{
    excel_serial_to_date, normalize_date, normalize_row, RowOutcome, ValidationError, ROW_WIDTH,
};
#[cfg(test)]
pub(crate) use reader::GridReader;
pub use reader::{
    decoder_for, CsvDecoder, FileReader, SheetDecoder, SpreadsheetReader, WorkbookDecoder,
};
pub use submit::{submit, Submission, UPLOAD_SUCCESSFUL};
