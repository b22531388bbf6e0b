//! Decodes uploaded files into a `Grid` of raw cells.
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are decoded with `calamine` and only the first
//! worksheet is read. CSV files are decoded with the `csv` crate and every populated field becomes
//! a text cell.

use crate::model::{trim_trailing_empty, Cell, Grid};
use crate::{utils, Result};
use anyhow::{bail, Context};
use calamine::{Data, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, trace};

/// Reads a spreadsheet file and produces the rows of its first sheet, header included.
#[async_trait::async_trait]
pub trait SpreadsheetReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<Grid>;
}

/// Decodes the bytes of a single file format.
pub trait SheetDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Grid>;
}

/// Reads files from disk and chooses a decoder from the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReader;

#[async_trait::async_trait]
impl SpreadsheetReader for FileReader {
    async fn read(&self, path: &Path) -> Result<Grid> {
        trace!("reading spreadsheet {}", path.display());
        let bytes = utils::read_bytes(path).await?;
        let grid = decoder_for(path).decode(&bytes).with_context(|| {
            format!("Unable to decode {} as a spreadsheet", path.display())
        })?;
        debug!("Decoded {} rows from {}", grid.len(), path.display());
        Ok(grid)
    }
}

/// Returns the decoder for `path`. Anything that is not a `.csv` is treated as a workbook and left
/// to `calamine` to sniff.
pub fn decoder_for(path: &Path) -> Box<dyn SheetDecoder> {
    let is_csv = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvDecoder)
    } else {
        Box::new(WorkbookDecoder)
    }
}

/// Decodes any workbook format that `calamine` understands.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookDecoder;

impl SheetDecoder for WorkbookDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Grid> {
        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .context("The file is not a readable workbook")?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range.context("Unable to read the first worksheet")?,
            None => bail!("The workbook does not contain any worksheets"),
        };
        // The range starts at the first populated row, so leading blank rows are put back to keep
        // grid indices equal to sheet rows. Columns still start at the first populated one.
        let Some((first_row, _)) = range.start() else {
            return Ok(Grid::new());
        };
        let mut grid: Grid = vec![Vec::new(); first_row as usize];
        grid.extend(
            range
                .rows()
                .map(|row| trim_trailing_empty(row.iter().map(cell_from_data).collect())),
        );
        Ok(grid)
    }
}

/// Decodes comma-separated text. Rows may have differing lengths.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvDecoder;

impl SheetDecoder for CsvDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Grid> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        let mut grid = Grid::new();
        for (ix, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Unable to parse CSV record {}", ix + 1))?;
            let row = record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            grid.push(trim_trailing_empty(row));
        }
        Ok(grid)
    }
}

/// Date-formatted cells keep their serial number so that the row normalizer sees what a
/// spreadsheet user typed. Error cells carry no usable value.
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// An in-memory reader keyed by path, for exercising the pipeline without files.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct GridReader {
    grids: std::collections::HashMap<std::path::PathBuf, Grid>,
}

#[cfg(test)]
impl GridReader {
    pub(crate) fn with(mut self, path: impl Into<std::path::PathBuf>, grid: Grid) -> Self {
        self.grids.insert(path.into(), grid);
        self
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl SpreadsheetReader for GridReader {
    async fn read(&self, path: &Path) -> Result<Grid> {
        self.grids
            .get(path)
            .cloned()
            .with_context(|| format!("No grid registered for {}", path.display()))
    }
}
