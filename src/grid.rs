//! Uniform row access over CSV and spreadsheet sources.
//!
//! A [`Grid`] is the whole input read once into memory: an ordered list of rows,
//! each an ordered list of [`CellValue`]s. Downstream validation never branches
//! on the source format.
//!
//! # Examples
//!
//! ```
//! use rpsv::grid::Grid;
//!
//! let grid = Grid::from_csv_bytes(b"druid,sourceId\naa111aa1111,src-1\n")?;
//! assert_eq!(grid.len(), 2);
//! assert_eq!(grid.row(2).map(|row| row[0].render()), Some("aa111aa1111".to_string()));
//! # Ok::<(), rpsv::RpsError>(())
//! ```

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::Timelike;
use tracing::debug;

use crate::cell::CellValue;
use crate::encoding::{ensure_utf8_or_ascii, strip_utf8_bom};
use crate::error::{Result, RpsError};

/// Input formats accepted by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values
    Csv,
    /// Legacy Excel workbook
    Xls,
    /// Office Open XML workbook
    Xlsx,
}

impl SourceFormat {
    /// Determine the format from a file extension (without the dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(SourceFormat::Csv),
            "xls" => Some(SourceFormat::Xls),
            "xlsx" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }

    /// Determine the format from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Displayed form of a path's extension, including the dot (empty if none).
#[must_use]
pub fn display_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// A tabular source read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    format: SourceFormat,
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Build a grid from already materialized rows.
    #[must_use]
    pub fn from_rows(format: SourceFormat, rows: Vec<Vec<CellValue>>) -> Self {
        Grid { format, rows }
    }

    /// Build a CSV-flavoured grid from string rows; empty strings become empty cells.
    #[must_use]
    pub fn from_text_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|s| CellValue::from_text(s.as_ref())).collect())
            .collect();
        Grid::from_rows(SourceFormat::Csv, rows)
    }

    /// Open a file, choosing the reader by its extension.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::UnsupportedFormat` for unknown extensions,
    /// `RpsError::EncodingError` for CSV files that are neither UTF-8 nor
    /// ASCII, and IO, CSV or spreadsheet errors when the content cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        match SourceFormat::from_path(path) {
            Some(SourceFormat::Csv) => {
                let bytes = fs::read(path)?;
                ensure_utf8_or_ascii(&bytes)?;
                Self::from_csv_bytes(&bytes)
            },
            Some(format) => Self::open_workbook(path, format),
            None => Err(RpsError::UnsupportedFormat(display_extension(path))),
        }
    }

    /// Parse CSV content.
    ///
    /// Rows may have differing widths. Empty lines, which the CSV parser
    /// skips, are restored as empty rows so row numbers match the file.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Csv` if the content is not parseable CSV (for
    /// example, invalid UTF-8 inside a field).
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes = strip_utf8_bom(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();
        let mut after_record = false;
        loop {
            let start = usize::try_from(reader.position().byte()).unwrap_or(usize::MAX);
            let more = reader.read_record(&mut record)?;
            for _ in 0..blank_lines_before(bytes, start, after_record) {
                rows.push(Vec::new());
            }
            if !more {
                break;
            }
            rows.push(record.iter().map(CellValue::from_text).collect());
            after_record = true;
        }

        debug!(rows = rows.len(), "parsed CSV source");
        Ok(Grid::from_rows(SourceFormat::Csv, rows))
    }

    /// Read the first worksheet of an `.xls`/`.xlsx` workbook.
    ///
    /// Cells keep their sheet positions (leading empty rows and columns are
    /// restored) and trailing empty cells are trimmed from each row.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Spreadsheet` if the workbook cannot be opened or has
    /// no worksheet.
    pub fn open_workbook(path: &Path, format: SourceFormat) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| RpsError::Spreadsheet("workbook has no worksheets".to_string()))??;

        let (row_offset, col_offset) = range
            .start()
            .map_or((0, 0), |(r, c)| (r as usize, c as usize));

        let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); row_offset];
        for data_row in range.rows() {
            let mut row: Vec<CellValue> = vec![CellValue::Empty; col_offset];
            row.extend(data_row.iter().map(cell_from_data));
            while row.last().is_some_and(|cell| *cell == CellValue::Empty) {
                row.pop();
            }
            rows.push(row);
        }

        debug!(rows = rows.len(), ?format, "read workbook source");
        Ok(Grid::from_rows(format, rows))
    }

    /// The format the grid was read from.
    #[must_use]
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the grid has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row by 1-based row number, as a spreadsheet user counts rows.
    #[must_use]
    pub fn row(&self, number: usize) -> Option<&[CellValue]> {
        number
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
            .map(Vec::as_slice)
    }

    /// Iterate rows in file order.
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterate rows padded with empty cells to at least `width` cells.
    pub fn padded_rows(&self, width: usize) -> impl Iterator<Item = Vec<CellValue>> + '_ {
        self.rows.iter().map(move |row| {
            let mut padded = row.clone();
            if padded.len() < width {
                padded.resize(width, CellValue::Empty);
            }
            padded
        })
    }

    /// Width of the widest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Convert a workbook cell into a tagged cell value.
///
/// Error cells become their text token (`#N/A`, `#REF!` ...), and integral
/// floats become integers since workbooks store every number as a double.
#[must_use]
pub fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Int(n) => CellValue::Integer(*n),
        Data::Float(f) => float_cell(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return CellValue::Duration(data.to_string());
            }
            match dt.as_datetime() {
                Some(datetime) if datetime.num_seconds_from_midnight() == 0 => {
                    CellValue::Date(datetime.date())
                },
                Some(datetime) => CellValue::DateTime(datetime),
                None => CellValue::Float(dt.as_f64()),
            }
        },
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Duration(s.clone()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_cell(f: f64) -> CellValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

/// Number of empty lines between the previous record (if any) and `position`.
///
/// Works back from `position` to the end of the previous record's content,
/// then counts line terminators forward; the first terminator after a record
/// only ends that record.
fn blank_lines_before(bytes: &[u8], position: usize, after_record: bool) -> usize {
    let mut gap_start = position.min(bytes.len());
    while gap_start > 0 && matches!(bytes[gap_start - 1], b'\r' | b'\n') {
        gap_start -= 1;
    }

    let mut terminators: usize = 0;
    let mut i = gap_start;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => i += 1,
            b'\r' => i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 },
            _ => break,
        }
        terminators += 1;
    }

    if after_record {
        terminators.saturating_sub(1)
    } else {
        terminators
    }
}
