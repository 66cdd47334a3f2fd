//! Tagged cell values and spreadsheet cell references.
//!
//! CSV sources only ever produce [`CellValue::Text`] and [`CellValue::Empty`];
//! workbook sources keep the native type of each cell so that the validator can
//! report non-text formatting without knowing where the grid came from.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A single cell of a [`Grid`](crate::grid::Grid).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value at all
    #[default]
    Empty,
    /// A string value (all CSV values, text cells, spreadsheet error tokens)
    Text(String),
    /// A whole number
    Integer(i64),
    /// A number with a fractional part
    Float(f64),
    /// A boolean cell
    Boolean(bool),
    /// A date without a time component
    Date(NaiveDate),
    /// A date with a time component
    DateTime(NaiveDateTime),
    /// A duration, kept in its rendered form
    Duration(String),
}

impl CellValue {
    /// Build a cell from raw text, mapping the empty string to [`CellValue::Empty`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_string())
        }
    }

    /// Whether the cell is empty or holds only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Whether the cell holds a numeric value.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Borrow the string value of a text cell.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value type as shown in findings (`Integer`, `Date`, ...).
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "Empty",
            CellValue::Text(_) => "String",
            CellValue::Integer(_) => "Integer",
            CellValue::Float(_) => "Float",
            CellValue::Boolean(_) => "Boolean",
            CellValue::Date(_) => "Date",
            CellValue::DateTime(_) => "DateTime",
            CellValue::Duration(_) => "Duration",
        }
    }

    /// Render the value as text; empty cells render as the empty string.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) | CellValue::Duration(s) => f.write_str(s),
            CellValue::Integer(n) => write!(f, "{n}"),
            CellValue::Float(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Whether an optional cell is absent or blank.
#[must_use]
pub fn is_blank(cell: Option<&CellValue>) -> bool {
    cell.map_or(true, CellValue::is_blank)
}

/// Spreadsheet column letters for a 0-based column index (`0` → `A`, `26` → `AA`).
#[must_use]
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Spreadsheet cell reference for a 0-based column and 0-based row (`(1, 3)` → `B4`).
#[must_use]
pub fn cell_ref(column: usize, row: usize) -> String {
    format!("{}{}", column_letters(column), row + 1)
}
