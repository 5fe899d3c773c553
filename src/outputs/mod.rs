//! Report output.
//!
//! The assembled report is a header row plus one row per record. Writers
//! receive the full row set once and persist it however they like.
//!
//! # Submodules
//!
//! - [`xlsx`]: writes the rows to a single-sheet Excel workbook
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── challenge.xlsx
//! └── images/
//!     ├── ap24123456789.jpg.jpeg
//!     └── ...
//! ```

use std::error::Error;

pub mod xlsx;

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Text).unwrap_or(Cell::Empty)
    }
}

/// Persists a finished report.
pub trait ReportWriter {
    /// Write all rows, header first.
    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), Box<dyn Error>>;
}
