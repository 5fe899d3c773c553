//! Excel workbook output.
//!
//! Rows go to the first worksheet starting at `A1`. Empty cells are left
//! unwritten rather than stored as empty strings.

use rust_xlsxwriter::Workbook;
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, instrument};

use super::{Cell, ReportWriter};

/// Writes the report to a `.xlsx` file, replacing any previous one.
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    path: PathBuf,
}

impl XlsxReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for XlsxReportWriter {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    fn write_rows(&mut self, rows: &[Vec<Cell>]) -> Result<(), Box<dyn Error>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (r, row) in rows.iter().enumerate() {
            let r = u32::try_from(r)?;
            for (c, cell) in row.iter().enumerate() {
                let c = u16::try_from(c)?;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number(r, c, *n)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(r, c, *b)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        workbook.save(&self.path)?;
        info!(rows = rows.len(), "Saved workbook");
        Ok(())
    }
}
