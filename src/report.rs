//! Report accumulation.
//!
//! Records are appended in the order the pagination driver encounters them,
//! which on a newest-first feed means newest to oldest. The assembler is
//! consumed when the report is written, so a run writes at most one report.

use std::error::Error;
use tracing::{info, instrument};

use crate::models::ExtractedRecord;
use crate::outputs::{Cell, ReportWriter};

/// Column names of the report's first row.
pub const REPORT_HEADER: [&str; 6] = [
    "title",
    "date",
    "description",
    "picture_file_name",
    "search_phrase_matches",
    "contains_money",
];

/// Ordered accumulator of extracted records.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    records: Vec<ExtractedRecord>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ExtractedRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    /// Header row followed by one row per record.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let header = REPORT_HEADER
            .iter()
            .map(|name| Cell::Text(name.to_string()))
            .collect();

        std::iter::once(header)
            .chain(self.records.iter().map(|record| {
                vec![
                    Cell::from(record.title.clone()),
                    Cell::from(record.publication_date.clone()),
                    Cell::from(record.description.clone()),
                    Cell::from(record.picture_file_name.clone()),
                    Cell::Number(record.search_phrase_matches as f64),
                    Cell::Bool(record.contains_money),
                ]
            }))
            .collect()
    }

    /// Hand the finished report to `writer`. Returns the number of records.
    #[instrument(level = "info", skip_all, fields(records = self.records.len()))]
    pub fn finish<W: ReportWriter>(self, writer: &mut W) -> Result<usize, Box<dyn Error>> {
        writer.write_rows(&self.rows())?;
        info!(records = self.records.len(), "Report written");
        Ok(self.records.len())
    }
}
