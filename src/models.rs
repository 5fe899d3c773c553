//! Data models shared by the extraction pipeline.
//!
//! - [`ExtractedRecord`]: one report row, built from a single search result
//! - [`Field`]: outcome of reading one field from a result entry
//! - [`Cutoff`]: earliest month/year still inside the recency window
//! - [`RecencyVerdict`]: in-window decision plus the formatted publication date

/// Outcome of reading a single field from a result entry.
///
/// Extraction failures are recovered locally: the caller logs them and the
/// field is recorded as [`Field::Absent`]. Anything that should abort the run
/// travels as an `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Present(T),
    Absent,
}

impl<T> Field<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Field::Present(_))
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }
}

/// A fully extracted search result, one row of the final report.
///
/// Records are immutable once built and are kept in encounter order by the
/// [`ReportAssembler`](crate::report::ReportAssembler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Headline text, absent when the entry had no readable title.
    pub title: Option<String>,
    /// Publication date as `YYYY-MM-DD` in local time.
    pub publication_date: Option<String>,
    /// Teaser text shown under the headline.
    pub description: Option<String>,
    /// Literal `<segment>.jpeg` name of the downloaded thumbnail.
    pub picture_file_name: Option<String>,
    /// Case-insensitive occurrences of the search phrase in title and description.
    pub search_phrase_matches: usize,
    /// Whether title or description mention an amount of money.
    pub contains_money: bool,
}

/// The earliest `(month, year)` pair still inside the recency window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff {
    /// Always within `1..=12`.
    pub month: u32,
    pub year: i32,
}

/// Result of checking one publication date against a [`Cutoff`].
///
/// The stop decision is not encoded here; the pagination driver derives it
/// from `in_window` on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyVerdict {
    pub in_window: bool,
    /// `YYYY-MM-DD` of the checked date, filled regardless of the outcome.
    pub date: String,
}
