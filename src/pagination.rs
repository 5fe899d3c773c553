//! Paging through a newest-first result feed until the recency window ends.
//!
//! ```text
//!  Fetching ──► Processing ──► Continue ──► Fetching ...
//!                   │
//!                   └──► Stopped (boundary crossed or page cap reached)
//! ```
//!
//! The first out-of-window entry ends the run: neither it nor anything after
//! it on the same page is extracted, and no further page is requested. A page
//! that cannot be read counts as empty. A failed move to the next page is
//! fatal and propagates to the caller.

use tracing::{Instrument, Span, debug, error, info, info_span};

use crate::download::FileDownloader;
use crate::extract::{Extraction, ResultItemExtractor};
use crate::report::ReportAssembler;
use crate::scrapers::{RawResultItem, ResultFeed};
use std::error::Error;

/// Why the driver stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An entry older than the cutoff was reached.
    BoundaryCrossed,
    /// The configured maximum number of pages was processed.
    PageLimit,
}

/// Summary of a finished pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOutcome {
    pub pages_visited: u32,
    pub stop_reason: StopReason,
}

#[derive(Debug)]
enum DriverState {
    Fetching,
    Processing(Vec<RawResultItem>),
    Continue,
    Stopped(StopReason),
}

/// Walks the feed page by page, feeding in-window records to the report.
pub struct PaginationDriver<'a, F, D> {
    feed: &'a mut F,
    extractor: &'a ResultItemExtractor<D>,
    max_pages: Option<u32>,
    span: Span,
}

impl<'a, F, D> PaginationDriver<'a, F, D>
where
    F: ResultFeed,
    D: FileDownloader,
{
    /// The feed must already be positioned on its first page.
    pub fn new(feed: &'a mut F, extractor: &'a ResultItemExtractor<D>) -> Self {
        Self {
            feed,
            extractor,
            max_pages: None,
            span: info_span!("pagination"),
        }
    }

    /// Stop after `max_pages` pages even if the window has not ended.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub async fn run(
        mut self,
        report: &mut ReportAssembler,
    ) -> Result<PaginationOutcome, Box<dyn Error>> {
        let span = self.span.clone();
        self.drive(report).instrument(span).await
    }

    async fn drive(
        &mut self,
        report: &mut ReportAssembler,
    ) -> Result<PaginationOutcome, Box<dyn Error>> {
        let mut state = DriverState::Fetching;
        let mut pages_visited = 0u32;

        loop {
            state = match state {
                DriverState::Fetching => {
                    pages_visited += 1;
                    let items = match self.feed.current_items().await {
                        Ok(items) => items,
                        Err(e) => {
                            error!(page = pages_visited, error = %e, "Error while getting search result list; treating page as empty");
                            Vec::new()
                        }
                    };
                    debug!(page = pages_visited, count = items.len(), "Fetched result page");
                    DriverState::Processing(items)
                }
                DriverState::Processing(items) => {
                    let before = report.len();
                    let crossed = self.process_page(&items, report).await;
                    info!(
                        page = pages_visited,
                        entries = items.len(),
                        kept = report.len() - before,
                        boundary_crossed = crossed,
                        "Processed result page"
                    );

                    if crossed {
                        DriverState::Stopped(StopReason::BoundaryCrossed)
                    } else if self.max_pages.is_some_and(|max| pages_visited >= max) {
                        DriverState::Stopped(StopReason::PageLimit)
                    } else {
                        DriverState::Continue
                    }
                }
                DriverState::Continue => {
                    if let Err(e) = self.feed.next_page().await {
                        error!(page = pages_visited, error = %e, "Could not move to the next result page");
                        return Err(e);
                    }
                    DriverState::Fetching
                }
                DriverState::Stopped(stop_reason) => {
                    info!(pages_visited, ?stop_reason, records = report.len(), "Pagination stopped");
                    return Ok(PaginationOutcome {
                        pages_visited,
                        stop_reason,
                    });
                }
            };
        }
    }

    /// Extract entries in page order. Returns `true` once an out-of-window
    /// entry is met; the rest of the page is left unread.
    async fn process_page(&self, items: &[RawResultItem], report: &mut ReportAssembler) -> bool {
        for (index, item) in items.iter().enumerate() {
            match self.extractor.extract(item).await {
                Extraction::Record(record) => report.push(record),
                Extraction::OutOfWindow { date } => {
                    info!(index, %date, skipped = items.len() - index, "Reached first entry outside the recency window");
                    return true;
                }
            }
        }
        false
    }
}
