//! Recency window checks.
//!
//! The window is expressed as a [`Cutoff`] month/year derived from today's
//! date and the configured month range. A publication date is in-window when
//! its month is not before the cutoff month AND its year is not before the
//! cutoff year. The two comparisons are independent, so this is an
//! approximation of "within N months" and can reject dates near a year
//! boundary that a true date comparison would accept. Downstream stopping
//! behaviour relies on this exact rule.

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use tracing::debug;

use crate::models::{Cutoff, RecencyVerdict};

/// Largest step back that still yields an `i32` year.
const MAX_EFFECTIVE_RANGE: i64 = 12 * i32::MAX as i64;

/// Months to step back from the current month: `max(month_range - 1, 0)`,
/// capped at [`MAX_EFFECTIVE_RANGE`].
pub fn effective_range(month_range: i64) -> i64 {
    month_range.saturating_sub(1).clamp(0, MAX_EFFECTIVE_RANGE)
}

/// Compute the cutoff for a window ending at `today`.
///
/// Stepping back past January borrows whole years. A result of exactly
/// month 0 keeps its year and is reported as January, which admits the
/// same dates under the month/year rule.
pub fn compute_cutoff(today: NaiveDate, month_range: i64) -> Cutoff {
    let mut month_filter = i64::from(today.month()) - effective_range(month_range);
    let mut year_filter = today.year();

    if month_filter < 0 {
        let borrow = month_filter.saturating_neg().saturating_add(11) / 12;
        year_filter = year_filter.saturating_sub(i32::try_from(borrow).unwrap_or(i32::MAX));
        month_filter += 12 * borrow;
    }

    Cutoff {
        month: month_filter.max(1) as u32,
        year: year_filter,
    }
}

/// Convert epoch milliseconds to a calendar date in local time.
pub fn local_date_from_millis(millis: i64) -> Option<NaiveDate> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.date_naive())
}

/// Decides whether publication dates fall inside the recency window.
#[derive(Debug, Clone, Copy)]
pub struct RecencyFilter {
    cutoff: Cutoff,
}

impl RecencyFilter {
    pub fn new(cutoff: Cutoff) -> Self {
        Self { cutoff }
    }

    /// Build a filter for a window of `month_range` months ending at `today`.
    pub fn from_today(today: NaiveDate, month_range: i64) -> Self {
        let cutoff = compute_cutoff(today, month_range);
        debug!(
            %today,
            month_range,
            cutoff_month = cutoff.month,
            cutoff_year = cutoff.year,
            "Computed recency cutoff"
        );
        Self::new(cutoff)
    }

    pub fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    pub fn evaluate(&self, published: NaiveDate) -> RecencyVerdict {
        RecencyVerdict {
            in_window: published.month() >= self.cutoff.month
                && published.year() >= self.cutoff.year,
            date: published.format("%Y-%m-%d").to_string(),
        }
    }
}
