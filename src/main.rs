//! # Headline Harvest
//!
//! A one-shot extraction run over a news site's search results: search for a
//! phrase, narrow to a category, sort newest first, and page through results
//! until they fall outside an N-month recency window. Each kept result
//! becomes a spreadsheet row, and its thumbnail is downloaded alongside.
//!
//! ## Usage
//!
//! ```sh
//! headline_harvest -o ./output
//! ```
//!
//! ## Architecture
//!
//! The run is a single forward pass:
//! 1. **Setup**: Load the work item, open the search, apply category and sort
//! 2. **Pagination**: Read each page top to bottom, stop at the first entry
//!    older than the cutoff
//! 3. **Extraction**: Title, description, date, thumbnail, phrase matches,
//!    money mentions per kept entry
//! 4. **Output**: Write the report workbook once, at the end

use chrono::Local;
use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod classify;
mod cli;
mod config;
mod download;
mod extract;
mod models;
mod outputs;
mod pagination;
mod recency;
mod report;
mod scrapers;
mod utils;

use cli::Cli;
use download::HttpDownloader;
use extract::ResultItemExtractor;
use outputs::xlsx::XlsxReportWriter;
use pagination::PaginationDriver;
use recency::RecencyFilter;
use report::ReportAssembler;
use scrapers::ResultFeed;
use scrapers::apnews::ApNewsFeed;
use utils::ensure_writable_dir;

const USER_AGENT: &str = concat!("headline_harvest/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_harvest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let criteria =
        match config::load_work_item(args.queue_file.as_deref(), &args.work_item_path()).await {
            Ok(criteria) => criteria,
            Err(e) => {
                error!(error = %e, "Error while loading work item");
                return Err(e);
            }
        };

    let run_span = info_span!(
        "run",
        phrase = %criteria.search_phrase,
        category = %criteria.news_category,
        month_range = criteria.month_range
    );
    let records = run(&args, &criteria).instrument(run_span).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        records,
        "Execution complete"
    );
    Ok(())
}

/// Search, paginate, and write the report. Returns the number of records.
async fn run(args: &Cli, criteria: &config::SearchCriteria) -> Result<usize, Box<dyn Error>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;

    info!(base_url = %args.base_url, "Opening search");
    let mut feed = match ApNewsFeed::open(client.clone(), &args.base_url, criteria).await {
        Ok(feed) => feed,
        Err(e) => {
            error!(error = %e, "An error occurred while setting up the search");
            return Err(e);
        }
    };

    let today = Local::now().date_naive();
    let filter = RecencyFilter::from_today(today, criteria.month_range);
    let cutoff = filter.cutoff();
    info!(cutoff_month = cutoff.month, cutoff_year = cutoff.year, "Iterating over news results");

    let extractor = ResultItemExtractor::new(
        criteria.search_phrase.clone(),
        filter,
        HttpDownloader::new(client),
        args.images_dir(),
    );

    let mut report = ReportAssembler::new();
    let outcome = PaginationDriver::new(&mut feed, &extractor)
        .with_max_pages(args.max_pages)
        .run(&mut report)
        .await;
    feed.close().await;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, records = report.len(), "An error occurred; no report written");
            return Err(e);
        }
    };
    let with_money = report.records().iter().filter(|r| r.contains_money).count();
    let with_picture = report
        .records()
        .iter()
        .filter(|r| r.picture_file_name.is_some())
        .count();
    info!(
        pages = outcome.pages_visited,
        stop_reason = ?outcome.stop_reason,
        records = report.len(),
        with_money,
        with_picture,
        "Finished collecting results"
    );
    if report.is_empty() {
        warn!("No results inside the recency window");
    }

    let report_path = args.report_path();
    info!(path = %report_path.display(), "Filling Excel file with the results");
    let mut writer = XlsxReportWriter::new(&report_path);
    match report.finish(&mut writer) {
        Ok(count) => Ok(count),
        Err(e) => {
            error!(path = %report_path.display(), error = %e, "Error while filling Excel file");
            Err(e)
        }
    }
}
