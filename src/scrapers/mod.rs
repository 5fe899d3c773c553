//! Search result feeds.
//!
//! A feed exposes the currently loaded page of search results and can move
//! to the next page. The pagination driver only ever talks to a feed through
//! [`ResultFeed`], so the concrete source can be swapped for synthetic pages
//! in tests.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | AP News | [`apnews`] | HTML scraping | Search, category filter, newest-first sort |
//!
//! # Result Markup
//!
//! Every entry is parsed into a [`RawResultItem`], which answers four
//! questions about itself: title text, description text, the
//! `data-timestamp` attribute of its `bsp-timestamp` element, and the `src`
//! of its first `.Image` element.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::error::Error;

pub mod apnews;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".PagePromo-title"));
static DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".PagePromo-description"));
static TIMESTAMP_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("bsp-timestamp"));
static IMAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".Image"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

/// A source of paginated, newest-first search results.
pub trait ResultFeed {
    /// Entries of the currently loaded page, top to bottom.
    async fn current_items(&mut self) -> Result<Vec<RawResultItem>, Box<dyn Error>>;

    /// Navigate to the next page and wait until it has fully loaded.
    async fn next_page(&mut self) -> Result<(), Box<dyn Error>>;

    /// Release whatever session the feed holds. Best effort.
    async fn close(&mut self) {}
}

/// One entry of a loaded result page.
///
/// Only valid for the page it was read from; the driver drops it once the
/// entry has been turned into a record or discarded.
#[derive(Debug, Clone)]
pub struct RawResultItem {
    fragment: Html,
}

impl RawResultItem {
    /// Wrap the outer HTML of a single result entry.
    pub fn from_html(html: &str) -> Self {
        Self {
            fragment: Html::parse_fragment(html),
        }
    }

    /// Display text of the headline, whitespace-collapsed.
    pub fn title(&self) -> Option<String> {
        self.display_text(&TITLE_SELECTOR)
    }

    /// Display text of the teaser paragraph, whitespace-collapsed.
    pub fn description(&self) -> Option<String> {
        self.display_text(&DESCRIPTION_SELECTOR)
    }

    /// Raw `data-timestamp` attribute (epoch milliseconds as text).
    pub fn timestamp_attr(&self) -> Option<String> {
        self.fragment
            .select(&TIMESTAMP_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("data-timestamp"))
            .map(|s| s.trim().to_string())
    }

    /// `src` of the first image. `Some("")` when the image has no source.
    pub fn image_src(&self) -> Option<String> {
        self.fragment
            .select(&IMAGE_SELECTOR)
            .next()
            .map(|el| el.value().attr("src").unwrap_or_default().to_string())
    }

    fn display_text(&self, selector: &Selector) -> Option<String> {
        let element = self.fragment.select(selector).next()?;
        let text = element.text().flat_map(str::split_whitespace).collect::<Vec<_>>();
        Some(text.join(" "))
    }
}
