//! AP News search scraper.
//!
//! Walks the server-rendered search results at `{base}/search`. Setup mirrors
//! what a reader would do in the browser before paging:
//!
//! 1. Search for the phrase (`q=`)
//! 2. Tick the category checkbox whose label contains the requested category
//! 3. Sort by "Newest" (`s=3`)
//!
//! Each page load waits for the whole response body, which doubles as the
//! page-ready signal. Moving on follows the `Pagination-nextPage` link.

use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::{RawResultItem, ResultFeed};
use crate::config::SearchCriteria;

/// Query pair selecting the "Newest" sort order.
const NEWEST_SORT: (&str, &str) = ("s", "3");

/// A live AP News search, positioned on one result page.
#[derive(Debug)]
pub struct ApNewsFeed {
    client: Client,
    current_url: Url,
    current_html: Option<String>,
    page: u32,
}

impl ApNewsFeed {
    /// Run the search, apply the category filter and sort, and load page one.
    ///
    /// A category that does not appear among the filter options is logged
    /// and skipped; the search continues unfiltered.
    #[instrument(level = "info", skip_all, fields(%base_url, phrase = %criteria.search_phrase, category = %criteria.news_category))]
    pub async fn open(
        client: Client,
        base_url: &str,
        criteria: &SearchCriteria,
    ) -> Result<Self, Box<dyn Error>> {
        let mut search_url = Url::parse(base_url)?.join("/search")?;
        search_url
            .query_pairs_mut()
            .append_pair("q", &criteria.search_phrase);

        let search_html = fetch_page(&client, &search_url).await?;

        info!(category = %criteria.news_category, "Filtering by category");
        match category_filter(&search_html, &criteria.news_category) {
            Some((name, value)) => {
                debug!(%name, %value, "Matched category filter option");
                search_url.query_pairs_mut().append_pair(&name, &value);
            }
            None => error!(category = %criteria.news_category, "Category not found"),
        }

        info!("Sorting the results by Newest first");
        search_url
            .query_pairs_mut()
            .append_pair(NEWEST_SORT.0, NEWEST_SORT.1);

        let first_page = fetch_page(&client, &search_url).await?;
        info!(url = %search_url, "Loaded first result page");

        Ok(Self {
            client,
            current_url: search_url,
            current_html: Some(first_page),
            page: 1,
        })
    }
}

impl ResultFeed for ApNewsFeed {
    #[instrument(level = "debug", skip_all, fields(page = self.page))]
    async fn current_items(&mut self) -> Result<Vec<RawResultItem>, Box<dyn Error>> {
        let html = self
            .current_html
            .as_deref()
            .ok_or("no result page is loaded")?;
        let items = parse_result_items(html).ok_or("search result list not found on page")?;
        debug!(count = items.len(), "Read result entries");
        Ok(items)
    }

    #[instrument(level = "info", skip_all, fields(page = self.page))]
    async fn next_page(&mut self) -> Result<(), Box<dyn Error>> {
        let html = self
            .current_html
            .as_deref()
            .ok_or("no result page is loaded")?;
        let next_url = next_page_url(html, &self.current_url).ok_or("next page link not found")?;

        let body = fetch_page(&self.client, &next_url).await?;
        self.current_url = next_url;
        self.current_html = Some(body);
        self.page += 1;
        info!(page = self.page, url = %self.current_url, "Moved to next result page");
        Ok(())
    }

    async fn close(&mut self) {
        if self.current_html.take().is_some() {
            info!(pages = self.page, "Closed search session");
        }
    }
}

/// GET a page and return its body once fully received.
#[instrument(level = "debug", skip_all, fields(%url))]
async fn fetch_page(client: &Client, url: &Url) -> Result<String, Box<dyn Error>> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}

/// Entries of the result list, or `None` when the list itself is missing.
pub fn parse_result_items(html: &str) -> Option<Vec<RawResultItem>> {
    let document = Html::parse_document(html);
    let list_selector = Selector::parse(".SearchResultsModule-results .PageList-items").ok()?;
    let item_selector = Selector::parse(".PageList-items-item").ok()?;

    let list = document.select(&list_selector).next()?;
    Some(
        list.select(&item_selector)
            .map(|el| RawResultItem::from_html(&el.html()))
            .collect(),
    )
}

/// Query pair of the category option whose label contains `category`,
/// compared case-insensitively.
pub fn category_filter(html: &str, category: &str) -> Option<(String, String)> {
    let needle = category.trim().to_lowercase();
    if needle.is_empty() {
        warn!("Empty news category; skipping category filter");
        return None;
    }

    let document = Html::parse_document(html);
    let option_selector =
        Selector::parse(".SearchFilter-items-wrapper .SearchFilter-items-item").ok()?;
    let input_selector = Selector::parse("input[name][value]").ok()?;
    let label_selector = Selector::parse("span").ok()?;

    document.select(&option_selector).find_map(|option| {
        let label = option
            .select(&label_selector)
            .flat_map(|span| span.text())
            .collect::<String>()
            .to_lowercase();
        if !label.contains(&needle) {
            return None;
        }
        let input = option.select(&input_selector).next()?;
        Some((
            input.value().attr("name")?.to_string(),
            input.value().attr("value")?.to_string(),
        ))
    })
}

/// Absolute URL behind the "next page" control, resolved against `current`.
pub fn next_page_url(html: &str, current: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(".Pagination-nextPage a[href], a.Pagination-nextPage[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;
    current.join(href).ok()
}
