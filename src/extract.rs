//! Turning one search result entry into a report record.
//!
//! The recency check runs first. Entries outside the window are reported as
//! [`Extraction::OutOfWindow`] without touching any other field, so no image
//! is downloaded for them. Every other field failure is logged and recorded
//! as absent; the entry is still kept.

use std::path::PathBuf;
use tracing::{debug, error, instrument, warn};

use crate::classify::{contains_money_amount, count_phrase_matches};
use crate::download::FileDownloader;
use crate::models::{ExtractedRecord, Field};
use crate::recency::{RecencyFilter, local_date_from_millis};
use crate::scrapers::RawResultItem;
use crate::utils::truncate_for_log;

/// Outcome of extracting one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Record(ExtractedRecord),
    /// Published before the cutoff; `date` is its `YYYY-MM-DD`.
    OutOfWindow { date: String },
}

/// Image URL and local file name derived from a proxied image `src`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub url: String,
    pub file_name: String,
}

/// Decode the real image URL carried after `url=` in a proxy `src` and name
/// the local file after its last path segment plus a literal `.jpeg`.
///
/// The suffix says nothing about the actual encoding of the image. Bytes
/// that do not decode to UTF-8 become U+FFFD.
pub fn image_target(src: &str) -> Option<ImageTarget> {
    let encoded = src.split("url=").nth(1)?;
    let decoded = urlencoding::decode_binary(encoded.as_bytes());
    let url = String::from_utf8_lossy(&decoded).into_owned();
    let segment = url.rsplit('/').next().unwrap_or_default();
    Some(ImageTarget {
        file_name: format!("{segment}.jpeg"),
        url,
    })
}

/// Builds [`ExtractedRecord`]s for one run's search phrase and window.
#[derive(Debug)]
pub struct ResultItemExtractor<D> {
    search_phrase: String,
    filter: RecencyFilter,
    downloader: D,
    images_dir: PathBuf,
}

impl<D: FileDownloader> ResultItemExtractor<D> {
    pub fn new(
        search_phrase: impl Into<String>,
        filter: RecencyFilter,
        downloader: D,
        images_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            search_phrase: search_phrase.into(),
            filter,
            downloader,
            images_dir: images_dir.into(),
        }
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn extract(&self, item: &RawResultItem) -> Extraction {
        let publication_date = match self.publication_date(item) {
            Field::Present(date) => {
                let verdict = self.filter.evaluate(date);
                if !verdict.in_window {
                    return Extraction::OutOfWindow { date: verdict.date };
                }
                Field::Present(verdict.date)
            }
            Field::Absent => Field::Absent,
        };

        let title = self.title(item);
        let description = self.description(item);
        let picture_file_name = self.picture(item).await;

        let title_text = match &title {
            Field::Present(t) => t.as_str(),
            Field::Absent => "",
        };
        let description_text = match &description {
            Field::Present(d) => d.as_str(),
            Field::Absent => "",
        };
        let search_phrase_matches =
            count_phrase_matches(&self.search_phrase, title_text, description_text);
        let contains_money = contains_money_amount(title_text, description_text);

        debug!(
            title = %truncate_for_log(title_text, 80),
            search_phrase_matches,
            contains_money,
            "Extracted result entry"
        );

        Extraction::Record(ExtractedRecord {
            title: title.into_option(),
            publication_date: publication_date.into_option(),
            description: description.into_option(),
            picture_file_name: picture_file_name.into_option(),
            search_phrase_matches,
            contains_money,
        })
    }

    fn title(&self, item: &RawResultItem) -> Field<String> {
        let title = Field::from(item.title());
        if !title.is_present() {
            warn!("Result entry has no title");
        }
        title
    }

    fn description(&self, item: &RawResultItem) -> Field<String> {
        let description = Field::from(item.description());
        if !description.is_present() {
            warn!("Result entry has no description");
        }
        description
    }

    fn publication_date(&self, item: &RawResultItem) -> Field<chrono::NaiveDate> {
        let Some(raw) = item.timestamp_attr() else {
            warn!("Result entry has no timestamp");
            return Field::Absent;
        };
        let millis = match raw.parse::<i64>() {
            Ok(millis) => millis,
            Err(e) => {
                error!(%raw, error = %e, "Result entry timestamp is not a number");
                return Field::Absent;
            }
        };
        match local_date_from_millis(millis) {
            Some(date) => Field::Present(date),
            None => {
                error!(millis, "Result entry timestamp is out of range");
                Field::Absent
            }
        }
    }

    /// Entries without an image have no picture. A download failure still
    /// records the file name.
    async fn picture(&self, item: &RawResultItem) -> Field<String> {
        let Some(src) = item.image_src() else {
            return Field::Absent;
        };
        let Some(target) = image_target(&src) else {
            error!(src = %truncate_for_log(&src, 200), "Could not decode image URL");
            return Field::Absent;
        };

        if let Err(e) = self
            .downloader
            .download(&target.url, &self.images_dir, &target.file_name)
            .await
        {
            error!(url = %target.url, error = %e, "Error while downloading image");
        }
        Field::Present(target.file_name)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Cutoff;
    use crate::scrapers::tests::entry_html;
    use chrono::{Local, TimeZone};
    use std::cell::RefCell;
    use std::error::Error;
    use std::path::Path;

    /// Records every download request; optionally fails all of them.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingDownloader {
        pub(crate) calls: RefCell<Vec<(String, String)>>,
        pub(crate) fail: bool,
    }

    impl FileDownloader for RecordingDownloader {
        async fn download(
            &self,
            url: &str,
            target_dir: &Path,
            file_name: &str,
        ) -> Result<PathBuf, Box<dyn Error>> {
            self.calls
                .borrow_mut()
                .push((url.to_string(), file_name.to_string()));
            if self.fail {
                return Err("404 Not Found".into());
            }
            Ok(target_dir.join(file_name))
        }
    }

    pub(crate) fn millis(y: i32, m: u32, d: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis()
    }

    /// Window starting September 2026.
    pub(crate) fn extractor(
        phrase: &str,
        downloader: RecordingDownloader,
    ) -> ResultItemExtractor<RecordingDownloader> {
        let filter = RecencyFilter::new(Cutoff { month: 9, year: 2026 });
        ResultItemExtractor::new(phrase, filter, downloader, "output/images")
    }

    const IMAGE_SRC: &str = "https://dims.apnews.com/dims4/default/8c1f/2147483647/strip/true/resize/599x337!/quality/90/?url=https%3A%2F%2Fassets.apnews.com%2F5e%2Fa1%2F0f0b6c7d%2Fap24123456789.jpg";

    #[test]
    fn test_image_target() {
        let target = image_target(IMAGE_SRC).unwrap();
        assert_eq!(
            target.url,
            "https://assets.apnews.com/5e/a1/0f0b6c7d/ap24123456789.jpg"
        );
        assert_eq!(target.file_name, "ap24123456789.jpg.jpeg");
    }

    #[test]
    fn test_image_target_without_proxy_param() {
        assert_eq!(image_target("https://example.com/a.png"), None);
    }

    #[test]
    fn test_image_target_invalid_utf8_is_replaced() {
        let target = image_target("x?url=https%3A%2F%2Fa.example%2Fph%FFoto").unwrap();
        assert_eq!(target.url, "https://a.example/ph\u{FFFD}oto");
        assert_eq!(target.file_name, "ph\u{FFFD}oto.jpeg");
    }

    #[test]
    fn test_image_target_trailing_slash() {
        let target = image_target("x?url=https%3A%2F%2Fa.example%2Fdir%2F").unwrap();
        assert_eq!(target.file_name, ".jpeg");
    }

    #[tokio::test]
    async fn test_extract_in_window_record() {
        let ex = extractor("rate", RecordingDownloader::default());
        let item = RawResultItem::from_html(&entry_html(
            Some("Fed holds rate steady"),
            Some("Rate cut of $25 billion? Not this time, rates stay."),
            Some(millis(2026, 10, 5)),
            Some(IMAGE_SRC),
        ));

        let Extraction::Record(record) = ex.extract(&item).await else {
            panic!("expected an in-window record");
        };
        assert_eq!(record.title.as_deref(), Some("Fed holds rate steady"));
        assert_eq!(record.publication_date.as_deref(), Some("2026-10-05"));
        assert_eq!(record.picture_file_name.as_deref(), Some("ap24123456789.jpg.jpeg"));
        assert_eq!(record.search_phrase_matches, 3);
        assert!(record.contains_money);
        assert_eq!(
            ex.downloader.calls.borrow().as_slice(),
            &[(
                "https://assets.apnews.com/5e/a1/0f0b6c7d/ap24123456789.jpg".to_string(),
                "ap24123456789.jpg.jpeg".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_extract_out_of_window_skips_download() {
        let ex = extractor("rate", RecordingDownloader::default());
        let item = RawResultItem::from_html(&entry_html(
            Some("Old news"),
            Some("From summer"),
            Some(millis(2026, 8, 31)),
            Some(IMAGE_SRC),
        ));

        assert_eq!(
            ex.extract(&item).await,
            Extraction::OutOfWindow {
                date: "2026-08-31".to_string()
            }
        );
        assert!(ex.downloader.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_extract_missing_fields_are_absent() {
        let ex = extractor("rate", RecordingDownloader::default());
        let item = RawResultItem::from_html(&entry_html(None, None, None, None));

        let Extraction::Record(record) = ex.extract(&item).await else {
            panic!("entries without a date are kept");
        };
        assert_eq!(
            record,
            ExtractedRecord {
                title: None,
                publication_date: None,
                description: None,
                picture_file_name: None,
                search_phrase_matches: 0,
                contains_money: false,
            }
        );
    }

    #[tokio::test]
    async fn test_extract_bad_timestamp_is_absent() {
        let ex = extractor("x", RecordingDownloader::default());
        let item = RawResultItem::from_html(
            r#"<div><div class="PagePromo-title">T</div><bsp-timestamp data-timestamp="soon"></bsp-timestamp></div>"#,
        );
        let Extraction::Record(record) = ex.extract(&item).await else {
            panic!("unparseable timestamps are recovered");
        };
        assert_eq!(record.publication_date, None);
        assert_eq!(record.title.as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_extract_download_failure_keeps_file_name() {
        let downloader = RecordingDownloader {
            fail: true,
            ..Default::default()
        };
        let ex = extractor("x", downloader);
        let item = RawResultItem::from_html(&entry_html(
            Some("T"),
            Some("D"),
            Some(millis(2026, 9, 1)),
            Some(IMAGE_SRC),
        ));

        let Extraction::Record(record) = ex.extract(&item).await else {
            panic!("expected a record");
        };
        assert_eq!(record.picture_file_name.as_deref(), Some("ap24123456789.jpg.jpeg"));
        assert_eq!(ex.downloader.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_extract_undecodable_image_is_absent() {
        let ex = extractor("x", RecordingDownloader::default());
        let item = RawResultItem::from_html(&entry_html(
            Some("T"),
            Some("D"),
            Some(millis(2026, 9, 1)),
            Some("https://example.com/plain.png"),
        ));
        let Extraction::Record(record) = ex.extract(&item).await else {
            panic!("expected a record");
        };
        assert_eq!(record.picture_file_name, None);
        assert!(ex.downloader.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_extract_is_repeatable() {
        let ex = extractor("holds", RecordingDownloader::default());
        let item = RawResultItem::from_html(&entry_html(
            Some("Fed holds rate steady"),
            Some("It holds."),
            Some(millis(2026, 10, 1)),
            Some(IMAGE_SRC),
        ));

        let first = ex.extract(&item).await;
        let second = ex.extract(&item).await;
        assert_eq!(first, second);
    }
}
