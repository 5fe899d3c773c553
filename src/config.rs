//! Work-item input.
//!
//! The search parameters arrive as a JSON work item. A queued item wins when
//! one is available; otherwise a local JSON file is read.
//!
//! # Queue file
//!
//! An array of items, each carrying a `payload` object:
//!
//! ```json
//! [{ "payload": { "search_phrase": "inflation", "news_category": "Stories", "month_range": 2 } }]
//! ```
//!
//! The first item with a non-empty payload is used.
//!
//! # Fallback file
//!
//! A single payload object with the same three keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Parameters of one extraction run. Read once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchCriteria {
    pub search_phrase: String,
    pub news_category: String,
    /// Months to look back, counting the current one. Values below 1 mean
    /// "current month only".
    pub month_range: i64,
}

#[derive(Debug, Deserialize)]
struct QueuedItem {
    #[serde(default)]
    payload: Value,
}

/// Criteria from the first queued item with a non-empty payload.
pub fn queued_payload(contents: &str) -> Result<Option<SearchCriteria>, Box<dyn Error>> {
    let items: Vec<QueuedItem> = serde_json::from_str(contents)?;
    let payload = items.into_iter().map(|item| item.payload).find(|payload| match payload {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });

    match payload {
        Some(payload) => Ok(Some(serde_json::from_value(payload)?)),
        None => Ok(None),
    }
}

/// Load the run's criteria from the queue file, falling back to `fallback`.
///
/// An unreadable or empty queue is logged and skipped. A missing or malformed
/// fallback file is fatal.
#[instrument(level = "info", skip_all, fields(fallback = %fallback.display()))]
pub async fn load_work_item(
    queue_file: Option<&Path>,
    fallback: &Path,
) -> Result<SearchCriteria, Box<dyn Error>> {
    let queued = match queue_file {
        Some(path) => match fs::read_to_string(path).await {
            Ok(contents) => match queued_payload(&contents) {
                Ok(found) => found,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Queued work item is malformed; using fallback file");
                    None
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read work item queue; using fallback file");
                None
            }
        },
        None => None,
    };

    let criteria = match queued {
        Some(criteria) => criteria,
        None => {
            let contents = fs::read_to_string(fallback).await?;
            serde_json::from_str::<SearchCriteria>(&contents)?
        }
    };

    if criteria.search_phrase.trim().is_empty() {
        warn!("Search phrase is empty; phrase match counts will all be 0");
    }
    info!(
        search_phrase = %criteria.search_phrase,
        news_category = %criteria.news_category,
        month_range = criteria.month_range,
        "Loaded work item"
    );
    Ok(criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str =
        r#"{"search_phrase": "inflation", "news_category": "Stories", "month_range": 2}"#;

    fn expected() -> SearchCriteria {
        SearchCriteria {
            search_phrase: "inflation".to_string(),
            news_category: "Stories".to_string(),
            month_range: 2,
        }
    }

    #[test]
    fn test_queued_payload_first_non_empty() {
        let queue = format!(r#"[{{"payload": null}}, {{"payload": {{}}}}, {{"payload": {PAYLOAD}}}]"#);
        assert_eq!(queued_payload(&queue).unwrap(), Some(expected()));
    }

    #[test]
    fn test_queued_payload_none_available() {
        assert_eq!(queued_payload("[]").unwrap(), None);
        assert_eq!(queued_payload(r#"[{"files": {}}]"#).unwrap(), None);
    }

    #[test]
    fn test_queued_payload_missing_key_is_error() {
        let queue = r#"[{"payload": {"search_phrase": "x"}}]"#;
        assert!(queued_payload(queue).is_err());
    }

    #[test]
    fn test_negative_month_range_is_accepted() {
        let criteria: SearchCriteria = serde_json::from_str(
            r#"{"search_phrase": "a", "news_category": "b", "month_range": -1}"#,
        )
        .unwrap();
        assert_eq!(criteria.month_range, -1);
    }

    #[tokio::test]
    async fn test_load_work_item_prefers_queue() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = tmp.path().join("queue.json");
        let fallback = tmp.path().join("work-item.json");
        std::fs::write(&queue, format!(r#"[{{"payload": {PAYLOAD}}}]"#)).unwrap();
        std::fs::write(
            &fallback,
            r#"{"search_phrase": "other", "news_category": "Videos", "month_range": 0}"#,
        )
        .unwrap();

        let criteria = load_work_item(Some(&queue), &fallback).await.unwrap();
        assert_eq!(criteria, expected());
    }

    #[tokio::test]
    async fn test_load_work_item_falls_back_to_file() {
        let tmp = tempfile::tempdir().unwrap();
        let fallback = tmp.path().join("work-item.json");
        std::fs::write(&fallback, PAYLOAD).unwrap();

        let missing_queue = tmp.path().join("absent.json");
        let criteria = load_work_item(Some(&missing_queue), &fallback).await.unwrap();
        assert_eq!(criteria, expected());

        let criteria = load_work_item(None, &fallback).await.unwrap();
        assert_eq!(criteria, expected());
    }

    #[tokio::test]
    async fn test_load_work_item_without_any_source_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_work_item(None, &tmp.path().join("missing.json")).await;
        assert!(result.is_err());
    }
}
