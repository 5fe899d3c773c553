//! Thumbnail downloads.
//!
//! The extractor hands every decoded image URL to a [`FileDownloader`]. A
//! failed download is the caller's to log; it never stops the run.

use reqwest::Client;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Fetches a remote file into a local directory.
pub trait FileDownloader {
    /// Download `url` to `target_dir/file_name`, creating the directory if
    /// needed. Non-2xx responses are errors.
    async fn download(
        &self,
        url: &str,
        target_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, Box<dyn Error>>;
}

/// [`FileDownloader`] over a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl FileDownloader for HttpDownloader {
    #[instrument(level = "debug", skip_all, fields(%url, %file_name))]
    async fn download(
        &self,
        url: &str,
        target_dir: &Path,
        file_name: &str,
    ) -> Result<PathBuf, Box<dyn Error>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Downloaded image");

        write_file(target_dir, file_name, &bytes).await
    }
}

/// Write `bytes` to `target_dir/file_name`, creating `target_dir` first.
pub async fn write_file(
    target_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(target_dir).await?;
    let local_file = target_dir.join(file_name);
    fs::write(&local_file, bytes).await?;
    info!(path = %local_file.display(), "Saved image");
    Ok(local_file)
}
