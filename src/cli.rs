//! Command-line interface definitions for Headline Harvest.
//!
//! Every option can also be supplied through an environment variable, which
//! is how unattended runners usually configure the tool.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one extraction run.
///
/// # Examples
///
/// ```sh
/// # Read the work item from output/work-items-in/test-input/work-item.json
/// headline_harvest
///
/// # Explicit work item and output directory, at most 20 pages
/// headline_harvest -w ./work-item.json -o ./artifacts --max-pages 20
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory for the report and downloaded images
    #[arg(short, long, env = "ROBOT_ARTIFACTS", default_value = "output")]
    pub output_dir: PathBuf,

    /// Fallback work-item JSON file [default: <output-dir>/work-items-in/test-input/work-item.json]
    #[arg(short, long)]
    pub work_item: Option<PathBuf>,

    /// Queued work-items file, consulted before the fallback file
    #[arg(long, env = "RPA_INPUT_WORKITEM_PATH")]
    pub queue_file: Option<PathBuf>,

    /// Report file name, created inside the output directory
    #[arg(short, long, default_value = "challenge.xlsx")]
    pub report_file: String,

    /// News site to search
    #[arg(long, env = "NEWS_BASE_URL", default_value = "https://apnews.com")]
    pub base_url: String,

    /// Stop after this many result pages even if the window has not ended
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Cli {
    pub fn work_item_path(&self) -> PathBuf {
        self.work_item.clone().unwrap_or_else(|| {
            self.output_dir
                .join("work-items-in")
                .join("test-input")
                .join("work-item.json")
        })
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_explicit_paths() {
        let cli = Cli::parse_from([
            "headline_harvest",
            "--output-dir",
            "/tmp/out",
            "--work-item",
            "./wi.json",
            "--report-file",
            "news.xlsx",
            "--max-pages",
            "5",
        ]);

        assert_eq!(cli.work_item_path(), PathBuf::from("./wi.json"));
        assert_eq!(cli.report_path(), PathBuf::from("/tmp/out/news.xlsx"));
        assert_eq!(cli.images_dir(), PathBuf::from("/tmp/out/images"));
        assert_eq!(cli.max_pages, Some(5));
    }

    #[test]
    fn test_cli_short_flags_and_defaults() {
        let cli = Cli::parse_from(["headline_harvest", "-o", "/tmp/art"]);

        assert_eq!(
            cli.work_item_path(),
            PathBuf::from("/tmp/art/work-items-in/test-input/work-item.json")
        );
        assert_eq!(cli.report_path(), PathBuf::from("/tmp/art/challenge.xlsx"));
        assert_eq!(cli.timeout_secs, 30);
        assert_eq!(cli.max_pages, None);
    }
}
