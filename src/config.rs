//! Run configuration
//!
//! The original deployment hard-coded the page URL and every output path;
//! here both are invocation parameters with those values as defaults. File
//! names under the output directory stay fixed so the two stages always
//! agree on the handoff snapshot.

use std::path::{Path, PathBuf};

use anyhow::Context;
use reqwest::Url;

use crate::error::Result;

/// Page both fetch paths target by default.
pub const DEFAULT_URL: &str = "https://www.cnbc.com/world/?region=world";

/// Default root for the `raw/` and `processed/` output trees.
pub const DEFAULT_OUT_DIR: &str = "data";

/// Spoofed user agent, shared by the browser session and the plain HTTP GET.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/125.0 Safari/537.36";

const SNAPSHOT_FILE: &str = "web_data.html";
const MARKET_CSV_FILE: &str = "market_data.csv";
const NEWS_CSV_FILE: &str = "news_data.csv";

/// Resolved configuration shared by both pipeline stages.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Page to scrape; also the base for resolving relative links.
    pub url: Url,
    /// Root directory for all outputs.
    pub out_dir: PathBuf,
}

impl ScrapeConfig {
    pub fn new(url: &str, out_dir: impl Into<PathBuf>) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid page URL: {}", url))?;
        Ok(Self {
            url,
            out_dir: out_dir.into(),
        })
    }

    /// Raw HTML snapshot written by the fetch stage, read by extract.
    pub fn snapshot_path(&self) -> PathBuf {
        self.out_dir.join("raw").join(SNAPSHOT_FILE)
    }

    pub fn market_csv_path(&self) -> PathBuf {
        self.processed_dir().join(MARKET_CSV_FILE)
    }

    pub fn news_csv_path(&self) -> PathBuf {
        self.processed_dir().join(NEWS_CSV_FILE)
    }

    fn processed_dir(&self) -> PathBuf {
        self.out_dir.join("processed")
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL, DEFAULT_OUT_DIR).expect("default URL is valid")
    }
}

/// Well-known Chromium install locations probed before driver discovery.
pub const CHROMIUM_PATHS: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

/// First pre-installed Chromium binary that exists on disk, if any.
pub fn preinstalled_chromium() -> Option<&'static Path> {
    CHROMIUM_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
}
