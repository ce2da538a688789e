//! Error handling for the scraping pipeline
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Structural failures that terminate a run.
///
/// Recoverable misses (an optional page region not found, a cookie banner
/// absent) never surface here; they are logged and degrade to empty results.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("no usable Chrome/Chromium could be started: {0}")]
    BrowserUnavailable(String),

    #[error("snapshot not found at {} (run `headlines fetch` first)", .0.display())]
    MissingSnapshot(PathBuf),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scraping operations
pub type Result<T> = anyhow::Result<T>;
