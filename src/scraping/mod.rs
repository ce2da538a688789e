//! Fetch stage: browser-driven capture of the dynamic page regions plus a
//! redundant plain-HTTP news list, persisted together as one raw snapshot.

pub mod browser;
pub mod homepage;
pub mod latest_news;

use std::path::PathBuf;

use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::snapshot;

/// Run the whole fetch stage: capture, assemble, persist, echo.
///
/// Returns the path of the written snapshot.
pub fn fetch_snapshot(config: &ScrapeConfig) -> Result<PathBuf> {
    let blocks = homepage::capture_dynamic_blocks(config)?;
    let redundant = latest_news::fetch_latest_news(config)?;

    let blob = snapshot::assemble(&blocks, &redundant);
    let path = config.snapshot_path();
    snapshot::write(&path, &blob)?;
    snapshot::echo_head(&path)?;
    Ok(path)
}
