//! Headlines - CNBC World homepage scraper
//!
//! Two-stage pipeline: a headless-browser fetch stage that persists selected
//! page regions as one raw HTML snapshot, and an extract stage that re-parses
//! the snapshot and flattens market cards and latest-news items into CSV.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod scraping;
pub mod snapshot;
