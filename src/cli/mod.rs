use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_OUT_DIR, DEFAULT_URL};

#[derive(Parser)]
#[command(name = "headlines")]
#[command(
    version,
    about = "Scrape the CNBC World homepage into a raw HTML snapshot and CSV tables"
)]
#[command(
    long_about = "Two-stage scraping pipeline: `fetch` drives headless Chrome to capture the \
market ticker banner and latest-news list into one raw HTML snapshot, `extract` re-parses \
that snapshot into market_data.csv and news_data.csv."
)]
pub struct Cli {
    /// Page to scrape (also the base URL for resolving relative links)
    #[arg(long, global = true, default_value = DEFAULT_URL)]
    pub url: String,

    /// Output directory holding raw/ and processed/ subtrees
    #[arg(long = "out-dir", global = true, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Capture page regions with headless Chrome and save the raw snapshot
    Fetch,

    /// Parse the saved snapshot into market and news CSV files
    Extract,

    /// Fetch then extract in one invocation
    Run,
}
