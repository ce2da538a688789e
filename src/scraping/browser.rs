//! Headless Chrome startup with an ordered fallback ladder.
//!
//! Three strategies are tried in sequence, first success wins:
//! 1. a pre-installed Chromium binary at a well-known path,
//! 2. default executable discovery,
//! 3. a managed download into a local cache (cache wiped first so a stale
//!    or truncated download cannot poison the launch).
//!
//! Only when all three fail does the run abort.

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use headless_chrome::browser::default_executable;
use headless_chrome::browser::FetcherOptions;
use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, info, warn};

use crate::config::{preinstalled_chromium, USER_AGENT};
use crate::error::ScrapeError;

/// Start a browser session, working through the fallback ladder.
pub fn start_browser() -> Result<Browser> {
    if let Some(path) = preinstalled_chromium() {
        info!("Launching pre-installed Chromium at {}", path.display());
        match launch(Some(path.to_path_buf())) {
            Ok(browser) => return Ok(browser),
            Err(e) => warn!("Pre-installed Chromium failed to start: {:#}", e),
        }
    } else {
        debug!("No Chromium binary at any well-known path");
    }

    match default_executable() {
        Ok(path) => {
            info!("Launching Chrome found by default discovery: {}", path.display());
            match launch(Some(path)) {
                Ok(browser) => return Ok(browser),
                Err(e) => warn!("Discovered Chrome failed to start: {:#}", e),
            }
        }
        Err(e) => warn!("Default Chrome discovery failed: {}", e),
    }

    info!("Falling back to managed Chrome download");
    launch_managed().map_err(|e| ScrapeError::BrowserUnavailable(format!("{:#}", e)).into())
}

fn launch(path: Option<PathBuf>) -> Result<Browser> {
    let user_agent_arg = format!("--user-agent={}", USER_AGENT);
    let options = LaunchOptions {
        headless: true,
        sandbox: false, // May be needed on some systems
        path,
        args: common_args(&user_agent_arg),
        ..Default::default()
    };
    Browser::new(options).context("Failed to launch headless Chrome")
}

/// Strategy 3: let the fetcher download Chrome into our own cache directory.
fn launch_managed() -> Result<Browser> {
    let cache_dir = chrome_cache_dir()?;
    // A previous partial download is worse than no download; start clean.
    // A missing directory is fine.
    let _ = std::fs::remove_dir_all(&cache_dir);

    let user_agent_arg = format!("--user-agent={}", USER_AGENT);
    let options = LaunchOptions {
        headless: true,
        sandbox: false,
        args: common_args(&user_agent_arg),
        fetcher_options: FetcherOptions::default()
            .with_allow_download(true)
            .with_install_dir(Some(cache_dir)),
        ..Default::default()
    };
    Browser::new(options).context("Failed to launch downloaded Chrome")
}

fn common_args(user_agent_arg: &str) -> Vec<&OsStr> {
    vec![
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--window-size=1920,1080"),
        OsStr::new(user_agent_arg),
    ]
}

fn chrome_cache_dir() -> Result<PathBuf> {
    let cache_dir = dir_spec::cache_home()
        .ok_or_else(|| anyhow::anyhow!("Could not determine cache directory"))?;
    Ok(cache_dir.join("headlines").join("chrome"))
}
