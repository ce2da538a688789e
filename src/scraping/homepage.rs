//! Browser-driven capture of the dynamically rendered homepage regions.
//!
//! The market ticker banner and the latest-news list are rendered by page
//! scripts, so they only exist after a real browser has executed the page.
//! Both regions are optional: a miss degrades to an empty fragment and the
//! run continues.

use std::time::{Duration, Instant};

use anyhow::Context;
use headless_chrome::Tab;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::browser;
use crate::config::ScrapeConfig;
use crate::error::Result;

const COOKIE_BUTTON: &str = "#onetrust-accept-btn-handler";
const MARKET_SELECTORS: &[&str] = &["#market-data-scroll-container", ".MarketsBanner-marketData"];
const NEWS_LIST_SELECTOR: &str = "ul.LatestNews-list";

const COOKIE_WAIT: Duration = Duration::from_secs(5);
const REGION_WAIT: Duration = Duration::from_secs(8);
const PAGE_LOAD_WAIT: Duration = Duration::from_secs(30);

/// Fragments captured from the live page. Either may be empty when the
/// region could not be located; that is a recoverable miss, not an error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DynamicBlocks {
    pub markets_html: String,
    pub latest_html: String,
}

/// Open the page in a headless browser and capture both regions' outerHTML.
///
/// The browser session is torn down on every exit path when the handle
/// drops, including the error paths.
pub fn capture_dynamic_blocks(config: &ScrapeConfig) -> Result<DynamicBlocks> {
    let browser = browser::start_browser()?;
    let tab = browser
        .new_tab()
        .context("Failed to create new browser tab")?;

    info!("Navigating to {}", config.url);
    tab.navigate_to(config.url.as_str())
        .context("Failed to navigate to page")?;

    dismiss_cookie_banner(&tab);
    wait_for_page_load(&tab);

    run_scroll_script(&tab, "window.scrollTo(0, 0);");
    let mut markets_html = market_banner_html(&tab);
    if markets_html.is_empty() {
        debug!("Market banner not visible at top of page, scrolling down once");
        run_scroll_script(&tab, "window.scrollBy(0, 500);");
        markets_html = market_banner_html(&tab);
    }
    if markets_html.is_empty() {
        warn!("Market banner not found by any selector, keeping empty fragment");
    }

    let latest_html = latest_news_html(&tab);
    if latest_html.is_empty() {
        warn!("Latest-news list not found, keeping empty fragment");
    }

    Ok(DynamicBlocks {
        markets_html: fix_protocol_relative_links(&markets_html),
        latest_html: fix_protocol_relative_links(&latest_html),
    })
}

/// Accept the cookie consent overlay if it shows up. Absence or a timeout
/// is tolerated without failing the run.
fn dismiss_cookie_banner(tab: &Tab) {
    match tab.wait_for_element_with_custom_timeout(COOKIE_BUTTON, COOKIE_WAIT) {
        Ok(button) => match button.click() {
            Ok(_) => info!("Dismissed cookie consent overlay"),
            Err(e) => debug!("Cookie consent button did not take the click: {}", e),
        },
        Err(_) => debug!("No cookie consent overlay within {:?}", COOKIE_WAIT),
    }
}

/// Poll `document.readyState` until the page reports complete, bounded by
/// [`PAGE_LOAD_WAIT`]. A timeout is logged and capture proceeds anyway.
fn wait_for_page_load(tab: &Tab) {
    let deadline = Instant::now() + PAGE_LOAD_WAIT;
    loop {
        match tab.evaluate("document.readyState", false) {
            Ok(result) => {
                if result.value.as_ref().and_then(Value::as_str) == Some("complete") {
                    return;
                }
            }
            Err(e) => debug!("readyState probe failed: {}", e),
        }
        if Instant::now() >= deadline {
            warn!(
                "Page did not reach readyState=complete within {:?}",
                PAGE_LOAD_WAIT
            );
            return;
        }
        std::thread::sleep(Duration::from_millis(500));
    }
}

/// Market banner outerHTML: id selector, then class selector, then an
/// in-page query over both. Empty string when everything misses.
fn market_banner_html(tab: &Tab) -> String {
    for selector in MARKET_SELECTORS {
        match tab.wait_for_element_with_custom_timeout(selector, REGION_WAIT) {
            Ok(element) => match element.get_content() {
                Ok(html) => return html,
                Err(e) => debug!("Failed to read outerHTML for {}: {}", selector, e),
            },
            Err(_) => debug!("No element for {} within {:?}", selector, REGION_WAIT),
        }
    }
    query_outer_html(tab, &MARKET_SELECTORS.join(", "))
}

fn latest_news_html(tab: &Tab) -> String {
    match tab.wait_for_element_with_custom_timeout(NEWS_LIST_SELECTOR, PAGE_LOAD_WAIT) {
        Ok(element) => match element.get_content() {
            Ok(html) => return html,
            Err(e) => debug!("Failed to read outerHTML for news list: {}", e),
        },
        Err(_) => debug!("No news list within {:?}", PAGE_LOAD_WAIT),
    }
    query_outer_html(tab, NEWS_LIST_SELECTOR)
}

/// In-page `querySelector` fallback for when the element wait comes up dry.
fn query_outer_html(tab: &Tab, selector: &str) -> String {
    let script = format!(
        "(() => {{ const el = document.querySelector({:?}); return el ? el.outerHTML : \"\"; }})()",
        selector
    );
    match tab.evaluate(&script, false) {
        Ok(result) => match result.value {
            Some(Value::String(html)) => html,
            _ => String::new(),
        },
        Err(e) => {
            debug!("In-page query for {} failed: {}", selector, e);
            String::new()
        }
    }
}

fn run_scroll_script(tab: &Tab, script: &str) {
    if let Err(e) = tab.evaluate(script, false) {
        debug!("Scroll script failed: {}", e);
    }
}

/// Rewrite protocol-relative hyperlinks to explicit HTTPS.
pub(crate) fn fix_protocol_relative_links(html: &str) -> String {
    html.replace("href=\"//", "href=\"https://")
}
