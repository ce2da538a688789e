//! Redundant plain-HTTP fetch of the latest-news list.
//!
//! Independent of the browser session: a direct GET of the same page parsed
//! statically. The items found here are rendered into a synthesized list
//! that is appended to the snapshot alongside the browser-captured
//! fragments.

use std::time::Duration;

use anyhow::Context;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use crate::config::{ScrapeConfig, USER_AGENT};
use crate::error::Result;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const LIST_SELECTOR: &str = "ul.LatestNews-list";
const LIST_CLASS_PATTERN: &str = "LatestNews-list";

/// One latest-news story. The timestamp may be empty; the link is always
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub timestamp: String,
    pub title: String,
    pub link: String,
}

/// GET the page over plain HTTP and pull the latest-news triples out of the
/// static markup. A non-success status is a structural failure; a missing
/// list degrades to an empty result.
pub fn fetch_latest_news(config: &ScrapeConfig) -> Result<Vec<NewsItem>> {
    info!("Fetching latest-news list over plain HTTP: {}", config.url);
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let body = client
        .get(config.url.clone())
        .header("User-Agent", USER_AGENT)
        .send()
        .with_context(|| format!("request failed for {}", config.url))?
        .error_for_status()
        .context("page returned an error status")?
        .text()
        .context("failed reading response body")?;

    let items = parse_latest_news(&body, &config.url)?;
    info!("Found {} latest-news item(s)", items.len());
    Ok(items)
}

/// Parse the page body into ordered `(timestamp, title, link)` triples.
pub fn parse_latest_news(html: &str, base: &Url) -> Result<Vec<NewsItem>> {
    let document = Html::parse_document(html);
    let list_sel = parse_selector(LIST_SELECTOR)?;
    let item_sel = parse_selector("li.LatestNews-item")?;
    let headline_sel = parse_selector("a.LatestNews-headline")?;
    let time_sel = parse_selector("time.LatestNews-timestamp")?;

    let list = document
        .select(&list_sel)
        .next()
        .or_else(|| find_list_by_class_pattern(&document));
    let Some(list) = list else {
        warn!("No latest-news list found in fetched page");
        return Ok(Vec::new());
    };

    let mut items = Vec::new();
    for item in list.select(&item_sel) {
        let Some(headline) = item.select(&headline_sel).next() else {
            continue;
        };
        let timestamp = item
            .select(&time_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let href = headline.value().attr("href").unwrap_or_default();
        items.push(NewsItem {
            timestamp,
            title: element_text(headline),
            link: absolutize(href, base),
        });
    }
    Ok(items)
}

/// Fallback for markup where the class list carries extra decoration: any
/// `ul` whose class attribute matches the pattern.
fn find_list_by_class_pattern(document: &Html) -> Option<ElementRef<'_>> {
    let ul_sel = Selector::parse("ul").ok()?;
    let pattern = Regex::new(LIST_CLASS_PATTERN).ok()?;
    document
        .select(&ul_sel)
        .find(|ul| ul.value().attr("class").is_some_and(|c| pattern.is_match(c)))
}

/// Normalize an href to an absolute URL: `//host/x` becomes explicit HTTPS,
/// everything else resolves against the page URL. Absolute links come back
/// unchanged; an unresolvable href is kept verbatim.
pub fn absolutize(href: &str, base: &Url) -> String {
    if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        match base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => href.to_string(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .ok()
        .with_context(|| format!("invalid selector: {}", selector))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
