//! Extract stage: flatten the raw snapshot into two CSV tables.
//!
//! The snapshot is re-parsed once; market cards and news items are selected
//! by the same class names the live page uses. Values are captured verbatim
//! as display strings, no numeric parsing or validation.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use csv::WriterBuilder;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};

const MARKET_CARD_SELECTOR: &str = "#market-data-scroll-container a.MarketCard-container";
const NEWS_ITEM_SELECTOR: &str = "ul.LatestNews-list li.LatestNews-item";

const MARKET_HEADER: [&str; 3] = ["symbol", "stock_pos", "change_pct"];
const NEWS_HEADER: [&str; 3] = ["timestamp", "title", "link"];

/// One market instrument from the ticker banner, captured verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketEntry {
    pub symbol: String,
    pub stock_pos: String,
    pub change_pct: String,
}

/// One news story from the latest-news list. The timestamp may be empty;
/// the href is written through exactly as it appears in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsEntry {
    pub timestamp: String,
    pub title: String,
    pub link: String,
}

/// Row counts reported back to the CLI.
#[derive(Debug, Clone, Copy)]
pub struct ExtractSummary {
    pub markets: usize,
    pub news: usize,
}

/// Parse the snapshot and write both CSV files, overwriting existing ones.
pub fn run(config: &ScrapeConfig) -> Result<ExtractSummary> {
    let html = read_snapshot(&config.snapshot_path())?;
    let document = Html::parse_document(&html);

    info!("Filtering market fields");
    let markets = extract_markets(&document)?;
    info!("Filtering latest news fields");
    let news = extract_news(&document)?;

    write_csv(&config.market_csv_path(), &MARKET_HEADER, &markets)?;
    write_csv(&config.news_csv_path(), &NEWS_HEADER, &news)?;

    Ok(ExtractSummary {
        markets: markets.len(),
        news: news.len(),
    })
}

/// Read the snapshot line-by-line and rejoin; a no-op beyond normalizing
/// line endings. A missing file is a structural failure.
pub fn read_snapshot(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ScrapeError::MissingSnapshot(path.to_path_buf()).into());
    }
    let file = File::open(path)
        .with_context(|| format!("failed to open snapshot {}", path.display()))?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.context("failed reading snapshot line")?);
    }
    Ok(lines.join("\n"))
}

/// Every market card under the banner container. A card missing any of the
/// three sub-fields is skipped entirely, never partially written.
pub fn extract_markets(document: &Html) -> Result<Vec<MarketEntry>> {
    let card_sel = parse_selector(MARKET_CARD_SELECTOR)?;
    let symbol_sel = parse_selector(".MarketCard-symbol")?;
    let position_sel = parse_selector(".MarketCard-stockPosition")?;
    let change_sel = parse_selector(".MarketCard-changesPct")?;

    let mut entries = Vec::new();
    for card in document.select(&card_sel) {
        let symbol = first_text(card, &symbol_sel);
        let stock_pos = first_text(card, &position_sel);
        let change_pct = first_text(card, &change_sel);
        match (symbol, stock_pos, change_pct) {
            (Some(symbol), Some(stock_pos), Some(change_pct)) => entries.push(MarketEntry {
                symbol,
                stock_pos,
                change_pct,
            }),
            _ => warn!("Skipping market card with missing sub-fields"),
        }
    }
    Ok(entries)
}

/// Every news item under the latest-news list. Only the headline link is
/// required; the timestamp defaults to empty.
pub fn extract_news(document: &Html) -> Result<Vec<NewsEntry>> {
    let item_sel = parse_selector(NEWS_ITEM_SELECTOR)?;
    let headline_sel = parse_selector("a.LatestNews-headline")?;
    let time_sel = parse_selector(".LatestNews-timestamp")?;

    let mut entries = Vec::new();
    for item in document.select(&item_sel) {
        let Some(headline) = item.select(&headline_sel).next() else {
            continue;
        };
        let timestamp = first_text(item, &time_sel).unwrap_or_default();
        let link = headline
            .value()
            .attr("href")
            .unwrap_or_default()
            .to_string();
        entries.push(NewsEntry {
            timestamp,
            title: element_text(headline),
            link,
        });
    }
    Ok(entries)
}

/// Write header plus rows in extraction order, overwriting the file. The
/// header goes out even when there are zero rows.
fn write_csv<T: Serialize>(path: &Path, header: &[&str; 3], rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} row(s) to {}", rows.len(), path.display());
    Ok(())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .ok()
        .with_context(|| format!("invalid selector: {}", selector))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(element_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const SNAPSHOT: &str = r#"<div id="market-data-scroll-container">
  <a class="MarketCard-container" href="https://www.cnbc.com/quotes/.DJI">
    <span class="MarketCard-symbol">DJIA</span>
    <span class="MarketCard-stockPosition">45,631.74</span>
    <span class="MarketCard-changesPct">+1.89%</span>
  </a>
  <a class="MarketCard-container" href="https://www.cnbc.com/quotes/.SPX">
    <span class="MarketCard-symbol">S&amp;P 500</span>
    <span class="MarketCard-stockPosition">6,466.91</span>
    <span class="MarketCard-changesPct">-0.43%</span>
  </a>
  <a class="MarketCard-container" href="https://www.cnbc.com/quotes/.IXIC">
    <span class="MarketCard-symbol">NASDAQ</span>
    <span class="MarketCard-stockPosition">21,496.53</span>
  </a>
</div>
<ul class="LatestNews-list">
  <li class="LatestNews-item">
    <time class="LatestNews-timestamp">22 Min Ago</time>
    <a class="LatestNews-headline" href="https://www.cnbc.com/2025/08/25/wrap.html">Markets wrap</a>
  </li>
  <li class="LatestNews-item">
    <a class="LatestNews-headline" href="/x">Title</a>
  </li>
  <li class="LatestNews-item">
    <span>no headline here</span>
  </li>
</ul>"#;

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn market_cards_require_all_three_fields() {
        let markets = extract_markets(&parse(SNAPSHOT)).unwrap();
        assert_eq!(markets.len(), 2);
        assert_eq!(
            markets[0],
            MarketEntry {
                symbol: "DJIA".to_string(),
                stock_pos: "45,631.74".to_string(),
                change_pct: "+1.89%".to_string(),
            }
        );
        // NASDAQ card has no change percent and is excluded entirely
        assert!(markets.iter().all(|m| m.symbol != "NASDAQ"));
    }

    #[test]
    fn entity_text_is_decoded() {
        let markets = extract_markets(&parse(SNAPSHOT)).unwrap();
        assert_eq!(markets[1].symbol, "S&P 500");
    }

    #[test]
    fn news_requires_only_the_headline() {
        let news = extract_news(&parse(SNAPSHOT)).unwrap();
        assert_eq!(news.len(), 2);
        assert_eq!(news[0].timestamp, "22 Min Ago");
        assert_eq!(news[1].timestamp, "");
        assert_eq!(news[1].title, "Title");
    }

    #[test]
    fn news_hrefs_pass_through_verbatim() {
        let news = extract_news(&parse(SNAPSHOT)).unwrap();
        assert_eq!(news[0].link, "https://www.cnbc.com/2025/08/25/wrap.html");
        assert_eq!(news[1].link, "/x");
    }

    #[test]
    fn zero_cards_yield_header_only_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_data.csv");
        let rows: Vec<MarketEntry> = Vec::new();
        write_csv(&path, &MARKET_HEADER, &rows).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "symbol,stock_pos,change_pct\n"
        );
    }

    #[test]
    fn single_card_yields_single_row() {
        let html = r#"<div id="market-data-scroll-container">
            <a class="MarketCard-container">
              <span class="MarketCard-symbol">AAPL</span>
              <span class="MarketCard-stockPosition">152.30</span>
              <span class="MarketCard-changesPct">+1.2%</span>
            </a></div>"#;
        let markets = extract_markets(&parse(html)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("market_data.csv");
        write_csv(&path, &MARKET_HEADER, &markets).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "symbol,stock_pos,change_pct\nAAPL,152.30,+1.2%\n"
        );
    }

    #[test]
    fn news_row_with_empty_timestamp_serializes_with_leading_comma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news_data.csv");
        let rows = vec![NewsEntry {
            timestamp: String::new(),
            title: "Title".to_string(),
            link: "/x".to_string(),
        }];
        write_csv(&path, &NEWS_HEADER, &rows).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "timestamp,title,link\n,Title,/x\n"
        );
    }

    #[test]
    fn read_snapshot_normalizes_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web_data.html");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"<ul>\r\n<li>a</li>\r\n</ul>").unwrap();
        drop(file);
        assert_eq!(read_snapshot(&path).unwrap(), "<ul>\n<li>a</li>\n</ul>");
    }

    #[test]
    fn missing_snapshot_is_a_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapeConfig::new("https://example.com/", dir.path()).unwrap();
        let err = run(&config).unwrap_err();
        assert!(err.to_string().contains("snapshot not found"));
    }

    #[test]
    fn extract_is_idempotent_over_an_unchanged_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapeConfig::new("https://example.com/", dir.path()).unwrap();
        crate::snapshot::write(&config.snapshot_path(), SNAPSHOT).unwrap();

        run(&config).unwrap();
        let market_first = fs::read(config.market_csv_path()).unwrap();
        let news_first = fs::read(config.news_csv_path()).unwrap();

        run(&config).unwrap();
        assert_eq!(fs::read(config.market_csv_path()).unwrap(), market_first);
        assert_eq!(fs::read(config.news_csv_path()).unwrap(), news_first);
    }

    #[test]
    fn summary_reports_row_counts() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScrapeConfig::new("https://example.com/", dir.path()).unwrap();
        crate::snapshot::write(&config.snapshot_path(), SNAPSHOT).unwrap();
        let summary = run(&config).unwrap();
        assert_eq!(summary.markets, 2);
        assert_eq!(summary.news, 2);
    }
}
