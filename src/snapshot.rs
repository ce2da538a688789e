//! Raw snapshot assembly and persistence.
//!
//! The snapshot is fragment soup: the browser-captured market banner and
//! news list, then a synthesized `<ul>` rendered from the plain-HTTP news
//! triples, all joined by newlines. Written once per fetch, read once per
//! extract.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::error::Result;
use crate::scraping::homepage::DynamicBlocks;
use crate::scraping::latest_news::NewsItem;

/// Number of snapshot lines echoed to stdout after a write.
const ECHO_LINES: usize = 10;

/// Concatenate the captured fragments into the snapshot blob. Empty
/// fragments are dropped; the synthesized list is only rendered when the
/// redundant fetch produced items.
pub fn assemble(blocks: &DynamicBlocks, redundant: &[NewsItem]) -> String {
    let mut pieces: Vec<String> = Vec::new();
    if !blocks.markets_html.is_empty() {
        pieces.push(blocks.markets_html.clone());
    }
    if !blocks.latest_html.is_empty() {
        pieces.push(blocks.latest_html.clone());
    }
    if !redundant.is_empty() {
        pieces.push("<ul>".to_string());
        for item in redundant {
            pieces.push(format!(
                "<li>{} — <a href='{}'>{}</a></li>",
                escape_html(&item.timestamp),
                escape_html(&item.link),
                escape_html(&item.title),
            ));
        }
        pieces.push("</ul>".to_string());
    }
    pieces.join("\n")
}

/// Minimal HTML escaping for text interpolated into the synthesized list.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Write the snapshot UTF-8, creating parent directories as needed.
pub fn write(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    info!(
        "Snapshot written to {} ({} bytes)",
        path.display(),
        contents.len()
    );
    Ok(())
}

/// Echo the first lines of the written file to stdout as a sanity check.
pub fn echo_head(path: &Path) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("failed to reopen snapshot {}", path.display()))?;
    for line in BufReader::new(file).lines().take(ECHO_LINES) {
        println!("{}", line.context("failed reading snapshot line")?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(timestamp: &str, title: &str, link: &str) -> NewsItem {
        NewsItem {
            timestamp: timestamp.to_string(),
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    #[test]
    fn assemble_joins_fragments_with_newlines() {
        let blocks = DynamicBlocks {
            markets_html: "<div id=\"market-data-scroll-container\"></div>".to_string(),
            latest_html: "<ul class=\"LatestNews-list\"></ul>".to_string(),
        };
        let blob = assemble(&blocks, &[]);
        assert_eq!(
            blob,
            "<div id=\"market-data-scroll-container\"></div>\n<ul class=\"LatestNews-list\"></ul>"
        );
    }

    #[test]
    fn empty_fragments_are_dropped() {
        let blocks = DynamicBlocks {
            markets_html: String::new(),
            latest_html: "<ul></ul>".to_string(),
        };
        assert_eq!(assemble(&blocks, &[]), "<ul></ul>");
        assert_eq!(assemble(&DynamicBlocks::default(), &[]), "");
    }

    #[test]
    fn synthesized_list_renders_one_li_per_item() {
        let items = vec![
            item("22 Min Ago", "Markets wrap", "https://www.cnbc.com/a"),
            item("", "No time", "https://www.cnbc.com/b"),
        ];
        let blob = assemble(&DynamicBlocks::default(), &items);
        let lines: Vec<&str> = blob.lines().collect();
        assert_eq!(lines[0], "<ul>");
        assert_eq!(
            lines[1],
            "<li>22 Min Ago — <a href='https://www.cnbc.com/a'>Markets wrap</a></li>"
        );
        assert_eq!(
            lines[2],
            "<li> — <a href='https://www.cnbc.com/b'>No time</a></li>"
        );
        assert_eq!(lines[3], "</ul>");
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let items = vec![item(
            "now",
            "S&P 500 <up>",
            "https://www.cnbc.com/q?a=1&b='2'",
        )];
        let blob = assemble(&DynamicBlocks::default(), &items);
        assert!(blob.contains("S&amp;P 500 &lt;up&gt;"));
        assert!(blob.contains("href='https://www.cnbc.com/q?a=1&amp;b=&#x27;2&#x27;'"));
        assert!(!blob.contains("<up>"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw").join("web_data.html");
        write(&path, "<ul></ul>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<ul></ul>");
    }

    #[test]
    fn write_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("web_data.html");
        write(&path, "first").unwrap();
        write(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }
}
