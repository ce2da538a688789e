use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::info;

use headlines::cli::{Cli, Commands};
use headlines::config::ScrapeConfig;
use headlines::{extract, scraping};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = ScrapeConfig::new(&cli.url, cli.out_dir)?;

    match cli.command {
        Commands::Fetch => handle_fetch(&config),
        Commands::Extract => handle_extract(&config),
        Commands::Run => {
            handle_fetch(&config)?;
            handle_extract(&config)
        }
    }
}

fn handle_fetch(config: &ScrapeConfig) -> Result<()> {
    info!("Fetching {}", config.url);
    let path = scraping::fetch_snapshot(config)?;
    println!(
        "\n{} Snapshot saved to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

fn handle_extract(config: &ScrapeConfig) -> Result<()> {
    let summary = extract::run(config)?;
    println!(
        "{} Market CSV created: {} ({} rows)",
        "✓".green().bold(),
        config.market_csv_path().display(),
        summary.markets
    );
    println!(
        "{} Latest news CSV created: {} ({} rows)",
        "✓".green().bold(),
        config.news_csv_path().display(),
        summary.news
    );
    Ok(())
}
