//! Idea Scout CLI — runs one scraping pass for an idea description and
//! prints the aggregated result as JSON.

use std::sync::Arc;

use idea_scout::config::ScraperConfig;
use idea_scout::modules::scraper::WebSearchScraper;
use idea_scout::{Config, Orchestrator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let idea_text = std::env::args().nth(1).unwrap_or_else(|| {
        "A subscription tracker that helps freelancers manage recurring invoices".to_string()
    });

    let mut orchestrator = Orchestrator::new(config.clone());
    orchestrator.register(Arc::new(WebSearchScraper::new(
        "ProductHunt",
        "https://www.producthunt.com/search",
        config.scrapers.clone(),
    )));
    orchestrator.register(Arc::new(WebSearchScraper::new(
        "G2",
        "https://www.g2.com/search",
        config.scrapers.clone(),
    )));

    tracing::info!(sources = ?orchestrator.list_sources(), "starting scrape");

    let result = orchestrator.scrape(&idea_text).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
