//! `ingest`: one live search, printed as the API would return it.

use std::time::Instant;

use hnfzf_scraper::{Ingestor, ScraperConfig};

pub(crate) async fn run_ingest(
    term: &str,
    search_base_url: Option<String>,
    max_concurrent: Option<usize>,
) -> anyhow::Result<()> {
    let config = scraper_config(search_base_url, max_concurrent);
    let ingestor = Ingestor::new(&config)?;

    let started = Instant::now();
    let products = ingestor.ingest(term).await?;
    let elapsed = started.elapsed();

    println!("{}", serde_json::to_string_pretty(&products)?);
    eprintln!(
        "\n{} listings for '{term}' in {}ms",
        products.len(),
        elapsed.as_millis()
    );
    Ok(())
}

fn scraper_config(search_base_url: Option<String>, max_concurrent: Option<usize>) -> ScraperConfig {
    let defaults = ScraperConfig::default();
    ScraperConfig {
        search_base_url: search_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.search_base_url.clone()),
        max_concurrent_detail_fetches: max_concurrent
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrent_detail_fetches),
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scraper_config_keeps_defaults_without_overrides() {
        let config = scraper_config(None, None);
        let defaults = ScraperConfig::default();
        assert_eq!(config.search_base_url, defaults.search_base_url);
        assert_eq!(
            config.max_concurrent_detail_fetches,
            defaults.max_concurrent_detail_fetches
        );
    }

    #[test]
    fn scraper_config_applies_overrides() {
        let config = scraper_config(Some("http://127.0.0.1:9000/".to_string()), Some(2));
        assert_eq!(config.search_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.max_concurrent_detail_fetches, 2);
    }

    #[test]
    fn scraper_config_ignores_zero_concurrency() {
        let config = scraper_config(None, Some(0));
        assert_eq!(
            config.max_concurrent_detail_fetches,
            ScraperConfig::default().max_concurrent_detail_fetches
        );
    }
}
