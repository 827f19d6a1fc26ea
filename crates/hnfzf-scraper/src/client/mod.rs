//! HTTP clients and request profiles for the search and product-page fetches.

mod origin;

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::ScraperError;

pub use origin::{absolutize_url, extract_origin};

/// User agent sent to product detail pages. Retail sites commonly block
/// non-browser agents outright.
pub(crate) const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for the ingestion pipeline's outbound requests.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scheme and host of the listing search endpoint, without a trailing slash.
    pub search_base_url: String,
    /// Timeout for the listing search request.
    pub request_timeout_secs: u64,
    /// Timeout for each product detail-page request.
    pub detail_timeout_secs: u64,
    /// `User-Agent` for the listing search request.
    pub user_agent: String,
    /// Upper bound on detail pages fetched at once for one ingestion.
    pub max_concurrent_detail_fetches: usize,
    /// Host substrings identifying image CDNs that accept `w`/`h` resize params.
    pub image_cdn_hosts: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://harveynorman-au.resultspage.com".to_string(),
            request_timeout_secs: 30,
            detail_timeout_secs: 10,
            user_agent: "hnfzf/0.1 (product-search)".to_string(),
            max_concurrent_detail_fetches: 4,
            image_cdn_hosts: vec![
                "cdn.".to_string(),
                "imgix.net".to_string(),
                "harveynorman.com.au".to_string(),
            ],
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub fn from_app_config(config: &hnfzf_core::AppConfig) -> Self {
        Self {
            search_base_url: config.search_base_url.clone(),
            request_timeout_secs: config.scraper_request_timeout_secs,
            detail_timeout_secs: config.scraper_detail_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            max_concurrent_detail_fetches: config.scraper_max_concurrent_detail_fetches,
            image_cdn_hosts: config.image_cdn_hosts.clone(),
        }
    }
}

/// Builds the client used for the listing search request.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed (e.g., invalid TLS config).
pub(crate) fn build_listing_client(config: &ScraperConfig) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .user_agent(config.user_agent.as_str())
        .default_headers(listing_headers())
        .build()?;
    Ok(client)
}

/// Builds the client used for product detail pages, carrying a full
/// browser-like header profile.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed.
pub(crate) fn build_detail_client(config: &ScraperConfig) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.detail_timeout_secs))
        .connect_timeout(Duration::from_secs(
            CONNECT_TIMEOUT_SECS.min(config.detail_timeout_secs.max(1)),
        ))
        .user_agent(BROWSER_UA)
        .default_headers(browser_headers())
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

fn listing_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
    );
    headers
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-AU,en-US;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

/// GETs `url` and returns the body as text, mapping any non-2xx status to
/// [`ScraperError::UnexpectedStatus`].
///
/// # Errors
///
/// - [`ScraperError::Http`] on network, TLS, or timeout failure.
/// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String, ScraperError> {
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response.text().await?)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
