//! Listing extraction from the SLI "resultspage" search endpoint.
//!
//! ## Observed markup
//!
//! Each product is a `.sli_ac_product` container carrying the SKU in
//! `data-sku`. Inside it:
//! - `.sli_ac_title`: product name (text)
//! - `.sli_ac_excerpt`: short description (text)
//! - `.sli_ac_image`: `<img>` whose `src` is usually a thumbnail-proxy URL
//! - `[data-role="main-link"]`: `<a>` whose `href` is a tracking redirect
//! - `.price`: formatted price text such as `"$478.00"`
//!
//! Any of these can be missing on a given listing. Missing values become
//! empty strings and the listing is still emitted.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use hnfzf_core::ProductSummary;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::client::{build_listing_client, fetch_html, ScraperConfig};
use crate::error::ScraperError;

static PRODUCT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sli_ac_product").expect("valid product selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sli_ac_title").expect("valid title selector"));
static EXCERPT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sli_ac_excerpt").expect("valid excerpt selector"));
static IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".sli_ac_image").expect("valid image selector"));
static MAIN_LINK_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-role="main-link"]"#).expect("valid main-link selector")
});
static PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".price").expect("valid price selector"));

/// Fetches one search-results page and parses it into [`ProductSummary`] values.
pub struct ListingExtractor {
    client: Client,
    search_base_url: String,
}

impl ListingExtractor {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_listing_client(config)?,
            search_base_url: config.search_base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Runs one search and returns every listing on the results page, in
    /// document order.
    ///
    /// Never fails on malformed markup; zero matching listings is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidSearchUrl`] if the configured base URL cannot
    ///   be parsed.
    /// - [`ScraperError::Http`] if the endpoint is unreachable or times out.
    /// - [`ScraperError::UnexpectedStatus`] on a non-2xx response.
    pub async fn extract_listings(
        &self,
        search_term: &str,
    ) -> Result<Vec<ProductSummary>, ScraperError> {
        let url = search_url(&self.search_base_url, search_term)?;
        let html = fetch_html(&self.client, &url).await?;
        let listings = parse_listings(&html, Utc::now());

        tracing::debug!(
            search_term,
            listings = listings.len(),
            "parsed search results page"
        );
        Ok(listings)
    }
}

/// Builds the search URL for `search_term`, percent-encoding the term.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidSearchUrl`] if `base_url` is not a valid URL.
pub(crate) fn search_url(base_url: &str, search_term: &str) -> Result<String, ScraperError> {
    let base = format!("{}/search", base_url.trim_end_matches('/'));
    let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidSearchUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;

    // Everything except `w` is fixed and selects "show products" mode.
    url.query_pairs_mut()
        .append_pair("ts", "rac-data")
        .append_pair("w", search_term)
        .append_pair("rt", "rac")
        .append_pair("dv", "o")
        .append_pair("strategy", "rac")
        .append_pair("showProducts", "true");

    Ok(url.to_string())
}

/// Parses a search-results document into summaries stamped with `fetched_at`.
#[must_use]
pub fn parse_listings(html: &str, fetched_at: DateTime<Utc>) -> Vec<ProductSummary> {
    let document = Html::parse_document(html);

    document
        .select(&PRODUCT_SEL)
        .map(|node| ProductSummary {
            id: node.value().attr("data-sku").map(str::trim).unwrap_or_default().to_owned(),
            name: first_text(node, &TITLE_SEL),
            description: first_text(node, &EXCERPT_SEL),
            thumbnail_url: first_attr(node, &IMAGE_SEL, "src"),
            detail_url: first_attr(node, &MAIN_LINK_SEL, "href"),
            price: first_text(node, &PRICE_SEL),
            fetched_at,
        })
        .collect()
}

/// Trimmed text of the first descendant matching `selector`. Inner
/// whitespace is kept as the page has it.
fn first_text(node: ElementRef<'_>, selector: &Selector) -> String {
    node.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_owned())
        .unwrap_or_default()
}

/// Trimmed `attr` of the first descendant matching `selector`.
fn first_attr(node: ElementRef<'_>, selector: &Selector, attr: &str) -> String {
    node.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::trim)
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
