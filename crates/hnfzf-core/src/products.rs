use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One listing from the remote search-results page.
///
/// Every text field uses the empty string for "not found in markup"; a
/// listing is never dropped because a field is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Site-assigned SKU from the listing's `data-sku` attribute.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Thumbnail `src` exactly as it appears in the listing. May be relative,
    /// protocol-relative, or a resizing-proxy URL.
    pub thumbnail_url: String,
    /// Tracking redirect URL; the real product page is carried in its `url`
    /// query parameter.
    pub detail_url: String,
    /// Free-form price text, e.g. `"$478.00"`.
    pub price: String,
    pub fetched_at: DateTime<Utc>,
}

/// A [`ProductSummary`] with its resolved full-size images attached.
///
/// Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedProduct {
    #[serde(flatten)]
    pub summary: ProductSummary,
    /// Absolute image URLs, deduplicated, in discovery order.
    pub images: Vec<String>,
}

impl EnrichedProduct {
    #[must_use]
    pub fn new(summary: ProductSummary, images: Vec<String>) -> Self {
        Self { summary, images }
    }

    /// SKU of the underlying listing.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.summary.id
    }
}
