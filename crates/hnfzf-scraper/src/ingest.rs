//! Ingestion: one search, then image resolution for every listing.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use hnfzf_core::{EnrichedProduct, ProductSummary};

use crate::client::ScraperConfig;
use crate::error::ScraperError;
use crate::images::ImageResolver;
use crate::listing::ListingExtractor;

/// Runs the full search → image-resolution pipeline.
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct Ingestor {
    listings: ListingExtractor,
    images: ImageResolver,
    max_concurrent_detail_fetches: usize,
}

impl Ingestor {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if either HTTP client cannot be built.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            listings: ListingExtractor::new(config)?,
            images: ImageResolver::new(config)?,
            max_concurrent_detail_fetches: config.max_concurrent_detail_fetches.max(1),
        })
    }

    /// Searches for `search_term` and resolves images for every listing.
    ///
    /// Output order always matches the listing order on the results page,
    /// whatever order the detail pages answer in.
    ///
    /// # Errors
    ///
    /// Fails only when the search request itself fails; see
    /// [`ListingExtractor::extract_listings`]. Per-listing image failures
    /// degrade that listing's `images` instead.
    pub async fn ingest(&self, search_term: &str) -> Result<Vec<EnrichedProduct>, ScraperError> {
        let started = Instant::now();
        let summaries = self.listings.extract_listings(search_term).await?;
        let images = self.resolve_all(&summaries).await;

        let products: Vec<EnrichedProduct> = summaries
            .into_iter()
            .zip(images)
            .map(|(summary, images)| EnrichedProduct::new(summary, images))
            .collect();

        tracing::info!(
            search_term,
            listings = products.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "ingestion complete"
        );
        Ok(products)
    }

    /// Resolves images for each summary through a pool of at most
    /// `max_concurrent_detail_fetches` in-flight resolutions. Results are
    /// written back by listing index, so slot `i` belongs to `summaries[i]`.
    async fn resolve_all(&self, summaries: &[ProductSummary]) -> Vec<Vec<String>> {
        let mut slots: Vec<Option<Vec<String>>> = vec![None; summaries.len()];
        let resolver = &self.images;

        let lookups: Vec<_> = summaries
            .iter()
            .enumerate()
            .map(|(index, summary)| async move {
                let images = resolver
                    .resolve_images(&summary.detail_url, &summary.thumbnail_url)
                    .await;
                (index, images)
            })
            .collect();
        let mut resolved =
            stream::iter(lookups).buffer_unordered(self.max_concurrent_detail_fetches);

        while let Some((index, images)) = resolved.next().await {
            slots[index] = Some(images);
        }

        slots.into_iter().map(Option::unwrap_or_default).collect()
    }
}
