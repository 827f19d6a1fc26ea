//! Full-size image resolution for a single listing.
//!
//! Two independent strategies run in a fixed order:
//! 1. thumbnail variants ([`thumbnail`]): no network, derived from the
//!    listing's thumbnail-proxy URL;
//! 2. detail-page gallery ([`gallery`]): one GET to the product page behind
//!    the listing's tracking redirect.
//!
//! Resolution never fails. A failed or timed-out detail fetch is logged and
//! the listing keeps whatever the thumbnail strategy produced.

mod gallery;
mod thumbnail;

use std::collections::HashSet;

use reqwest::Client;

use crate::client::{build_detail_client, extract_origin, fetch_html, ScraperConfig};
use crate::error::ScraperError;
use crate::unwrap::unwrap_query_url;

/// Query parameter carrying the real product page on tracking redirects.
const REDIRECT_PARAM: &str = "url";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateSource {
    ThumbnailVariant,
    DetailGallery,
}

#[derive(Debug, Clone)]
struct ImageCandidate {
    url: String,
    source: CandidateSource,
}

/// Resolves the full-size image set for listings.
pub struct ImageResolver {
    client: Client,
    listing_origin: String,
    cdn_hosts: Vec<String>,
}

impl ImageResolver {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the detail-page HTTP client cannot be
    /// built.
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_detail_client(config)?,
            listing_origin: extract_origin(&config.search_base_url),
            cdn_hosts: config.image_cdn_hosts.clone(),
        })
    }

    /// Absolute, deduplicated image URLs for one listing: thumbnail-derived
    /// candidates first, then detail-page gallery images.
    pub async fn resolve_images(&self, detail_url: &str, thumbnail_url: &str) -> Vec<String> {
        let mut candidates: Vec<ImageCandidate> =
            thumbnail::thumbnail_candidates(thumbnail_url, &self.listing_origin, &self.cdn_hosts)
                .into_iter()
                .map(|url| ImageCandidate {
                    url,
                    source: CandidateSource::ThumbnailVariant,
                })
                .collect();

        if let Some(destination) = detail_destination(detail_url) {
            match self.fetch_gallery(&destination).await {
                Ok(urls) => candidates.extend(urls.into_iter().map(|url| ImageCandidate {
                    url,
                    source: CandidateSource::DetailGallery,
                })),
                Err(e) => {
                    tracing::warn!(
                        destination = %destination,
                        error = %e,
                        "detail page image scrape failed, keeping thumbnail images"
                    );
                }
            }
        }

        let images = dedup_candidates(candidates);
        tracing::trace!(detail_url, images = images.len(), "resolved listing images");
        images
    }

    async fn fetch_gallery(&self, destination: &str) -> Result<Vec<String>, ScraperError> {
        let html = fetch_html(&self.client, destination).await?;
        Ok(gallery::gallery_candidates(
            &html,
            &extract_origin(destination),
        ))
    }
}

/// The product page behind a tracking redirect, or `None` when the detail URL
/// carries no usable `url` parameter.
fn detail_destination(detail_url: &str) -> Option<String> {
    if detail_url.trim().is_empty() {
        return None;
    }
    match unwrap_query_url(detail_url, REDIRECT_PARAM) {
        Ok(destination) => Some(destination),
        Err(e) => {
            tracing::debug!(detail_url, error = %e, "no detail page destination");
            None
        }
    }
}

/// Removes exact-string duplicates, keeping the first occurrence.
fn dedup_candidates(candidates: Vec<ImageCandidate>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut images = Vec::with_capacity(candidates.len());
    let mut gallery_dupes = 0usize;

    for candidate in candidates {
        if seen.insert(candidate.url.clone()) {
            images.push(candidate.url);
        } else if candidate.source == CandidateSource::DetailGallery {
            gallery_dupes += 1;
        }
    }

    if gallery_dupes > 0 {
        tracing::trace!(gallery_dupes, "dropped duplicate gallery images");
    }
    images
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(url: &str, source: CandidateSource) -> ImageCandidate {
        ImageCandidate {
            url: url.to_owned(),
            source,
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let got = dedup_candidates(vec![
            candidate("https://a/1.jpg", CandidateSource::ThumbnailVariant),
            candidate("https://a/2.jpg", CandidateSource::ThumbnailVariant),
            candidate("https://a/1.jpg", CandidateSource::DetailGallery),
            candidate("https://a/3.jpg", CandidateSource::DetailGallery),
            candidate("https://a/2.jpg", CandidateSource::DetailGallery),
            candidate("https://a/3.jpg", CandidateSource::DetailGallery),
        ]);
        assert_eq!(got, vec!["https://a/1.jpg", "https://a/2.jpg", "https://a/3.jpg"]);
    }

    #[test]
    fn dedup_is_exact_string_match() {
        let got = dedup_candidates(vec![
            candidate("https://a/1.jpg", CandidateSource::ThumbnailVariant),
            candidate("https://a/1.jpg?w=300&h=300", CandidateSource::ThumbnailVariant),
            candidate("https://A/1.jpg", CandidateSource::DetailGallery),
        ]);
        assert_eq!(got.len(), 3);
    }

    #[test]
    fn detail_destination_unwraps_redirect() {
        assert_eq!(
            detail_destination("https://track.example/r?url=https%3A%2F%2Fshop.example%2Fp.html")
                .as_deref(),
            Some("https://shop.example/p.html")
        );
    }

    #[test]
    fn detail_destination_absent_without_param() {
        assert_eq!(detail_destination("https://shop.example/p.html"), None);
        assert_eq!(detail_destination(""), None);
        assert_eq!(detail_destination("/r?url=%%%"), None);
    }
}
