//! Full-size image discovery on a product detail page.
//!
//! Gallery markup varies between retail themes and changes without notice,
//! so the probing is driven by [`GALLERY_RULES`]: an ordered table of CSS
//! selectors, each with the attributes to read from matched nodes in
//! priority order. Updating the table does not touch the scan logic.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::client::absolutize_url;

/// Where to read an image URL from on a matched node.
#[derive(Debug, Clone, Copy)]
pub(super) enum ImageAttr {
    /// A responsive source set; the largest declared entry wins.
    SrcSet(&'static str),
    /// A single URL attribute.
    Url(&'static str),
}

#[derive(Debug)]
pub(super) struct GalleryRule {
    pub selector: &'static str,
    pub attrs: &'static [ImageAttr],
}

const IMG_ATTRS: &[ImageAttr] = &[
    ImageAttr::SrcSet("srcset"),
    ImageAttr::SrcSet("data-srcset"),
    ImageAttr::Url("data-zoom-image"),
    ImageAttr::Url("data-full"),
    ImageAttr::Url("data-src"),
    ImageAttr::Url("data-lazy-src"),
    ImageAttr::Url("src"),
];

const ANCHOR_ATTRS: &[ImageAttr] = &[ImageAttr::Url("data-zoom-image"), ImageAttr::Url("href")];

const META_ATTRS: &[ImageAttr] = &[ImageAttr::Url("content")];

/// Probed in order; every rule contributes.
pub(super) const GALLERY_RULES: &[GalleryRule] = &[
    GalleryRule {
        selector: "[data-gallery-role='gallery'] img",
        attrs: IMG_ATTRS,
    },
    GalleryRule {
        selector: ".fotorama__stage img, .fotorama__img",
        attrs: IMG_ATTRS,
    },
    GalleryRule {
        selector: ".product-gallery img, .product-image-gallery img, .product-media img",
        attrs: IMG_ATTRS,
    },
    GalleryRule {
        selector: ".product-gallery a[data-zoom-image], .gallery-image a[href$='.jpg']",
        attrs: ANCHOR_ATTRS,
    },
    GalleryRule {
        selector: ".image-carousel img, .carousel-item img, .slick-slide img",
        attrs: IMG_ATTRS,
    },
    GalleryRule {
        selector: ".swiper-slide img, .swiper-wrapper picture source",
        attrs: IMG_ATTRS,
    },
    GalleryRule {
        selector: "meta[property='og:image']",
        attrs: META_ATTRS,
    },
];

/// Case-insensitive URL substrings marking site chrome rather than product
/// photos.
const NON_PRODUCT_MARKERS: [&str; 4] = ["placeholder", "icon", "logo", "spinner"];

static COMPILED_RULES: LazyLock<Vec<(Selector, &'static [ImageAttr])>> = LazyLock::new(|| {
    GALLERY_RULES
        .iter()
        .map(|rule| {
            let selector = Selector::parse(rule.selector).expect("valid gallery selector");
            (selector, rule.attrs)
        })
        .collect()
});

static DESCRIPTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)[wWxX]$").expect("valid srcset descriptor regex")
});

/// Image URLs found on a detail page, absolute against `page_origin`, with
/// non-product imagery removed. May contain duplicates; the resolver dedups.
pub(super) fn gallery_candidates(html: &str, page_origin: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for (selector, attrs) in COMPILED_RULES.iter() {
        for node in document.select(selector) {
            let element = node.value();
            // The first attribute that yields a usable image wins, so a
            // placeholder in `srcset` falls through to `data-src` or `src`.
            let url = attrs.iter().find_map(|attr| {
                let raw = match *attr {
                    ImageAttr::SrcSet(name) => element.attr(name).and_then(largest_srcset_entry)?,
                    ImageAttr::Url(name) => element
                        .attr(name)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())?
                        .to_owned(),
                };
                if raw.to_ascii_lowercase().starts_with("data:") {
                    return None;
                }
                absolutize_url(page_origin, &raw).filter(|url| is_product_image(url))
            });

            if let Some(url) = url {
                candidates.push(url);
            }
        }
    }

    candidates
}

/// URL of the entry with the largest width/density descriptor.
///
/// Entries are split the way browsers split `srcset`: a URL runs to the next
/// whitespace, so commas inside a URL (`w_400,h_400`) stay part of it. A URL
/// ending in commas closes its entry. Entries without a descriptor count as
/// `1x`; entries with an unparseable descriptor are skipped. Ties keep the
/// earliest entry.
fn largest_srcset_entry(srcset: &str) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, after) = rest.split_at(url_end);
        let url = token.trim_end_matches(',');

        let descriptor = if url.len() < token.len() {
            rest = after;
            ""
        } else {
            let desc_end = after.find(',').unwrap_or(after.len());
            rest = &after[desc_end..];
            after[..desc_end].trim()
        };

        if url.is_empty() {
            continue;
        }
        let size = if descriptor.is_empty() {
            1.0
        } else {
            match DESCRIPTOR_RE
                .captures(descriptor)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
            {
                Some(size) => size,
                None => continue,
            }
        };

        if best.is_none_or(|(best_size, _)| size > best_size) {
            best = Some((size, url));
        }
    }

    best.map(|(_, url)| url.to_owned())
}

fn is_product_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    !NON_PRODUCT_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
