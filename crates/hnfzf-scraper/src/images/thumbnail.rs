//! Image candidates derived from a listing's thumbnail URL alone.
//!
//! The search endpoint serves thumbnails through a resizing proxy of the form
//! `//<proxy>/thumb.php?f=<encoded origin image URL>&s=<size>`. The origin
//! image is the useful asset; when it lives on a CDN that honours `w`/`h`
//! query parameters, a few fixed renditions are synthesized from it.

use crate::client::absolutize_url;
use crate::unwrap::{unwrap_query_url, UnwrapError};

/// Query parameter carrying the origin image on thumbnail-proxy URLs.
const PROXY_PARAM: &str = "f";

/// Square renditions requested from CDNs that accept resize parameters,
/// smallest first.
pub(super) const SIZE_PRESETS: [u32; 3] = [300, 600, 1200];

/// Candidates from the thumbnail URL, in emission order.
///
/// `listing_origin` resolves root-relative thumbnails. An empty or
/// unresolvable thumbnail yields no candidates.
pub(super) fn thumbnail_candidates(
    thumbnail_url: &str,
    listing_origin: &str,
    cdn_hosts: &[String],
) -> Vec<String> {
    let Some(thumbnail) = absolutize_url(listing_origin, thumbnail_url) else {
        return Vec::new();
    };

    let origin_image = match unwrap_query_url(&thumbnail, PROXY_PARAM) {
        Ok(url) => url,
        Err(UnwrapError::MissingParam(_)) => return vec![thumbnail],
        Err(e) => {
            tracing::debug!(
                thumbnail_url,
                error = %e,
                "thumbnail proxy parameter unusable, keeping proxy URL"
            );
            return vec![thumbnail];
        }
    };

    let mut candidates = vec![origin_image.clone()];
    if is_resizable_cdn(&origin_image, cdn_hosts) {
        candidates.extend(
            SIZE_PRESETS
                .iter()
                .filter_map(|&size| sized_variant(&origin_image, size)),
        );
    }
    candidates
}

/// `true` when the URL's host contains any configured CDN marker.
fn is_resizable_cdn(url: &str, cdn_hosts: &[String]) -> bool {
    let Some(host) = reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
    else {
        return false;
    };
    cdn_hosts
        .iter()
        .any(|marker| !marker.is_empty() && host.contains(&marker.to_ascii_lowercase()))
}

/// `<url without query or fragment>?w=<size>&h=<size>`.
fn sized_variant(url: &str, size: u32) -> Option<String> {
    let mut variant = reqwest::Url::parse(url).ok()?;
    variant.set_query(None);
    variant.set_fragment(None);
    let size = size.to_string();
    variant
        .query_pairs_mut()
        .append_pair("w", &size)
        .append_pair("h", &size);
    Some(variant.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://search.example";

    fn cdn_hosts() -> Vec<String> {
        vec!["cdn.".to_string(), "imgix.net".to_string()]
    }

    #[test]
    fn proxy_thumbnail_on_cdn_yields_origin_and_three_sizes() {
        let thumb = "//thumbs.example/thumb.php?f=https%3A%2F%2Fcdn.example%2Fimg.jpg&s=120";
        let got = thumbnail_candidates(thumb, ORIGIN, &cdn_hosts());
        assert_eq!(
            got,
            vec![
                "https://cdn.example/img.jpg",
                "https://cdn.example/img.jpg?w=300&h=300",
                "https://cdn.example/img.jpg?w=600&h=600",
                "https://cdn.example/img.jpg?w=1200&h=1200",
            ]
        );
    }

    #[test]
    fn size_variants_replace_existing_query() {
        let thumb = "/thumb.php?f=https%3A%2F%2Fhn.imgix.net%2Fa.jpg%3Fauto%3Dformat";
        let got = thumbnail_candidates(thumb, ORIGIN, &cdn_hosts());
        assert_eq!(got[0], "https://hn.imgix.net/a.jpg?auto=format");
        assert_eq!(got[1], "https://hn.imgix.net/a.jpg?w=300&h=300");
        assert_eq!(got.len(), 4);
    }

    #[test]
    fn proxy_thumbnail_off_cdn_yields_origin_only() {
        let thumb = "https://thumbs.example/thumb.php?f=https%3A%2F%2Fimages.shop.example%2Fa.png";
        let got = thumbnail_candidates(thumb, ORIGIN, &cdn_hosts());
        assert_eq!(got, vec!["https://images.shop.example/a.png"]);
    }

    #[test]
    fn plain_protocol_relative_thumbnail_is_normalized() {
        let got = thumbnail_candidates("//example.com/x.jpg", ORIGIN, &cdn_hosts());
        assert_eq!(got, vec!["https://example.com/x.jpg"]);
    }

    #[test]
    fn plain_relative_thumbnail_resolves_against_listing_origin() {
        let got = thumbnail_candidates("/images/x.jpg", ORIGIN, &cdn_hosts());
        assert_eq!(got, vec!["https://search.example/images/x.jpg"]);
    }

    #[test]
    fn empty_thumbnail_yields_nothing() {
        assert!(thumbnail_candidates("", ORIGIN, &cdn_hosts()).is_empty());
    }

    #[test]
    fn undecodable_proxy_param_keeps_proxy_url() {
        let thumb = "https://thumbs.example/thumb.php?f=nothing-useful";
        let got = thumbnail_candidates(thumb, ORIGIN, &cdn_hosts());
        assert_eq!(got, vec![thumb]);
    }

    #[test]
    fn cdn_match_is_case_insensitive() {
        assert!(is_resizable_cdn(
            "https://CDN.Example/img.jpg",
            &["cdn.".to_string()]
        ));
        assert!(!is_resizable_cdn("https://example.com/img.jpg", &[String::new()]));
    }
}
