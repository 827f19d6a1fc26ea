//! URL origin extraction and resolution of relative asset URLs.

/// Extracts the scheme+host origin from a page URL.
///
/// Given `"https://www.harveynorman.com.au/sony-wh-1000xm5.html"`, returns
/// `"https://www.harveynorman.com.au"`.
#[must_use]
pub fn extract_origin(page_url: &str) -> String {
    reqwest::Url::parse(page_url).map_or_else(
        |e| {
            tracing::debug!(
                page_url,
                error = %e,
                "could not parse page URL, falling back to string split for origin extraction"
            );
            // fallback: take "https://host" by splitting on '/' and taking first 3 parts
            page_url
                .trim_end_matches('/')
                .splitn(4, '/')
                .take(3)
                .collect::<Vec<_>>()
                .join("/")
        },
        |u| u.origin().ascii_serialization(),
    )
}

/// Resolves `candidate` to an absolute http(s) URL.
///
/// Protocol-relative candidates (`//host/x.jpg`) get an `https:` scheme;
/// anything else that is not already absolute is joined onto `base_url`.
/// Returns `None` for empty input, an unparseable base, or a non-http(s)
/// result (e.g. `data:` or `javascript:` URIs).
#[must_use]
pub fn absolutize_url(base_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }

    let resolved = if candidate.starts_with("//") {
        reqwest::Url::parse(&format!("https:{candidate}")).ok()?
    } else {
        match reqwest::Url::parse(candidate) {
            Ok(url) => url,
            Err(_) => reqwest::Url::parse(base_url).ok()?.join(candidate).ok()?,
        }
    };

    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}
