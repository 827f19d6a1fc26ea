//! Unwrapping of URLs that carry another URL in a query parameter.
//!
//! Both the thumbnail resizing proxy (`f=`) and the search tracking redirect
//! (`url=`) follow this shape, so they share one decoder.

use percent_encoding::percent_decode_str;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnwrapError {
    #[error("query parameter \"{0}\" is not present")]
    MissingParam(String),

    #[error("query parameter \"{param}\" is not valid percent-encoded UTF-8")]
    InvalidEncoding { param: String },

    #[error("query parameter \"{param}\" does not carry a URL: \"{value}\"")]
    NotAUrl { param: String, value: String },
}

/// Extracts and decodes the URL carried in `param` of `url`'s query string.
///
/// `url` may be absolute, protocol-relative, or a bare path; only its query
/// string is inspected. The first occurrence of `param` wins. A
/// protocol-relative result is returned with an `https:` scheme.
///
/// # Errors
///
/// - [`UnwrapError::MissingParam`] if the query has no `param` key.
/// - [`UnwrapError::InvalidEncoding`] if the value does not decode to UTF-8.
/// - [`UnwrapError::NotAUrl`] if the decoded value is not an http(s) or
///   protocol-relative URL.
pub fn unwrap_query_url(url: &str, param: &str) -> Result<String, UnwrapError> {
    let query = url
        .split_once('?')
        .map_or("", |(_, q)| q)
        .split('#')
        .next()
        .unwrap_or_default();

    // Scanned by hand rather than through `Url::query_pairs`: the input may be
    // a bare path, and `+` must stay literal in the carried URL.
    let raw = query
        .split('&')
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == param).then_some(value)
        })
        .ok_or_else(|| UnwrapError::MissingParam(param.to_owned()))?;

    let mut decoded = decode(raw, param)?;
    // Some proxies encode the origin twice.
    if starts_with_ignore_case(&decoded, "http%3a") || starts_with_ignore_case(&decoded, "https%3a")
    {
        decoded = decode(&decoded, param)?;
    }

    let decoded = decoded.trim();
    if decoded.starts_with("//") {
        return Ok(format!("https:{decoded}"));
    }
    if starts_with_ignore_case(decoded, "http://") || starts_with_ignore_case(decoded, "https://") {
        return Ok(decoded.to_owned());
    }

    Err(UnwrapError::NotAUrl {
        param: param.to_owned(),
        value: decoded.to_owned(),
    })
}

fn decode(raw: &str, param: &str) -> Result<String, UnwrapError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| UnwrapError::InvalidEncoding {
            param: param.to_owned(),
        })
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
