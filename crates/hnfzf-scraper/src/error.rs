use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid search base URL \"{base_url}\": {reason}")]
    InvalidSearchUrl { base_url: String, reason: String },
}

impl ScraperError {
    /// `true` when the remote endpoint could not be reached or answered with a
    /// non-success status, as opposed to a local configuration problem.
    #[must_use]
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Http(_) | Self::UnexpectedStatus { .. })
    }
}
