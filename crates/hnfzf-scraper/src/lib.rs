pub mod client;
pub mod error;
pub mod images;
pub mod ingest;
pub mod listing;
pub mod unwrap;

pub use client::ScraperConfig;
pub use error::ScraperError;
pub use images::ImageResolver;
pub use ingest::Ingestor;
pub use listing::{parse_listings, ListingExtractor};
pub use unwrap::{unwrap_query_url, UnwrapError};
