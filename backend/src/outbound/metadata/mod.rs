//! Outbound HTTP metadata fetching.

mod http_fetcher;

pub use http_fetcher::HttpMetadataSource;
