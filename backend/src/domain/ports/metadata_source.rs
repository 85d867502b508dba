//! Port for best-effort page metadata retrieval.

use async_trait::async_trait;

use crate::domain::bookmark::PageMetadata;

/// Port for fetching structured metadata for a URL.
///
/// The contract is infallible by design: metadata enrichment must never block
/// or fail the primary write path, so every failure mode (network error,
/// non-success status, timeout, malformed HTML) collapses into an empty or
/// partial [`PageMetadata`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for `url`, returning an empty record on any failure.
    async fn fetch(&self, url: &str) -> PageMetadata;
}

/// Fixture source that never fetches anything.
///
/// Use in tests where enrichment behaviour is not under test, and as the
/// stand-in when outbound HTTP is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyMetadataSource;

#[async_trait]
impl MetadataSource for EmptyMetadataSource {
    async fn fetch(&self, _url: &str) -> PageMetadata {
        PageMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_source_yields_empty_metadata() {
        let source = EmptyMetadataSource;
        let meta = source.fetch("https://example.com").await;
        assert!(!meta.has_title());
        assert_eq!(meta, PageMetadata::default());
    }
}
