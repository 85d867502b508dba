//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they only ever depend
//! on the driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountOps, BookmarkOps, CollectionOps, TagOps};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account and session use-cases.
    pub accounts: Arc<dyn AccountOps>,
    /// Bookmark use-cases.
    pub bookmarks: Arc<dyn BookmarkOps>,
    /// Tag use-cases.
    pub tags: Arc<dyn TagOps>,
    /// Collection use-cases.
    pub collections: Arc<dyn CollectionOps>,
}
