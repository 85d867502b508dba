//! Port for bookmark persistence.

use std::collections::HashSet;

use async_trait::async_trait;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::bookmark::{Bookmark, CollectionPatch, PageMetadata};
use crate::domain::user::OwnerId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by bookmark repository adapters.
    pub enum BookmarkRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "bookmark repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "bookmark repository query failed: {message}",
    }
}

/// Which bookmarks a paged query should match, always within one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkFilter {
    /// Every bookmark of the owner.
    All,
    /// Bookmarks holding **every** listed tag (set intersection).
    AllTags(Vec<Uuid>),
    /// Bookmarks in the given collection.
    Collection(Uuid),
    /// Case-insensitive substring across title, url, note and the metadata
    /// title/description/site-name fields, OR-combined.
    Search(String),
}

/// Fields required to persist a new bookmark.
#[derive(Debug, Clone)]
pub struct NewBookmarkRecord {
    /// Title.
    pub title: String,
    /// URL.
    pub url: String,
    /// Optional note.
    pub note: Option<String>,
    /// Resolved tag identifiers.
    pub tag_ids: Vec<Uuid>,
    /// Optional collection reference.
    pub collection_id: Option<Uuid>,
    /// Metadata block fetched at creation (possibly empty).
    pub meta: PageMetadata,
}

/// Whole-record replacement of the mutable bookmark fields.
#[derive(Debug, Clone)]
pub struct BookmarkChanges {
    /// New title.
    pub title: String,
    /// New URL.
    pub url: String,
    /// New note.
    pub note: Option<String>,
    /// New tag identifiers.
    pub tag_ids: Vec<Uuid>,
    /// Collection patch; [`CollectionPatch::Unchanged`] keeps the stored
    /// value.
    pub collection: CollectionPatch,
    /// Replacement metadata block; `None` keeps the stored block.
    pub meta: Option<PageMetadata>,
}

/// Port for storing and querying owner-scoped bookmarks.
///
/// Every operation is filtered by owner; an id that exists under a different
/// owner behaves exactly like a missing id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// Persist a new bookmark for the owner.
    async fn insert(
        &self,
        owner: &OwnerId,
        record: NewBookmarkRecord,
    ) -> Result<Bookmark, BookmarkRepositoryError>;

    /// Fetch one bookmark under the owner.
    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError>;

    /// Replace the mutable fields; `None` when the id is absent under the
    /// owner.
    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        changes: BookmarkChanges,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError>;

    /// Delete a bookmark, returning the removed record so the caller can
    /// garbage-collect its tags.
    async fn delete(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError>;

    /// One page of bookmarks matching `filter`, newest first, plus the total
    /// match count.
    async fn page(
        &self,
        owner: &OwnerId,
        filter: &BookmarkFilter,
        request: PageRequest,
    ) -> Result<(Vec<Bookmark>, u64), BookmarkRepositoryError>;

    /// Persist a freshly fetched metadata block on an existing bookmark.
    async fn set_metadata(
        &self,
        owner: &OwnerId,
        id: Uuid,
        meta: &PageMetadata,
    ) -> Result<(), BookmarkRepositoryError>;

    /// The subset of `candidates` still referenced by any of the owner's
    /// bookmarks; with `None`, every referenced tag id of the owner.
    ///
    /// This is the implicit reference count behind tag garbage collection:
    /// "in use" is re-derived by query rather than stored, so it can never
    /// drift.
    async fn referenced_tag_ids<'a>(
        &self,
        owner: &OwnerId,
        candidates: Option<&'a [Uuid]>,
    ) -> Result<HashSet<Uuid>, BookmarkRepositoryError>;
}
