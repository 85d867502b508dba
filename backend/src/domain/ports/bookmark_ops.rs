//! Driving port for bookmark operations exposed to inbound adapters.

use async_trait::async_trait;
use pagination::{PageEnvelope, PageRequest};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::bookmark::{BookmarkDraft, BookmarkUpdate, BookmarkView};
use crate::domain::user::OwnerId;

/// Use-cases over the owner's bookmarks.
///
/// Implemented by [`crate::domain::BookmarkService`]; handlers depend on this
/// trait only, so they stay testable without I/O.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookmarkOps: Send + Sync {
    /// Create a bookmark: resolve tag names, fetch metadata best-effort,
    /// persist, and return the record with tags expanded.
    async fn create(&self, owner: &OwnerId, draft: BookmarkDraft)
    -> Result<BookmarkView, Error>;

    /// Replace the mutable fields of a bookmark and garbage-collect any tags
    /// the new version dropped.
    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        update: BookmarkUpdate,
    ) -> Result<BookmarkView, Error>;

    /// Delete a bookmark and garbage-collect its tags.
    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error>;

    /// Plain newest-first listing.
    async fn list(
        &self,
        owner: &OwnerId,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error>;

    /// Case-insensitive substring search; an empty query yields the empty
    /// envelope rather than an error.
    async fn search(
        &self,
        owner: &OwnerId,
        query: &str,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error>;

    /// Bookmarks holding **every** listed tag, with lazy metadata backfill.
    async fn list_by_tags(
        &self,
        owner: &OwnerId,
        tag_ids: Vec<Uuid>,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error>;

    /// Bookmarks in a collection, with lazy metadata backfill.
    async fn list_by_collection(
        &self,
        owner: &OwnerId,
        collection_id: Uuid,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error>;
}
