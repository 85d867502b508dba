//! Port for collection persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::collection::{Collection, CollectionDraft};
use crate::domain::user::OwnerId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by collection repository adapters.
    pub enum CollectionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "collection repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "collection repository query failed: {message}",
        /// The `(name, owner)` pair already exists.
        DuplicateName { name: String } =>
            "collection name already exists: {name}",
    }
}

/// Port for storing and retrieving owner-scoped collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// All collections belonging to the owner.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Collection>, CollectionRepositoryError>;

    /// Fetch one collection under the owner.
    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Collection>, CollectionRepositoryError>;

    /// Insert a collection, surfacing a duplicate-name conflict.
    async fn insert(
        &self,
        owner: &OwnerId,
        draft: CollectionDraft,
    ) -> Result<Collection, CollectionRepositoryError>;

    /// Update name and description; `None` when the id is absent under the
    /// owner.
    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        draft: CollectionDraft,
    ) -> Result<Option<Collection>, CollectionRepositoryError>;

    /// Delete a collection, reporting whether anything was removed.
    ///
    /// Member bookmarks are deliberately left untouched; their stale
    /// `collection_id` is tolerated.
    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<bool, CollectionRepositoryError>;
}
