//! Driving port for collection operations exposed to inbound adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::collection::{Collection, CollectionDraft};
use crate::domain::user::OwnerId;

/// Use-cases over the owner's collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionOps: Send + Sync {
    /// All collections belonging to the owner.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Collection>, Error>;

    /// Fetch one collection or a not-found error.
    async fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Collection, Error>;

    /// Create a collection; duplicate names surface as a conflict.
    async fn create(&self, owner: &OwnerId, draft: CollectionDraft) -> Result<Collection, Error>;

    /// Rename or re-describe a collection.
    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        draft: CollectionDraft,
    ) -> Result<Collection, Error>;

    /// Delete a collection. Member bookmarks keep their (now stale)
    /// reference; see DESIGN notes.
    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error>;
}
