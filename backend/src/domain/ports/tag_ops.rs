//! Driving port for tag operations exposed to inbound adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::tag::Tag;
use crate::domain::user::OwnerId;

/// Use-cases over the owner's tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagOps: Send + Sync {
    /// All tags belonging to the owner.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Tag>, Error>;

    /// Find a tag by name or create it; idempotent.
    async fn find_or_create(&self, owner: &OwnerId, name: &str) -> Result<Tag, Error>;

    /// Delete a tag directly; a missing id is a silent no-op, matching the
    /// idempotent delete the API promises.
    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error>;

    /// Full-sweep garbage collection over all of the owner's tags, returning
    /// how many unreferenced tags were removed.
    async fn sweep(&self, owner: &OwnerId) -> Result<u64, Error>;
}
