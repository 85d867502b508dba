//! Port for tag persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::tag::Tag;
use crate::domain::user::OwnerId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by tag repository adapters.
    pub enum TagRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "tag repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "tag repository query failed: {message}",
        /// The `(name, owner)` pair already exists.
        ///
        /// Raised when a concurrent request won the insert race; callers
        /// retry the lookup instead of failing.
        DuplicateName { name: String } =>
            "tag already exists: {name}",
    }
}

/// Port for storing and retrieving owner-scoped tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Look up a tag by name under one owner.
    async fn find_by_name(
        &self,
        owner: &OwnerId,
        name: &str,
    ) -> Result<Option<Tag>, TagRepositoryError>;

    /// Insert a tag, surfacing [`TagRepositoryError::DuplicateName`] when the
    /// store's uniqueness constraint rejects it.
    async fn insert(&self, owner: &OwnerId, name: &str) -> Result<Tag, TagRepositoryError>;

    /// All tags belonging to the owner.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Tag>, TagRepositoryError>;

    /// Fetch the subset of `ids` that exist under the owner.
    async fn find_by_ids(
        &self,
        owner: &OwnerId,
        ids: &[Uuid],
    ) -> Result<Vec<Tag>, TagRepositoryError>;

    /// Delete the given tags under the owner, returning how many went away.
    ///
    /// Ids that do not exist (or belong to someone else) are ignored.
    async fn delete_many(&self, owner: &OwnerId, ids: &[Uuid])
    -> Result<u64, TagRepositoryError>;
}
