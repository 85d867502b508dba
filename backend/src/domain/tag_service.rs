//! Tag lifecycle service: lazy creation and implicit-reference-count
//! garbage collection.
//!
//! "In use" is re-derived from the owner's bookmarks by query each time a
//! collection pass runs; there is no stored counter to keep transactionally
//! honest, so the scheme cannot drift.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{
    BookmarkRepository, BookmarkRepositoryError, TagOps, TagRepository, TagRepositoryError,
};
use crate::domain::tag::{Tag, normalise_tag_name};
use crate::domain::user::OwnerId;

/// Service owning tag creation and garbage collection.
#[derive(Clone)]
pub struct TagLifecycleService<T, B> {
    tags: Arc<T>,
    bookmarks: Arc<B>,
}

impl<T, B> TagLifecycleService<T, B> {
    /// Create a new service over the given repositories.
    pub fn new(tags: Arc<T>, bookmarks: Arc<B>) -> Self {
        Self { tags, bookmarks }
    }
}

fn map_tag_error(error: TagRepositoryError) -> Error {
    match error {
        TagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tag repository unavailable: {message}"))
        }
        TagRepositoryError::Query { message } => {
            Error::internal(format!("tag repository error: {message}"))
        }
        TagRepositoryError::DuplicateName { name } => {
            Error::conflict(format!("Tag already exists: {name}"))
        }
    }
}

fn map_bookmark_error(error: BookmarkRepositoryError) -> Error {
    match error {
        BookmarkRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("bookmark repository unavailable: {message}"))
        }
        BookmarkRepositoryError::Query { message } => {
            Error::internal(format!("bookmark repository error: {message}"))
        }
    }
}

impl<T, B> TagLifecycleService<T, B>
where
    T: TagRepository,
    B: BookmarkRepository,
{
    /// Resolve an ordered list of tag names into tags, creating any that do
    /// not yet exist for the owner.
    ///
    /// Names are trimmed; empty names are skipped and duplicates collapsed,
    /// preserving first occurrence. Idempotent: the same names always map to
    /// the same tags.
    pub async fn resolve_or_create(
        &self,
        owner: &OwnerId,
        names: &[String],
    ) -> Result<Vec<Tag>, Error> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for raw in names {
            let Some(name) = normalise_tag_name(raw) else {
                continue;
            };
            if !seen.insert(name.clone()) {
                continue;
            }
            resolved.push(self.lookup_or_insert(owner, &name).await?);
        }
        Ok(resolved)
    }

    /// Find a tag by name, inserting it when absent.
    ///
    /// Concurrent creation of the same `(name, owner)` pair is resolved by
    /// the store's uniqueness constraint: the loser of the insert race sees
    /// [`TagRepositoryError::DuplicateName`] and retries the lookup.
    pub async fn lookup_or_insert(&self, owner: &OwnerId, name: &str) -> Result<Tag, Error> {
        if let Some(tag) = self
            .tags
            .find_by_name(owner, name)
            .await
            .map_err(map_tag_error)?
        {
            return Ok(tag);
        }

        match self.tags.insert(owner, name).await {
            Ok(tag) => Ok(tag),
            Err(TagRepositoryError::DuplicateName { .. }) => {
                debug!(%owner, name, "lost tag insert race, retrying lookup");
                self.tags
                    .find_by_name(owner, name)
                    .await
                    .map_err(map_tag_error)?
                    .ok_or_else(|| {
                        Error::internal(format!("tag vanished after duplicate insert: {name}"))
                    })
            }
            Err(error) => Err(map_tag_error(error)),
        }
    }

    /// Delete each candidate tag iff no bookmark owned by `owner` references
    /// it. Tags still in use, and an empty candidate list, are no-ops.
    pub async fn collect_unreferenced(
        &self,
        owner: &OwnerId,
        candidates: &[Uuid],
    ) -> Result<u64, Error> {
        if candidates.is_empty() {
            return Ok(0);
        }

        let referenced = self
            .bookmarks
            .referenced_tag_ids(owner, Some(candidates))
            .await
            .map_err(map_bookmark_error)?;

        let mut doomed: Vec<Uuid> = candidates
            .iter()
            .copied()
            .filter(|id| !referenced.contains(id))
            .collect();
        doomed.sort_unstable();
        doomed.dedup();

        if doomed.is_empty() {
            return Ok(0);
        }

        let deleted = self
            .tags
            .delete_many(owner, &doomed)
            .await
            .map_err(map_tag_error)?;
        if deleted > 0 {
            debug!(%owner, deleted, "garbage-collected unused tags");
        }
        Ok(deleted)
    }
}

#[async_trait]
impl<T, B> TagOps for TagLifecycleService<T, B>
where
    T: TagRepository,
    B: BookmarkRepository,
{
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Tag>, Error> {
        self.tags.list(owner).await.map_err(map_tag_error)
    }

    async fn find_or_create(&self, owner: &OwnerId, name: &str) -> Result<Tag, Error> {
        let Some(name) = normalise_tag_name(name) else {
            return Err(Error::invalid_request("tag name must not be empty"));
        };
        self.lookup_or_insert(owner, &name).await
    }

    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error> {
        self.tags
            .delete_many(owner, &[id])
            .await
            .map_err(map_tag_error)?;
        Ok(())
    }

    async fn sweep(&self, owner: &OwnerId) -> Result<u64, Error> {
        let all: Vec<Uuid> = self
            .tags
            .list(owner)
            .await
            .map_err(map_tag_error)?
            .into_iter()
            .map(|tag| tag.id)
            .collect();
        self.collect_unreferenced(owner, &all).await
    }
}
