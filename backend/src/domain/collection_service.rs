//! Collection use-cases; thin orchestration over the repository port.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::collection::{Collection, CollectionDraft};
use crate::domain::ports::{CollectionOps, CollectionRepository, CollectionRepositoryError};
use crate::domain::user::OwnerId;

/// Service implementing [`CollectionOps`].
#[derive(Clone)]
pub struct CollectionService<C> {
    collections: Arc<C>,
}

impl<C> CollectionService<C> {
    /// Wire the service over its repository.
    pub fn new(collections: Arc<C>) -> Self {
        Self { collections }
    }
}

fn map_error(error: CollectionRepositoryError) -> Error {
    match error {
        CollectionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("collection repository unavailable: {message}"))
        }
        CollectionRepositoryError::Query { message } => {
            Error::internal(format!("collection repository error: {message}"))
        }
        CollectionRepositoryError::DuplicateName { name } => {
            Error::conflict(format!("Collection already exists: {name}"))
        }
    }
}

fn not_found() -> Error {
    Error::not_found("Collection not found")
}

#[async_trait]
impl<C> CollectionOps for CollectionService<C>
where
    C: CollectionRepository,
{
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Collection>, Error> {
        self.collections.list(owner).await.map_err(map_error)
    }

    async fn get(&self, owner: &OwnerId, id: Uuid) -> Result<Collection, Error> {
        self.collections
            .find(owner, id)
            .await
            .map_err(map_error)?
            .ok_or_else(not_found)
    }

    async fn create(&self, owner: &OwnerId, draft: CollectionDraft) -> Result<Collection, Error> {
        self.collections
            .insert(owner, draft)
            .await
            .map_err(map_error)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        draft: CollectionDraft,
    ) -> Result<Collection, Error> {
        self.collections
            .update(owner, id, draft)
            .await
            .map_err(map_error)?
            .ok_or_else(not_found)
    }

    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error> {
        if self
            .collections
            .delete(owner, id)
            .await
            .map_err(map_error)?
        {
            Ok(())
        } else {
            Err(not_found())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockCollectionRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn collection(owner: OwnerId, name: &str) -> Collection {
        Collection {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: name.to_owned(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn get_maps_absence_to_not_found() {
        let owner = OwnerId::random();
        let mut repo = MockCollectionRepository::new();
        repo.expect_find().returning(|_, _| Ok(None));

        let svc = CollectionService::new(Arc::new(repo));
        let err = svc
            .get(&owner, Uuid::new_v4())
            .await
            .expect_err("missing collection");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn duplicate_name_surfaces_as_conflict() {
        let owner = OwnerId::random();
        let mut repo = MockCollectionRepository::new();
        repo.expect_insert()
            .returning(|_, draft| Err(CollectionRepositoryError::duplicate_name(draft.name)));

        let svc = CollectionService::new(Arc::new(repo));
        let err = svc
            .create(
                &owner,
                CollectionDraft {
                    name: "Reading".into(),
                    description: None,
                },
            )
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let owner = OwnerId::random();
        let existing = collection(owner, "Reading");
        let id = existing.id;
        let mut repo = MockCollectionRepository::new();
        repo.expect_delete()
            .with(eq(owner), eq(id))
            .returning(|_, _| Ok(true));
        repo.expect_delete().returning(|_, _| Ok(false));

        let svc = CollectionService::new(Arc::new(repo));
        svc.delete(&owner, id).await.expect("existing delete succeeds");
        let err = svc
            .delete(&owner, Uuid::new_v4())
            .await
            .expect_err("second delete misses");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
