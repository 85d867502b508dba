//! Diesel-backed [`CollectionRepository`] adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::collection::{Collection, CollectionDraft};
use crate::domain::ports::{CollectionRepository, CollectionRepositoryError};
use crate::domain::user::OwnerId;

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::CollectionRow;
use super::pool::{DbPool, PoolError};
use super::schema::collections;

/// Stores collections in the `collections` table.
#[derive(Clone)]
pub struct DieselCollectionRepository {
    pool: DbPool,
}

impl DieselCollectionRepository {
    /// New repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(err: &PoolError) -> CollectionRepositoryError {
    map_pool_error(err, CollectionRepositoryError::connection)
}

fn query_error(err: diesel::result::Error) -> CollectionRepositoryError {
    map_diesel_error(
        err,
        CollectionRepositoryError::connection,
        CollectionRepositoryError::query,
    )
}

#[async_trait]
impl CollectionRepository for DieselCollectionRepository {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Collection>, CollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        collections::table
            .filter(collections::owner_id.eq(owner.as_uuid()))
            .order(collections::name.asc())
            .select(CollectionRow::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Collection::from).collect())
            .map_err(query_error)
    }

    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Collection>, CollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        collections::table
            .filter(collections::owner_id.eq(owner.as_uuid()))
            .filter(collections::id.eq(id))
            .select(CollectionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Collection::from))
            .map_err(query_error)
    }

    async fn insert(
        &self,
        owner: &OwnerId,
        draft: CollectionDraft,
    ) -> Result<Collection, CollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::insert_into(collections::table)
            .values((
                collections::id.eq(Uuid::new_v4()),
                collections::owner_id.eq(owner.as_uuid()),
                collections::name.eq(&draft.name),
                collections::description.eq(&draft.description),
            ))
            .returning(CollectionRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Collection::from)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    CollectionRepositoryError::duplicate_name(draft.name.clone())
                } else {
                    query_error(err)
                }
            })
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        draft: CollectionDraft,
    ) -> Result<Option<Collection>, CollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(
            collections::table
                .filter(collections::owner_id.eq(owner.as_uuid()))
                .filter(collections::id.eq(id)),
        )
        .set((
            collections::name.eq(&draft.name),
            collections::description.eq(&draft.description),
            collections::updated_at.eq(Utc::now()),
        ))
        .returning(CollectionRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map(|row| row.map(Collection::from))
        .map_err(|err| {
            if is_unique_violation(&err) {
                CollectionRepositoryError::duplicate_name(draft.name.clone())
            } else {
                query_error(err)
            }
        })
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<bool, CollectionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::delete(
            collections::table
                .filter(collections::owner_id.eq(owner.as_uuid()))
                .filter(collections::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map(|count| count > 0)
        .map_err(query_error)
    }
}
