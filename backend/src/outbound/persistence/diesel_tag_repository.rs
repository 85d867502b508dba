//! Diesel-backed [`TagRepository`] adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TagRepository, TagRepositoryError};
use crate::domain::tag::Tag;
use crate::domain::user::OwnerId;

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::TagRow;
use super::pool::{DbPool, PoolError};
use super::schema::tags;

/// Stores tags in the `tags` table.
///
/// The `(owner_id, name)` unique index is the authority on duplicates; the
/// insert surfaces its violation as [`TagRepositoryError::DuplicateName`] so
/// the lifecycle service can retry the lookup.
#[derive(Clone)]
pub struct DieselTagRepository {
    pool: DbPool,
}

impl DieselTagRepository {
    /// New repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(err: &PoolError) -> TagRepositoryError {
    map_pool_error(err, TagRepositoryError::connection)
}

fn query_error(err: diesel::result::Error) -> TagRepositoryError {
    map_diesel_error(
        err,
        TagRepositoryError::connection,
        TagRepositoryError::query,
    )
}

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn find_by_name(
        &self,
        owner: &OwnerId,
        name: &str,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        tags::table
            .filter(tags::owner_id.eq(owner.as_uuid()))
            .filter(tags::name.eq(name))
            .select(TagRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Tag::from))
            .map_err(query_error)
    }

    async fn insert(&self, owner: &OwnerId, name: &str) -> Result<Tag, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::insert_into(tags::table)
            .values((
                tags::id.eq(Uuid::new_v4()),
                tags::owner_id.eq(owner.as_uuid()),
                tags::name.eq(name),
            ))
            .returning(TagRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Tag::from)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    TagRepositoryError::duplicate_name(name)
                } else {
                    query_error(err)
                }
            })
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Tag>, TagRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        tags::table
            .filter(tags::owner_id.eq(owner.as_uuid()))
            .order(tags::name.asc())
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Tag::from).collect())
            .map_err(query_error)
    }

    async fn find_by_ids(
        &self,
        owner: &OwnerId,
        ids: &[Uuid],
    ) -> Result<Vec<Tag>, TagRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        tags::table
            .filter(tags::owner_id.eq(owner.as_uuid()))
            .filter(tags::id.eq_any(ids))
            .select(TagRow::as_select())
            .load(&mut conn)
            .await
            .map(|rows| rows.into_iter().map(Tag::from).collect())
            .map_err(query_error)
    }

    async fn delete_many(
        &self,
        owner: &OwnerId,
        ids: &[Uuid],
    ) -> Result<u64, TagRepositoryError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::delete(
            tags::table
                .filter(tags::owner_id.eq(owner.as_uuid()))
                .filter(tags::id.eq_any(ids)),
        )
        .execute(&mut conn)
        .await
        .map(|count| count as u64)
        .map_err(query_error)
    }
}
