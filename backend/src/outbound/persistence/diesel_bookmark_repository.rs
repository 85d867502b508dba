//! Diesel-backed [`BookmarkRepository`] adapter.
//!
//! Tag references live in a `uuid[]` column, so the by-tag filter compiles to
//! the Postgres array containment operator (`@>`) and the garbage-collection
//! scan to array overlap (`&&`). Search is an OR of `ILIKE` predicates over
//! the text columns.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::bookmark::{Bookmark, CollectionPatch, PageMetadata};
use crate::domain::ports::{
    BookmarkChanges, BookmarkFilter, BookmarkRepository, BookmarkRepositoryError,
    NewBookmarkRecord,
};
use crate::domain::user::OwnerId;

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{BookmarkChangesRow, BookmarkRow, MetadataRow, NewBookmarkRow};
use super::pool::{DbPool, PoolError};
use super::schema::bookmarks;

/// Stores bookmarks in the `bookmarks` table.
#[derive(Clone)]
pub struct DieselBookmarkRepository {
    pool: DbPool,
}

impl DieselBookmarkRepository {
    /// New repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(err: &PoolError) -> BookmarkRepositoryError {
    map_pool_error(err, BookmarkRepositoryError::connection)
}

fn query_error(err: diesel::result::Error) -> BookmarkRepositoryError {
    map_diesel_error(
        err,
        BookmarkRepositoryError::connection,
        BookmarkRepositoryError::query,
    )
}

/// Escape LIKE wildcards so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

type BoxedBookmarkQuery = bookmarks::BoxedQuery<'static, diesel::pg::Pg>;

/// Owner-scoped query matching the given filter.
///
/// Boxed queries cannot be cloned, so the count and page legs of a listing
/// each build their own copy.
fn filtered(owner: &OwnerId, filter: &BookmarkFilter) -> BoxedBookmarkQuery {
    let base = bookmarks::table
        .into_boxed()
        .filter(bookmarks::owner_id.eq(*owner.as_uuid()));
    match filter {
        BookmarkFilter::All => base,
        BookmarkFilter::AllTags(ids) => base.filter(bookmarks::tag_ids.contains(ids.clone())),
        BookmarkFilter::Collection(id) => base.filter(bookmarks::collection_id.eq(*id)),
        BookmarkFilter::Search(term) => {
            let pattern = like_pattern(term);
            base.filter(
                bookmarks::title
                    .ilike(pattern.clone())
                    .nullable()
                    .or(bookmarks::url.ilike(pattern.clone()).nullable())
                    .or(bookmarks::note.ilike(pattern.clone()))
                    .or(bookmarks::meta_title.ilike(pattern.clone()))
                    .or(bookmarks::meta_description.ilike(pattern.clone()))
                    .or(bookmarks::meta_site_name.ilike(pattern)),
            )
        }
    }
}

/// Build the column changeset for a whole-record update.
fn changes_row(changes: BookmarkChanges) -> BookmarkChangesRow {
    let collection_id = match changes.collection {
        CollectionPatch::Unchanged => None,
        CollectionPatch::Clear => Some(None),
        CollectionPatch::Set(id) => Some(Some(id)),
    };
    let meta = changes.meta;
    BookmarkChangesRow {
        title: changes.title,
        url: changes.url,
        note: Some(changes.note),
        tag_ids: changes.tag_ids,
        collection_id,
        meta_title: meta.as_ref().map(|m| m.title.clone()),
        meta_description: meta.as_ref().map(|m| m.description.clone()),
        meta_image: meta.as_ref().map(|m| m.image.clone()),
        meta_video: meta.as_ref().map(|m| m.video.clone()),
        meta_site_name: meta.as_ref().map(|m| m.site_name.clone()),
        meta_published_at: meta.as_ref().map(|m| m.published_at),
        meta_author: meta.as_ref().map(|m| m.author.clone()),
        meta_content_type: meta.as_ref().map(|m| m.content_type.clone()),
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl BookmarkRepository for DieselBookmarkRepository {
    async fn insert(
        &self,
        owner: &OwnerId,
        record: NewBookmarkRecord,
    ) -> Result<Bookmark, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        let row = NewBookmarkRow {
            id: Uuid::new_v4(),
            owner_id: *owner.as_uuid(),
            title: record.title,
            url: record.url,
            note: record.note,
            tag_ids: record.tag_ids,
            collection_id: record.collection_id,
            meta_title: record.meta.title,
            meta_description: record.meta.description,
            meta_image: record.meta.image,
            meta_video: record.meta.video,
            meta_site_name: record.meta.site_name,
            meta_published_at: record.meta.published_at,
            meta_author: record.meta.author,
            meta_content_type: record.meta.content_type,
        };
        diesel::insert_into(bookmarks::table)
            .values(&row)
            .returning(BookmarkRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Bookmark::from)
            .map_err(query_error)
    }

    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        bookmarks::table
            .filter(bookmarks::owner_id.eq(owner.as_uuid()))
            .filter(bookmarks::id.eq(id))
            .select(BookmarkRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Bookmark::from))
            .map_err(query_error)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        changes: BookmarkChanges,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(
            bookmarks::table
                .filter(bookmarks::owner_id.eq(owner.as_uuid()))
                .filter(bookmarks::id.eq(id)),
        )
        .set(changes_row(changes))
        .returning(BookmarkRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map(|row| row.map(Bookmark::from))
        .map_err(query_error)
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::delete(
            bookmarks::table
                .filter(bookmarks::owner_id.eq(owner.as_uuid()))
                .filter(bookmarks::id.eq(id)),
        )
        .returning(BookmarkRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map(|row| row.map(Bookmark::from))
        .map_err(query_error)
    }

    async fn page(
        &self,
        owner: &OwnerId,
        filter: &BookmarkFilter,
        request: PageRequest,
    ) -> Result<(Vec<Bookmark>, u64), BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        let total: i64 = filtered(owner, filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(query_error)?;
        let rows: Vec<BookmarkRow> = filtered(owner, filter)
            .order(bookmarks::created_at.desc())
            .offset(request.offset())
            .limit(i64::from(request.limit()))
            .select(BookmarkRow::as_select())
            .load(&mut conn)
            .await
            .map_err(query_error)?;
        let items = rows.into_iter().map(Bookmark::from).collect();
        Ok((items, u64::try_from(total).unwrap_or(0)))
    }

    async fn set_metadata(
        &self,
        owner: &OwnerId,
        id: Uuid,
        meta: &PageMetadata,
    ) -> Result<(), BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(
            bookmarks::table
                .filter(bookmarks::owner_id.eq(owner.as_uuid()))
                .filter(bookmarks::id.eq(id)),
        )
        .set((
            MetadataRow::from_meta(meta),
            bookmarks::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map(|_| ())
        .map_err(query_error)
    }

    async fn referenced_tag_ids<'a>(
        &self,
        owner: &OwnerId,
        candidates: Option<&'a [Uuid]>,
    ) -> Result<HashSet<Uuid>, BookmarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        let scoped = bookmarks::table.filter(bookmarks::owner_id.eq(owner.as_uuid()));
        let rows: Vec<Vec<Uuid>> = match candidates {
            Some(ids) => {
                if ids.is_empty() {
                    return Ok(HashSet::new());
                }
                scoped
                    .filter(bookmarks::tag_ids.overlaps_with(ids.to_vec()))
                    .select(bookmarks::tag_ids)
                    .load(&mut conn)
                    .await
                    .map_err(query_error)?
            }
            None => scoped
                .select(bookmarks::tag_ids)
                .load(&mut conn)
                .await
                .map_err(query_error)?,
        };
        let mut referenced: HashSet<Uuid> = rows.into_iter().flatten().collect();
        if let Some(ids) = candidates {
            let wanted: HashSet<Uuid> = ids.iter().copied().collect();
            referenced.retain(|id| wanted.contains(id));
        }
        Ok(referenced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50% done"), "%50\\% done%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn changes_row_maps_the_collection_patch() {
        let base = BookmarkChanges {
            title: "t".into(),
            url: "https://example.com".into(),
            note: None,
            tag_ids: Vec::new(),
            collection: CollectionPatch::Unchanged,
            meta: None,
        };
        assert_eq!(changes_row(base.clone()).collection_id, None);

        let cleared = BookmarkChanges {
            collection: CollectionPatch::Clear,
            ..base.clone()
        };
        assert_eq!(changes_row(cleared).collection_id, Some(None));

        let id = Uuid::new_v4();
        let set = BookmarkChanges {
            collection: CollectionPatch::Set(id),
            ..base
        };
        assert_eq!(changes_row(set).collection_id, Some(Some(id)));
    }

    #[test]
    fn changes_row_keeps_metadata_when_absent() {
        let changes = BookmarkChanges {
            title: "t".into(),
            url: "https://example.com".into(),
            note: Some("n".into()),
            tag_ids: Vec::new(),
            collection: CollectionPatch::Unchanged,
            meta: None,
        };
        let row = changes_row(changes);
        assert_eq!(row.meta_title, None);
        assert_eq!(row.note, Some(Some("n".into())));
    }
}
