//! Row structs mapping Diesel query results to domain entities.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::bookmark::{Bookmark, PageMetadata};
use crate::domain::collection::Collection;
use crate::domain::tag::Tag;
use crate::domain::user::{OwnerId, TimedToken, User};

use super::schema::{bookmarks, collections, tags, users};

/// One row of the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_email_verified: bool,
    pub verification_token: Option<String>,
    pub verification_expires_at: Option<DateTime<Utc>>,
    pub reset_token: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pair up a token column with its expiry column.
///
/// A token without an expiry (or the reverse) is treated as absent; the two
/// columns are only ever written together.
fn timed_token(
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
) -> Option<TimedToken> {
    match (token, expires_at) {
        (Some(token), Some(expires_at)) => Some(TimedToken { token, expires_at }),
        _ => None,
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: OwnerId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            is_email_verified: row.is_email_verified,
            email_verification: timed_token(row.verification_token, row.verification_expires_at),
            password_reset: timed_token(row.reset_token, row.reset_expires_at),
            refresh_token: row.refresh_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable row for a new account.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub verification_token: String,
    pub verification_expires_at: DateTime<Utc>,
}

/// One row of the `tags` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tags)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TagRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self {
            id: row.id,
            owner_id: OwnerId::from_uuid(row.owner_id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// One row of the `collections` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CollectionRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CollectionRow> for Collection {
    fn from(row: CollectionRow) -> Self {
        Self {
            id: row.id,
            owner_id: OwnerId::from_uuid(row.owner_id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// One row of the `bookmarks` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookmarks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookmarkRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub url: String,
    pub note: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub collection_id: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub meta_video: Option<String>,
    pub meta_site_name: Option<String>,
    pub meta_published_at: Option<DateTime<Utc>>,
    pub meta_author: Option<String>,
    pub meta_content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookmarkRow> for Bookmark {
    fn from(row: BookmarkRow) -> Self {
        Self {
            id: row.id,
            owner_id: OwnerId::from_uuid(row.owner_id),
            title: row.title,
            url: row.url,
            note: row.note,
            tag_ids: row.tag_ids,
            collection_id: row.collection_id,
            meta: PageMetadata {
                title: row.meta_title,
                description: row.meta_description,
                image: row.meta_image,
                video: row.meta_video,
                site_name: row.meta_site_name,
                published_at: row.meta_published_at,
                author: row.meta_author,
                content_type: row.meta_content_type,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable row for a new bookmark.
#[derive(Debug, Insertable)]
#[diesel(table_name = bookmarks)]
pub struct NewBookmarkRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub url: String,
    pub note: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub collection_id: Option<Uuid>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub meta_video: Option<String>,
    pub meta_site_name: Option<String>,
    pub meta_published_at: Option<DateTime<Utc>>,
    pub meta_author: Option<String>,
    pub meta_content_type: Option<String>,
}

/// Changeset replacing the mutable bookmark columns.
///
/// Double-`Option` fields distinguish "leave the column alone" (`None`) from
/// an explicit write, including a write of NULL (`Some(None)`).
#[derive(Debug, AsChangeset)]
#[diesel(table_name = bookmarks)]
pub struct BookmarkChangesRow {
    pub title: String,
    pub url: String,
    pub note: Option<Option<String>>,
    pub tag_ids: Vec<Uuid>,
    pub collection_id: Option<Option<Uuid>>,
    pub meta_title: Option<Option<String>>,
    pub meta_description: Option<Option<String>>,
    pub meta_image: Option<Option<String>>,
    pub meta_video: Option<Option<String>>,
    pub meta_site_name: Option<Option<String>>,
    pub meta_published_at: Option<Option<DateTime<Utc>>>,
    pub meta_author: Option<Option<String>>,
    pub meta_content_type: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset writing a freshly fetched metadata block.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = bookmarks)]
#[diesel(treat_none_as_null = true)]
pub struct MetadataRow {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub meta_image: Option<String>,
    pub meta_video: Option<String>,
    pub meta_site_name: Option<String>,
    pub meta_published_at: Option<DateTime<Utc>>,
    pub meta_author: Option<String>,
    pub meta_content_type: Option<String>,
}

impl MetadataRow {
    /// Build the changeset from a metadata block.
    pub fn from_meta(meta: &PageMetadata) -> Self {
        Self {
            meta_title: meta.title.clone(),
            meta_description: meta.description.clone(),
            meta_image: meta.image.clone(),
            meta_video: meta.video.clone(),
            meta_site_name: meta.site_name.clone(),
            meta_published_at: meta.published_at,
            meta_author: meta.author.clone(),
            meta_content_type: meta.content_type.clone(),
        }
    }
}
