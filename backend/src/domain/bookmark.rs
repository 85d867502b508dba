//! Bookmark entity, its metadata block, and the draft/patch inputs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::tag::Tag;
use super::user::OwnerId;

/// Best-effort page metadata scraped from the bookmarked URL.
///
/// Every field is independently nullable; an entirely empty block is the
/// expected outcome of a failed or skipped fetch, never an error state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageMetadata {
    /// Page title (Open Graph preferred).
    pub title: Option<String>,
    /// Page description.
    pub description: Option<String>,
    /// Absolute preview image URL.
    pub image: Option<String>,
    /// Video URL for media pages.
    pub video: Option<String>,
    /// Site name, falling back to the URL host.
    pub site_name: Option<String>,
    /// Publication timestamp; unparseable dates are discarded to `None`.
    pub published_at: Option<DateTime<Utc>>,
    /// Author attribution.
    pub author: Option<String>,
    /// Content type hint such as `article` or `video`.
    pub content_type: Option<String>,
}

impl PageMetadata {
    /// Whether the block should be considered populated.
    ///
    /// Listings use this to decide when to lazily re-fetch; the original
    /// system keys off the title, so a block with only a description still
    /// counts as missing.
    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A stored bookmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning account; immutable after creation.
    pub owner_id: OwnerId,
    /// Caller-supplied title.
    pub title: String,
    /// Bookmarked URL.
    pub url: String,
    /// Optional free-text note.
    pub note: Option<String>,
    /// Referenced tags; a tag may be shared by many bookmarks.
    pub tag_ids: Vec<Uuid>,
    /// Optional collection membership.
    pub collection_id: Option<Uuid>,
    /// Scraped metadata block.
    pub meta: PageMetadata,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A bookmark with its tag references expanded for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkView {
    /// The record itself.
    pub bookmark: Bookmark,
    /// Full tag objects for `bookmark.tag_ids`, in stored order.
    pub tags: Vec<Tag>,
}

/// Input for creating a bookmark.
#[derive(Debug, Clone)]
pub struct BookmarkDraft {
    /// Title.
    pub title: String,
    /// URL to bookmark.
    pub url: String,
    /// Optional note.
    pub note: Option<String>,
    /// Tag names to resolve or create.
    pub tag_names: Vec<String>,
    /// Collection to place the bookmark in.
    pub collection_id: Option<Uuid>,
}

/// Three-state patch for the collection reference on update.
///
/// Distinguishes "field omitted" (keep) from an explicit null (clear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionPatch {
    /// Leave the stored reference as it is.
    #[default]
    Unchanged,
    /// Remove the reference.
    Clear,
    /// Point the bookmark at the given collection.
    Set(Uuid),
}

/// Input for updating a bookmark; mutable fields are replaced wholesale.
#[derive(Debug, Clone)]
pub struct BookmarkUpdate {
    /// New title.
    pub title: String,
    /// New URL; a changed URL triggers a metadata re-fetch.
    pub url: String,
    /// New note, replacing the old one (or clearing it).
    pub note: Option<String>,
    /// Tag names for the new version; removed tags are garbage-collected.
    pub tag_names: Vec<String>,
    /// Collection patch.
    pub collection: CollectionPatch,
}
