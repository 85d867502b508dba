//! Collection entity.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::OwnerId;

/// A named, owner-scoped grouping of bookmarks.
///
/// The collection does not hold a back-list of its bookmarks; membership is
/// queried from the bookmark side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning account.
    pub owner_id: OwnerId,
    /// Name, unique per owner.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or renaming a collection.
#[derive(Debug, Clone)]
pub struct CollectionDraft {
    /// Requested name.
    pub name: String,
    /// Optional description; `None` clears it on update.
    pub description: Option<String>,
}
