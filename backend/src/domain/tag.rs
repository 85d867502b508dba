//! Tag entity.
//!
//! Tags are owner-scoped labels created lazily the first time a bookmark
//! references a name, and garbage-collected once nothing references them.
//! The `(owner, name)` pair is unique; the uniqueness constraint lives in the
//! store, and the tag lifecycle service leans on it to absorb creation races.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::user::OwnerId;

/// An owner-scoped tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning account; tags are never shared across owners.
    pub owner_id: OwnerId,
    /// Label, unique per owner.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Normalise a requested tag name: trim whitespace, reject empties.
#[must_use]
pub fn normalise_tag_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
