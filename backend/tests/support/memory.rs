//! In-memory port implementations for end-to-end HTTP tests.
//!
//! Each store keeps its records behind a `Mutex` and mimics the behaviour the
//! Diesel adapters get from the database: owner scoping, uniqueness
//! violations, newest-first paging.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use uuid::Uuid;

use backend::domain::bookmark::{Bookmark, CollectionPatch, PageMetadata};
use backend::domain::collection::{Collection, CollectionDraft};
use backend::domain::ports::{
    BookmarkChanges, BookmarkFilter, BookmarkRepository, BookmarkRepositoryError,
    CollectionRepository, CollectionRepositoryError, Mailer, MailerError, MetadataSource,
    NewBookmarkRecord, TagRepository, TagRepositoryError, UserRepository, UserRepositoryError,
};
use backend::domain::tag::Tag;
use backend::domain::user::{NewUser, OwnerId, TimedToken, User};

/// Account store backed by a vector.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    fn edit(&self, id: &OwnerId, apply: impl FnOnce(&mut User)) {
        let mut users = self.users.lock().expect("user store poisoned");
        if let Some(user) = users.iter_mut().find(|u| u.id == *id) {
            apply(user);
            user.updated_at = Utc::now();
        }
    }

    fn find_where(&self, matches: impl Fn(&User) -> bool) -> Option<User> {
        let users = self.users.lock().expect("user store poisoned");
        users.iter().find(|u| matches(u)).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut users = self.users.lock().expect("user store poisoned");
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::duplicate_email(user.email));
        }
        let now = Utc::now();
        let stored = User {
            id: OwnerId::random(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            is_email_verified: false,
            email_verification: Some(user.email_verification),
            password_reset: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &OwnerId) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.find_where(|u| u.id == *id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.find_where(|u| u.email == email))
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.find_where(|u| u.refresh_token.as_deref() == Some(token)))
    }

    async fn set_refresh_token<'a>(
        &self,
        id: &OwnerId,
        token: Option<&'a str>,
    ) -> Result<(), UserRepositoryError> {
        self.edit(id, |u| u.refresh_token = token.map(str::to_owned));
        Ok(())
    }

    async fn clear_refresh_token(&self, token: &str) -> Result<(), UserRepositoryError> {
        let mut users = self.users.lock().expect("user store poisoned");
        for user in users.iter_mut() {
            if user.refresh_token.as_deref() == Some(token) {
                user.refresh_token = None;
                user.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.find_where(|u| {
            u.email_verification
                .as_ref()
                .is_some_and(|t| t.token == token)
        }))
    }

    async fn mark_email_verified(&self, id: &OwnerId) -> Result<(), UserRepositoryError> {
        self.edit(id, |u| {
            u.is_email_verified = true;
            u.email_verification = None;
        });
        Ok(())
    }

    async fn set_password_reset(
        &self,
        id: &OwnerId,
        token: &TimedToken,
    ) -> Result<(), UserRepositoryError> {
        self.edit(id, |u| u.password_reset = Some(token.clone()));
        Ok(())
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.find_where(|u| u.password_reset.as_ref().is_some_and(|t| t.token == token)))
    }

    async fn update_password(
        &self,
        id: &OwnerId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        self.edit(id, |u| {
            u.password_hash = password_hash.to_owned();
            u.password_reset = None;
        });
        Ok(())
    }
}

/// Tag store enforcing `(owner, name)` uniqueness.
#[derive(Default)]
pub struct InMemoryTagRepository {
    tags: Mutex<Vec<Tag>>,
}

#[async_trait]
impl TagRepository for InMemoryTagRepository {
    async fn find_by_name(
        &self,
        owner: &OwnerId,
        name: &str,
    ) -> Result<Option<Tag>, TagRepositoryError> {
        let tags = self.tags.lock().expect("tag store poisoned");
        Ok(tags
            .iter()
            .find(|t| t.owner_id == *owner && t.name == name)
            .cloned())
    }

    async fn insert(&self, owner: &OwnerId, name: &str) -> Result<Tag, TagRepositoryError> {
        let mut tags = self.tags.lock().expect("tag store poisoned");
        if tags.iter().any(|t| t.owner_id == *owner && t.name == name) {
            return Err(TagRepositoryError::duplicate_name(name));
        }
        let tag = Tag {
            id: Uuid::new_v4(),
            owner_id: *owner,
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        tags.push(tag.clone());
        Ok(tag)
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<Tag>, TagRepositoryError> {
        let tags = self.tags.lock().expect("tag store poisoned");
        Ok(tags.iter().filter(|t| t.owner_id == *owner).cloned().collect())
    }

    async fn find_by_ids(
        &self,
        owner: &OwnerId,
        ids: &[Uuid],
    ) -> Result<Vec<Tag>, TagRepositoryError> {
        let tags = self.tags.lock().expect("tag store poisoned");
        Ok(tags
            .iter()
            .filter(|t| t.owner_id == *owner && ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn delete_many(
        &self,
        owner: &OwnerId,
        ids: &[Uuid],
    ) -> Result<u64, TagRepositoryError> {
        let mut tags = self.tags.lock().expect("tag store poisoned");
        let before = tags.len();
        tags.retain(|t| !(t.owner_id == *owner && ids.contains(&t.id)));
        Ok((before - tags.len()) as u64)
    }
}

/// Collection store enforcing `(owner, name)` uniqueness.
#[derive(Default)]
pub struct InMemoryCollectionRepository {
    collections: Mutex<Vec<Collection>>,
}

#[async_trait]
impl CollectionRepository for InMemoryCollectionRepository {
    async fn list(&self, owner: &OwnerId) -> Result<Vec<Collection>, CollectionRepositoryError> {
        let collections = self.collections.lock().expect("collection store poisoned");
        Ok(collections
            .iter()
            .filter(|c| c.owner_id == *owner)
            .cloned()
            .collect())
    }

    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Collection>, CollectionRepositoryError> {
        let collections = self.collections.lock().expect("collection store poisoned");
        Ok(collections
            .iter()
            .find(|c| c.owner_id == *owner && c.id == id)
            .cloned())
    }

    async fn insert(
        &self,
        owner: &OwnerId,
        draft: CollectionDraft,
    ) -> Result<Collection, CollectionRepositoryError> {
        let mut collections = self.collections.lock().expect("collection store poisoned");
        if collections
            .iter()
            .any(|c| c.owner_id == *owner && c.name == draft.name)
        {
            return Err(CollectionRepositoryError::duplicate_name(draft.name));
        }
        let now = Utc::now();
        let collection = Collection {
            id: Uuid::new_v4(),
            owner_id: *owner,
            name: draft.name,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };
        collections.push(collection.clone());
        Ok(collection)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        draft: CollectionDraft,
    ) -> Result<Option<Collection>, CollectionRepositoryError> {
        let mut collections = self.collections.lock().expect("collection store poisoned");
        if collections
            .iter()
            .any(|c| c.owner_id == *owner && c.id != id && c.name == draft.name)
        {
            return Err(CollectionRepositoryError::duplicate_name(draft.name));
        }
        let Some(collection) = collections
            .iter_mut()
            .find(|c| c.owner_id == *owner && c.id == id)
        else {
            return Ok(None);
        };
        collection.name = draft.name;
        collection.description = draft.description;
        collection.updated_at = Utc::now();
        Ok(Some(collection.clone()))
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<bool, CollectionRepositoryError> {
        let mut collections = self.collections.lock().expect("collection store poisoned");
        let before = collections.len();
        collections.retain(|c| !(c.owner_id == *owner && c.id == id));
        Ok(collections.len() < before)
    }
}

/// Bookmark store with newest-first paging.
#[derive(Default)]
pub struct InMemoryBookmarkRepository {
    bookmarks: Mutex<Vec<Bookmark>>,
}

fn matches(bookmark: &Bookmark, filter: &BookmarkFilter) -> bool {
    match filter {
        BookmarkFilter::All => true,
        BookmarkFilter::AllTags(ids) => ids.iter().all(|id| bookmark.tag_ids.contains(id)),
        BookmarkFilter::Collection(id) => bookmark.collection_id == Some(*id),
        BookmarkFilter::Search(term) => {
            let needle = term.to_lowercase();
            let mut haystacks = vec![bookmark.title.clone(), bookmark.url.clone()];
            haystacks.extend(bookmark.note.clone());
            haystacks.extend(bookmark.meta.title.clone());
            haystacks.extend(bookmark.meta.description.clone());
            haystacks.extend(bookmark.meta.site_name.clone());
            haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
        }
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryBookmarkRepository {
    async fn insert(
        &self,
        owner: &OwnerId,
        record: NewBookmarkRecord,
    ) -> Result<Bookmark, BookmarkRepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        let now = Utc::now();
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            owner_id: *owner,
            title: record.title,
            url: record.url,
            note: record.note,
            tag_ids: record.tag_ids,
            collection_id: record.collection_id,
            meta: record.meta,
            created_at: now,
            updated_at: now,
        };
        bookmarks.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn find(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        Ok(bookmarks
            .iter()
            .find(|b| b.owner_id == *owner && b.id == id)
            .cloned())
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        changes: BookmarkChanges,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        let Some(bookmark) = bookmarks
            .iter_mut()
            .find(|b| b.owner_id == *owner && b.id == id)
        else {
            return Ok(None);
        };
        bookmark.title = changes.title;
        bookmark.url = changes.url;
        bookmark.note = changes.note;
        bookmark.tag_ids = changes.tag_ids;
        match changes.collection {
            CollectionPatch::Unchanged => {}
            CollectionPatch::Clear => bookmark.collection_id = None,
            CollectionPatch::Set(collection) => bookmark.collection_id = Some(collection),
        }
        if let Some(meta) = changes.meta {
            bookmark.meta = meta;
        }
        bookmark.updated_at = Utc::now();
        Ok(Some(bookmark.clone()))
    }

    async fn delete(
        &self,
        owner: &OwnerId,
        id: Uuid,
    ) -> Result<Option<Bookmark>, BookmarkRepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        let index = bookmarks
            .iter()
            .position(|b| b.owner_id == *owner && b.id == id);
        Ok(index.map(|i| bookmarks.remove(i)))
    }

    async fn page(
        &self,
        owner: &OwnerId,
        filter: &BookmarkFilter,
        request: PageRequest,
    ) -> Result<(Vec<Bookmark>, u64), BookmarkRepositoryError> {
        let bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        let mut matched: Vec<Bookmark> = bookmarks
            .iter()
            .filter(|b| b.owner_id == *owner && matches(b, filter))
            .cloned()
            .collect();
        matched.reverse();
        let total = matched.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(0);
        let items = matched
            .into_iter()
            .skip(offset)
            .take(request.limit() as usize)
            .collect();
        Ok((items, total))
    }

    async fn set_metadata(
        &self,
        owner: &OwnerId,
        id: Uuid,
        meta: &PageMetadata,
    ) -> Result<(), BookmarkRepositoryError> {
        let mut bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        if let Some(bookmark) = bookmarks
            .iter_mut()
            .find(|b| b.owner_id == *owner && b.id == id)
        {
            bookmark.meta = meta.clone();
            bookmark.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn referenced_tag_ids<'a>(
        &self,
        owner: &OwnerId,
        candidates: Option<&'a [Uuid]>,
    ) -> Result<HashSet<Uuid>, BookmarkRepositoryError> {
        let bookmarks = self.bookmarks.lock().expect("bookmark store poisoned");
        let mut referenced: HashSet<Uuid> = bookmarks
            .iter()
            .filter(|b| b.owner_id == *owner)
            .flat_map(|b| b.tag_ids.iter().copied())
            .collect();
        if let Some(ids) = candidates {
            let wanted: HashSet<Uuid> = ids.iter().copied().collect();
            referenced.retain(|id| wanted.contains(id));
        }
        Ok(referenced)
    }
}

/// Metadata source returning a fixed block and counting fetches.
pub struct ScriptedMetadataSource {
    meta: PageMetadata,
    fetches: AtomicU64,
}

impl ScriptedMetadataSource {
    pub fn new(meta: PageMetadata) -> Self {
        Self {
            meta,
            fetches: AtomicU64::new(0),
        }
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataSource for ScriptedMetadataSource {
    async fn fetch(&self, _url: &str) -> PageMetadata {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.meta.clone()
    }
}

/// Mailer recording every delivered token.
#[derive(Default)]
pub struct RecordingMailer {
    verifications: Mutex<Vec<(String, String)>>,
    resets: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn last_verification_token(&self, email: &str) -> Option<String> {
        let sent = self.verifications.lock().expect("mailer poisoned");
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }

    pub fn last_reset_token(&self, email: &str) -> Option<String> {
        let sent = self.resets.lock().expect("mailer poisoned");
        sent.iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &str, token: &str) -> Result<(), MailerError> {
        self.verifications
            .lock()
            .expect("mailer poisoned")
            .push((email.to_owned(), token.to_owned()));
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, token: &str) -> Result<(), MailerError> {
        self.resets
            .lock()
            .expect("mailer poisoned")
            .push((email.to_owned(), token.to_owned()));
        Ok(())
    }
}
