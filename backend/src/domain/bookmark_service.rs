//! Bookmark use-cases: CRUD, listings, search, metadata enrichment and the
//! tag garbage collection hooks.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageEnvelope, PageRequest};
use tracing::warn;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::bookmark::{
    Bookmark, BookmarkDraft, BookmarkUpdate, BookmarkView, PageMetadata,
};
use crate::domain::ports::{
    BookmarkChanges, BookmarkFilter, BookmarkOps, BookmarkRepository, BookmarkRepositoryError,
    MetadataSource, NewBookmarkRecord, TagRepository, TagRepositoryError,
};
use crate::domain::tag::Tag;
use crate::domain::tag_service::TagLifecycleService;
use crate::domain::user::OwnerId;

/// Service implementing [`BookmarkOps`] over the persistence and metadata
/// ports.
#[derive(Clone)]
pub struct BookmarkService<B, T, M> {
    bookmarks: Arc<B>,
    tags: Arc<T>,
    lifecycle: TagLifecycleService<T, B>,
    metadata: Arc<M>,
}

impl<B, T, M> BookmarkService<B, T, M>
where
    B: BookmarkRepository,
    T: TagRepository,
{
    /// Wire the service over its ports.
    pub fn new(bookmarks: Arc<B>, tags: Arc<T>, metadata: Arc<M>) -> Self {
        let lifecycle = TagLifecycleService::new(Arc::clone(&tags), Arc::clone(&bookmarks));
        Self {
            bookmarks,
            tags,
            lifecycle,
            metadata,
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

fn map_tag_error(error: TagRepositoryError) -> Error {
    match error {
        TagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tag repository unavailable: {message}"))
        }
        other => Error::internal(format!("tag repository error: {other}")),
    }
}

fn not_found() -> Error {
    Error::not_found("Bookmark not found")
}

impl<B, T, M> BookmarkService<B, T, M>
where
    B: BookmarkRepository,
    T: TagRepository,
    M: MetadataSource,
{
    /// Expand one page of bookmarks into views with a single tag lookup.
    async fn expand_page(
        &self,
        owner: &OwnerId,
        items: Vec<Bookmark>,
        total: u64,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        let mut wanted: Vec<Uuid> = items
            .iter()
            .flat_map(|bookmark| bookmark.tag_ids.iter().copied())
            .collect();
        wanted.sort_unstable();
        wanted.dedup();

        let by_id: HashMap<Uuid, Tag> = if wanted.is_empty() {
            HashMap::new()
        } else {
            self.tags
                .find_by_ids(owner, &wanted)
                .await
                .map_err(map_tag_error)?
                .into_iter()
                .map(|tag| (tag.id, tag))
                .collect()
        };

        let views = items
            .into_iter()
            .map(|bookmark| {
                let tags = bookmark
                    .tag_ids
                    .iter()
                    .filter_map(|id| by_id.get(id).cloned())
                    .collect();
                BookmarkView { bookmark, tags }
            })
            .collect();
        Ok(PageEnvelope::new(views, total, request))
    }

    /// Re-fetch metadata for page items whose block lacks a title.
    ///
    /// Fetch and persistence failures are swallowed: listings serve whatever
    /// enrichment is available rather than fail.
    async fn backfill_metadata(&self, owner: &OwnerId, items: &mut [Bookmark]) {
        for bookmark in items.iter_mut().filter(|b| !b.meta.has_title()) {
            let fetched = self.metadata.fetch(&bookmark.url).await;
            if fetched == PageMetadata::default() {
                continue;
            }
            if let Err(error) = self
                .bookmarks
                .set_metadata(owner, bookmark.id, &fetched)
                .await
            {
                warn!(%owner, bookmark_id = %bookmark.id, %error, "failed to persist backfilled metadata");
            }
            bookmark.meta = fetched;
        }
    }

    async fn paged(
        &self,
        owner: &OwnerId,
        filter: BookmarkFilter,
        request: PageRequest,
        backfill: bool,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        let (mut items, total) = self
            .bookmarks
            .page(owner, &filter, request)
            .await
            .map_err(map_bookmark_error)?;
        if backfill {
            self.backfill_metadata(owner, &mut items).await;
        }
        self.expand_page(owner, items, total, request).await
    }

    /// Garbage-collect tags a mutation may have orphaned; failures are logged
    /// because the mutation itself already succeeded.
    async fn collect_tags(&self, owner: &OwnerId, candidates: &[Uuid]) {
        if let Err(error) = self.lifecycle.collect_unreferenced(owner, candidates).await {
            warn!(%owner, %error, "tag garbage collection failed");
        }
    }
}

#[async_trait]
impl<B, T, M> BookmarkOps for BookmarkService<B, T, M>
where
    B: BookmarkRepository,
    T: TagRepository,
    M: MetadataSource,
{
    async fn create(
        &self,
        owner: &OwnerId,
        draft: BookmarkDraft,
    ) -> Result<BookmarkView, Error> {
        let tags = self.lifecycle.resolve_or_create(owner, &draft.tag_names).await?;
        let meta = self.metadata.fetch(&draft.url).await;
        let record = NewBookmarkRecord {
            title: draft.title,
            url: draft.url,
            note: draft.note,
            tag_ids: tags.iter().map(|tag| tag.id).collect(),
            collection_id: draft.collection_id,
            meta,
        };
        let bookmark = self
            .bookmarks
            .insert(owner, record)
            .await
            .map_err(map_bookmark_error)?;
        Ok(BookmarkView { bookmark, tags })
    }

    async fn update(
        &self,
        owner: &OwnerId,
        id: Uuid,
        update: BookmarkUpdate,
    ) -> Result<BookmarkView, Error> {
        let previous = self
            .bookmarks
            .find(owner, id)
            .await
            .map_err(map_bookmark_error)?
            .ok_or_else(not_found)?;

        let tags = self
            .lifecycle
            .resolve_or_create(owner, &update.tag_names)
            .await?;
        let tag_ids: Vec<Uuid> = tags.iter().map(|tag| tag.id).collect();

        // Only a changed URL invalidates the stored metadata block.
        let meta = if update.url == previous.url {
            None
        } else {
            Some(self.metadata.fetch(&update.url).await)
        };

        let changes = BookmarkChanges {
            title: update.title,
            url: update.url,
            note: update.note,
            tag_ids: tag_ids.clone(),
            collection: update.collection,
            meta,
        };
        let bookmark = self
            .bookmarks
            .update(owner, id, changes)
            .await
            .map_err(map_bookmark_error)?
            .ok_or_else(not_found)?;

        let dropped: Vec<Uuid> = previous
            .tag_ids
            .iter()
            .copied()
            .filter(|tag_id| !tag_ids.contains(tag_id))
            .collect();
        self.collect_tags(owner, &dropped).await;

        Ok(BookmarkView { bookmark, tags })
    }

    async fn delete(&self, owner: &OwnerId, id: Uuid) -> Result<(), Error> {
        let removed = self
            .bookmarks
            .delete(owner, id)
            .await
            .map_err(map_bookmark_error)?
            .ok_or_else(not_found)?;
        self.collect_tags(owner, &removed.tag_ids).await;
        Ok(())
    }

    async fn list(
        &self,
        owner: &OwnerId,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        self.paged(owner, BookmarkFilter::All, request, false).await
    }

    async fn search(
        &self,
        owner: &OwnerId,
        query: &str,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(PageEnvelope::empty());
        }
        self.paged(
            owner,
            BookmarkFilter::Search(query.to_owned()),
            request,
            false,
        )
        .await
    }

    async fn list_by_tags(
        &self,
        owner: &OwnerId,
        tag_ids: Vec<Uuid>,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        if tag_ids.is_empty() {
            return Err(Error::invalid_request("at least one tag id is required"));
        }
        self.paged(owner, BookmarkFilter::AllTags(tag_ids), request, true)
            .await
    }

    async fn list_by_collection(
        &self,
        owner: &OwnerId,
        collection_id: Uuid,
        request: PageRequest,
    ) -> Result<PageEnvelope<BookmarkView>, Error> {
        self.paged(owner, BookmarkFilter::Collection(collection_id), request, true)
            .await
    }
}
