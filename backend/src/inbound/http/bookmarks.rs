//! Bookmark HTTP handlers.
//!
//! ```text
//! POST   /api/bookmarks
//! GET    /api/bookmarks
//! GET    /api/bookmarks/search
//! GET    /api/bookmarks/by-tag/{tagIds}
//! GET    /api/bookmarks/by-collection/{collectionId}
//! PUT    /api/bookmarks/{id}
//! DELETE /api/bookmarks/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageEnvelope, PageRequest};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::bookmark::{
    BookmarkDraft, BookmarkUpdate, BookmarkView, CollectionPatch, PageMetadata,
};
use crate::domain::tag::Tag;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, parse_uuid_list, require_non_empty};

const DEFAULT_LIST_LIMIT: u32 = 20;
const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Distinguishes an omitted field (`None`) from an explicit JSON `null`
/// (`Some(None)`).
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

/// Create/update payload for a bookmark.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// On update: omitted keeps the stored collection, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub collection_id: Option<Option<Uuid>>,
}

/// Page/limit query parameters shared by list endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PageQuery {
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; clamped to 100.
    pub limit: Option<u32>,
}

/// Search query parameters.
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Substring to match; an empty value yields an empty result set.
    pub q: Option<String>,
    /// One-based page number; defaults to 1.
    pub page: Option<u32>,
    /// Page size; clamped to 100.
    pub limit: Option<u32>,
}

/// Tag projection embedded in bookmark responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(value: Tag) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

/// Scraped metadata block in bookmark responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub video: Option<String>,
    pub site_name: Option<String>,
    pub published_at: Option<String>,
    pub author: Option<String>,
    pub content_type: Option<String>,
}

impl From<PageMetadata> for MetadataResponse {
    fn from(value: PageMetadata) -> Self {
        Self {
            title: value.title,
            description: value.description,
            image: value.image,
            video: value.video,
            site_name: value.site_name,
            published_at: value.published_at.map(|at| at.to_rfc3339()),
            author: value.author,
            content_type: value.content_type,
        }
    }
}

/// Bookmark response payload with tags expanded.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub id: String,
    pub title: String,
    pub url: String,
    pub note: Option<String>,
    pub tags: Vec<TagResponse>,
    pub collection_id: Option<String>,
    pub meta: MetadataResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BookmarkView> for BookmarkResponse {
    fn from(value: BookmarkView) -> Self {
        let BookmarkView { bookmark, tags } = value;
        Self {
            id: bookmark.id.to_string(),
            title: bookmark.title,
            url: bookmark.url,
            note: bookmark.note,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            collection_id: bookmark.collection_id.map(|id| id.to_string()),
            meta: MetadataResponse::from(bookmark.meta),
            created_at: bookmark.created_at.to_rfc3339(),
            updated_at: bookmark.updated_at.to_rfc3339(),
        }
    }
}

/// One page of bookmarks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookmarkPage {
    pub items: Vec<BookmarkResponse>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl From<PageEnvelope<BookmarkView>> for BookmarkPage {
    fn from(value: PageEnvelope<BookmarkView>) -> Self {
        let envelope = value.map(BookmarkResponse::from);
        Self {
            items: envelope.items,
            total: envelope.total,
            page: envelope.page,
            pages: envelope.pages,
        }
    }
}

fn validate_url(raw: Option<&str>) -> Result<String, ApiError> {
    let value = require_non_empty(raw.unwrap_or(""), "url")?;
    url::Url::parse(&value)
        .map_err(|_| field_error("url", "url is malformed", "invalid_url"))?;
    Ok(value)
}

fn parse_draft(payload: BookmarkRequest) -> Result<BookmarkDraft, ApiError> {
    let title = require_non_empty(payload.title.as_deref().unwrap_or(""), "title")?;
    let url = validate_url(payload.url.as_deref())?;
    Ok(BookmarkDraft {
        title,
        url,
        note: payload.note,
        tag_names: payload.tags,
        collection_id: payload.collection_id.flatten(),
    })
}

fn parse_update(payload: BookmarkRequest) -> Result<BookmarkUpdate, ApiError> {
    let title = require_non_empty(payload.title.as_deref().unwrap_or(""), "title")?;
    let url = validate_url(payload.url.as_deref())?;
    let collection = match payload.collection_id {
        None => CollectionPatch::Unchanged,
        Some(None) => CollectionPatch::Clear,
        Some(Some(id)) => CollectionPatch::Set(id),
    };
    Ok(BookmarkUpdate {
        title,
        url,
        note: payload.note,
        tag_names: payload.tags,
        collection,
    })
}

/// Create a bookmark, enriching it with page metadata best-effort.
#[utoipa::path(
    post,
    path = "/api/bookmarks",
    request_body = BookmarkRequest,
    responses(
        (status = 201, description = "Bookmark created", body = BookmarkResponse),
        (status = 400, description = "Validation failure", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "createBookmark"
)]
#[post("/api/bookmarks")]
pub async fn create_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookmarkRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let view = state.bookmarks.create(session.owner(), draft).await?;
    Ok(HttpResponse::Created().json(BookmarkResponse::from(view)))
}

/// Newest-first listing of the owner's bookmarks.
#[utoipa::path(
    get,
    path = "/api/bookmarks",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of bookmarks", body = BookmarkPage),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "listBookmarks"
)]
#[get("/api/bookmarks")]
pub async fn list_bookmarks(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<BookmarkPage>> {
    let request = PageRequest::from_query(query.page, query.limit, DEFAULT_LIST_LIMIT);
    let envelope = state.bookmarks.list(session.owner(), request).await?;
    Ok(web::Json(BookmarkPage::from(envelope)))
}

/// Case-insensitive substring search across titles, URLs, notes and metadata.
#[utoipa::path(
    get,
    path = "/api/bookmarks/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching bookmarks", body = BookmarkPage),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "searchBookmarks"
)]
#[get("/api/bookmarks/search")]
pub async fn search_bookmarks(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SearchQuery>,
) -> ApiResult<web::Json<BookmarkPage>> {
    let request = PageRequest::from_query(query.page, query.limit, DEFAULT_SEARCH_LIMIT);
    let envelope = state
        .bookmarks
        .search(session.owner(), query.q.as_deref().unwrap_or(""), request)
        .await?;
    Ok(web::Json(BookmarkPage::from(envelope)))
}

/// Bookmarks holding every listed tag.
#[utoipa::path(
    get,
    path = "/api/bookmarks/by-tag/{tagIds}",
    params(
        ("tagIds" = String, Path, description = "Comma-separated tag identifiers; a bookmark must hold all of them"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Bookmarks holding all listed tags", body = BookmarkPage),
        (status = 400, description = "Malformed tag identifier", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "bookmarksByTag"
)]
#[get("/api/bookmarks/by-tag/{tag_ids}")]
pub async fn bookmarks_by_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<BookmarkPage>> {
    let tag_ids = parse_uuid_list(&path.into_inner(), "tagIds")?;
    let request = PageRequest::from_query(query.page, query.limit, DEFAULT_LIST_LIMIT);
    let envelope = state
        .bookmarks
        .list_by_tags(session.owner(), tag_ids, request)
        .await?;
    Ok(web::Json(BookmarkPage::from(envelope)))
}

/// Bookmarks inside one collection.
#[utoipa::path(
    get,
    path = "/api/bookmarks/by-collection/{collectionId}",
    params(
        ("collectionId" = Uuid, Path, description = "Collection identifier"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Bookmarks in the collection", body = BookmarkPage),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "bookmarksByCollection"
)]
#[get("/api/bookmarks/by-collection/{collection_id}")]
pub async fn bookmarks_by_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<BookmarkPage>> {
    let request = PageRequest::from_query(query.page, query.limit, DEFAULT_LIST_LIMIT);
    let envelope = state
        .bookmarks
        .list_by_collection(session.owner(), path.into_inner(), request)
        .await?;
    Ok(web::Json(BookmarkPage::from(envelope)))
}

/// Replace the mutable fields of a bookmark.
#[utoipa::path(
    put,
    path = "/api/bookmarks/{id}",
    params(("id" = Uuid, Path, description = "Bookmark identifier")),
    request_body = BookmarkRequest,
    responses(
        (status = 200, description = "Updated bookmark", body = BookmarkResponse),
        (status = 400, description = "Validation failure", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "No such bookmark for this account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "updateBookmark"
)]
#[put("/api/bookmarks/{id}")]
pub async fn update_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<BookmarkRequest>,
) -> ApiResult<web::Json<BookmarkResponse>> {
    let update = parse_update(payload.into_inner())?;
    let view = state
        .bookmarks
        .update(session.owner(), path.into_inner(), update)
        .await?;
    Ok(web::Json(BookmarkResponse::from(view)))
}

/// Delete a bookmark and garbage-collect its tags.
#[utoipa::path(
    delete,
    path = "/api/bookmarks/{id}",
    params(("id" = Uuid, Path, description = "Bookmark identifier")),
    responses(
        (status = 204, description = "Bookmark deleted"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "No such bookmark for this account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["bookmarks"],
    operation_id = "deleteBookmark"
)]
#[delete("/api/bookmarks/{id}")]
pub async fn delete_bookmark(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .bookmarks
        .delete(session.owner(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
