//! Tag HTTP handlers.
//!
//! ```text
//! GET    /api/tags
//! POST   /api/tags
//! DELETE /api/tags/{id}
//! POST   /api/tags/cleanup
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::inbound::http::bookmarks::TagResponse;
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_non_empty;

/// Find-or-create payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagRequest {
    pub name: Option<String>,
}

/// Result of a garbage collection sweep.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// All tags of the authenticated account.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Tags", body = [TagResponse]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
#[get("/api/tags")]
pub async fn list_tags(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TagResponse>>> {
    let tags = state.tags.list(session.owner()).await?;
    Ok(web::Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Find a tag by name or create it; always responds 201 with the tag.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TagRequest,
    responses(
        (status = 201, description = "Existing or freshly created tag", body = TagResponse),
        (status = 400, description = "Blank name", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
#[post("/api/tags")]
pub async fn create_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TagRequest>,
) -> ApiResult<HttpResponse> {
    let name = require_non_empty(payload.name.as_deref().unwrap_or(""), "name")?;
    let tag = state.tags.find_or_create(session.owner(), &name).await?;
    Ok(HttpResponse::Created().json(TagResponse::from(tag)))
}

/// Delete a tag directly; idempotent.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = Uuid, Path, description = "Tag identifier")),
    responses(
        (status = 204, description = "Tag deleted (or was already absent)"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["tags"],
    operation_id = "deleteTag"
)]
#[delete("/api/tags/{id}")]
pub async fn delete_tag(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.tags.delete(session.owner(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Sweep all of the account's tags, deleting the unreferenced ones.
#[utoipa::path(
    post,
    path = "/api/tags/cleanup",
    responses(
        (status = 200, description = "Sweep result", body = CleanupResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["tags"],
    operation_id = "cleanupTags"
)]
#[post("/api/tags/cleanup")]
pub async fn cleanup_tags(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CleanupResponse>> {
    let deleted_count = state.tags.sweep(session.owner()).await?;
    Ok(web::Json(CleanupResponse {
        message: "Unused tags cleaned up".into(),
        deleted_count,
    }))
}
