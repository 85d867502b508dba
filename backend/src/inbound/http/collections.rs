//! Collection HTTP handlers.
//!
//! ```text
//! GET    /api/collections
//! POST   /api/collections
//! GET    /api/collections/{id}
//! PUT    /api/collections/{id}
//! DELETE /api/collections/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::collection::{Collection, CollectionDraft};
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_non_empty;

/// Create/update payload for a collection.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Collection response payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Collection> for CollectionResponse {
    fn from(value: Collection) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            description: value.description,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

fn parse_draft(payload: CollectionRequest) -> Result<CollectionDraft, ApiError> {
    let name = require_non_empty(payload.name.as_deref().unwrap_or(""), "name")?;
    let description = payload
        .description
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty());
    Ok(CollectionDraft { name, description })
}

/// All collections of the authenticated account.
#[utoipa::path(
    get,
    path = "/api/collections",
    responses(
        (status = 200, description = "Collections", body = [CollectionResponse]),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["collections"],
    operation_id = "listCollections"
)]
#[get("/api/collections")]
pub async fn list_collections(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CollectionResponse>>> {
    let collections = state.collections.list(session.owner()).await?;
    Ok(web::Json(
        collections
            .into_iter()
            .map(CollectionResponse::from)
            .collect(),
    ))
}

/// Create a collection; duplicate names fail with a `conflict` body.
#[utoipa::path(
    post,
    path = "/api/collections",
    request_body = CollectionRequest,
    responses(
        (status = 201, description = "Collection created", body = CollectionResponse),
        (status = 400, description = "Validation failure or duplicate name", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["collections"],
    operation_id = "createCollection"
)]
#[post("/api/collections")]
pub async fn create_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CollectionRequest>,
) -> ApiResult<HttpResponse> {
    let draft = parse_draft(payload.into_inner())?;
    let collection = state.collections.create(session.owner(), draft).await?;
    Ok(HttpResponse::Created().json(CollectionResponse::from(collection)))
}

/// Fetch one collection.
#[utoipa::path(
    get,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection identifier")),
    responses(
        (status = 200, description = "The collection", body = CollectionResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "No such collection for this account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["collections"],
    operation_id = "getCollection"
)]
#[get("/api/collections/{id}")]
pub async fn get_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CollectionResponse>> {
    let collection = state
        .collections
        .get(session.owner(), path.into_inner())
        .await?;
    Ok(web::Json(CollectionResponse::from(collection)))
}

/// Rename or re-describe a collection.
#[utoipa::path(
    put,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection identifier")),
    request_body = CollectionRequest,
    responses(
        (status = 200, description = "Updated collection", body = CollectionResponse),
        (status = 400, description = "Validation failure or duplicate name", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "No such collection for this account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["collections"],
    operation_id = "updateCollection"
)]
#[put("/api/collections/{id}")]
pub async fn update_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CollectionRequest>,
) -> ApiResult<web::Json<CollectionResponse>> {
    let draft = parse_draft(payload.into_inner())?;
    let collection = state
        .collections
        .update(session.owner(), path.into_inner(), draft)
        .await?;
    Ok(web::Json(CollectionResponse::from(collection)))
}

/// Delete a collection. Member bookmarks keep their reference.
#[utoipa::path(
    delete,
    path = "/api/collections/{id}",
    params(("id" = Uuid, Path, description = "Collection identifier")),
    responses(
        (status = 204, description = "Collection deleted"),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "No such collection for this account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["collections"],
    operation_id = "deleteCollection"
)]
#[delete("/api/collections/{id}")]
pub async fn delete_collection(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .collections
        .delete(session.owner(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
