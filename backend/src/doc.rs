//! OpenAPI documentation.
//!
//! [`ApiDoc`] aggregates every annotated HTTP path plus the request and
//! response schemas. The generated document feeds Swagger UI in debug builds.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::bookmarks::{
    BookmarkPage, BookmarkRequest, BookmarkResponse, MetadataResponse, TagResponse,
};
use crate::inbound::http::collections::{CollectionRequest, CollectionResponse};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::tags::{CleanupResponse, TagRequest};
use crate::inbound::http::users::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest,
    UserResponse, VerifyEmailRequest,
};

/// Register the access-token cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "AccessTokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "accessToken",
                "JWT access cookie issued by POST /api/users/login.",
            ))),
        );
    }
}

/// OpenAPI document for the bookmark API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookmark backend API",
        description = "Cookie-authenticated REST interface for bookmarks, \
                       tags, collections and accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AccessTokenCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::refresh_token,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::verify_email,
        crate::inbound::http::users::forgot_password,
        crate::inbound::http::users::reset_password,
        crate::inbound::http::users::current_user,
        crate::inbound::http::bookmarks::create_bookmark,
        crate::inbound::http::bookmarks::list_bookmarks,
        crate::inbound::http::bookmarks::search_bookmarks,
        crate::inbound::http::bookmarks::bookmarks_by_tag,
        crate::inbound::http::bookmarks::bookmarks_by_collection,
        crate::inbound::http::bookmarks::update_bookmark,
        crate::inbound::http::bookmarks::delete_bookmark,
        crate::inbound::http::tags::list_tags,
        crate::inbound::http::tags::create_tag,
        crate::inbound::http::tags::delete_tag,
        crate::inbound::http::tags::cleanup_tags,
        crate::inbound::http::collections::list_collections,
        crate::inbound::http::collections::create_collection,
        crate::inbound::http::collections::get_collection,
        crate::inbound::http::collections::update_collection,
        crate::inbound::http::collections::delete_collection,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        VerifyEmailRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        UserResponse,
        MessageResponse,
        BookmarkRequest,
        BookmarkResponse,
        BookmarkPage,
        MetadataResponse,
        TagRequest,
        TagResponse,
        CleanupResponse,
        CollectionRequest,
        CollectionResponse,
    )),
    tags(
        (name = "users", description = "Registration, sessions and account recovery"),
        (name = "bookmarks", description = "Bookmark CRUD, listings and search"),
        (name = "tags", description = "Tag listing and lifecycle maintenance"),
        (name = "collections", description = "Collection CRUD"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_names_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.starts_with("/api/users")));
        assert!(paths.iter().any(|p| p.starts_with("/api/bookmarks")));
        assert!(paths.iter().any(|p| p.starts_with("/api/tags")));
        assert!(paths.iter().any(|p| p.starts_with("/api/collections")));
        assert!(paths.iter().any(|p| p.starts_with("/health")));
    }

    #[test]
    fn error_schema_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap_or_default();
        assert!(components.schemas.contains_key("ApiError"));
        assert!(components.schemas.contains_key("ErrorCode"));
    }
}
