//! Server construction and dependency wiring.

mod config;

pub use config::{ServerConfig, Settings};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{BookmarkOps, EmptyMetadataSource};
use crate::domain::{AccountService, BookmarkService, CollectionService, TagLifecycleService};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session::TokenConfig;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::configure_api;
use crate::middleware::Trace;
use crate::outbound::email::LogMailer;
use crate::outbound::metadata::HttpMetadataSource;
use crate::outbound::persistence::{
    DbPool, DieselBookmarkRepository, DieselCollectionRepository, DieselTagRepository,
    DieselUserRepository,
};

/// Build the HTTP state from database-backed adapters.
fn build_http_state(pool: &DbPool) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let bookmarks = Arc::new(DieselBookmarkRepository::new(pool.clone()));
    let tags = Arc::new(DieselTagRepository::new(pool.clone()));
    let collections = Arc::new(DieselCollectionRepository::new(pool.clone()));
    let bookmark_ops: Arc<dyn BookmarkOps> = match HttpMetadataSource::new() {
        Ok(source) => Arc::new(BookmarkService::new(
            bookmarks.clone(),
            tags.clone(),
            Arc::new(source),
        )),
        Err(err) => {
            warn!(error = %err, "metadata client unavailable, enrichment disabled");
            Arc::new(BookmarkService::new(
                bookmarks.clone(),
                tags.clone(),
                Arc::new(EmptyMetadataSource),
            ))
        }
    };

    HttpState {
        accounts: Arc::new(AccountService::new(users, Arc::new(LogMailer))),
        bookmarks: bookmark_ops,
        tags: Arc::new(TagLifecycleService::new(tags, bookmarks)),
        collections: Arc::new(CollectionService::new(collections)),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    tokens: web::Data<TokenConfig>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        tokens,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(tokens)
        .wrap(Trace)
        .configure(configure_api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct the HTTP server from a pre-built configuration.
///
/// Marks the health state ready once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config.db_pool));
    let tokens = web::Data::new(config.tokens.clone());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            tokens: tokens.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
