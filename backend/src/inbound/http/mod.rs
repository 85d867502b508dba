//! Inbound HTTP adapter: handlers, session guard, error envelope.

pub mod bookmarks;
pub mod collections;
pub mod error;
pub mod health;
pub mod session;
pub mod state;
pub mod tags;
pub mod users;
mod validation;

pub use error::{ApiError, ApiResult};

use actix_web::web;

/// Register every API route on a service config.
///
/// Shared by the server binary and integration tests so both exercise the
/// same routing table. Expects `HttpState` and `TokenConfig` to be supplied
/// as app data by the caller.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::register)
        .service(users::login)
        .service(users::refresh_token)
        .service(users::logout)
        .service(users::verify_email)
        .service(users::forgot_password)
        .service(users::reset_password)
        .service(users::current_user)
        .service(bookmarks::create_bookmark)
        .service(bookmarks::list_bookmarks)
        .service(bookmarks::search_bookmarks)
        .service(bookmarks::bookmarks_by_tag)
        .service(bookmarks::bookmarks_by_collection)
        .service(bookmarks::update_bookmark)
        .service(bookmarks::delete_bookmark)
        .service(tags::list_tags)
        .service(tags::create_tag)
        .service(tags::delete_tag)
        .service(tags::cleanup_tags)
        .service(collections::list_collections)
        .service(collections::create_collection)
        .service(collections::get_collection)
        .service(collections::update_collection)
        .service(collections::delete_collection);
}
