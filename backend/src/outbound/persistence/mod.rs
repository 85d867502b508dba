//! PostgreSQL persistence adapters built on Diesel.

mod diesel_bookmark_repository;
mod diesel_collection_repository;
mod diesel_tag_repository;
mod diesel_user_repository;
mod error_map;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_bookmark_repository::DieselBookmarkRepository;
pub use diesel_collection_repository::DieselCollectionRepository;
pub use diesel_tag_repository::DieselTagRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
