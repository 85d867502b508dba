//! Domain layer: entities, ports and the services behind the driving ports.
//!
//! Nothing in here touches HTTP, SQL or the network; adapters plug in through
//! the traits under [`ports`].

mod account_service;
pub mod bookmark;
mod bookmark_service;
pub mod collection;
mod collection_service;
mod error;
pub mod ports;
pub mod tag;
mod tag_service;
pub mod user;

pub use account_service::{AccountService, hash_password, verify_password};
pub use bookmark_service::BookmarkService;
pub use collection_service::CollectionService;
pub use error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use tag_service::TagLifecycleService;
