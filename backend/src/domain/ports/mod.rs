//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (repositories, metadata source, mailer) are implemented by
//! outbound adapters; driving ports (`*Ops`) are implemented by the domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_ops;
mod bookmark_ops;
mod bookmark_repository;
mod collection_ops;
mod collection_repository;
mod mailer;
mod metadata_source;
mod tag_ops;
mod tag_repository;
mod user_repository;

pub use account_ops::{AccountOps, RegistrationRequest};
#[cfg(test)]
pub use account_ops::MockAccountOps;
pub use bookmark_ops::BookmarkOps;
#[cfg(test)]
pub use bookmark_ops::MockBookmarkOps;
pub use bookmark_repository::{
    BookmarkChanges, BookmarkFilter, BookmarkRepository, BookmarkRepositoryError,
    NewBookmarkRecord,
};
#[cfg(test)]
pub use bookmark_repository::MockBookmarkRepository;
pub use collection_ops::CollectionOps;
#[cfg(test)]
pub use collection_ops::MockCollectionOps;
pub use collection_repository::{CollectionRepository, CollectionRepositoryError};
#[cfg(test)]
pub use collection_repository::MockCollectionRepository;
pub use mailer::{Mailer, MailerError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use metadata_source::{EmptyMetadataSource, MetadataSource};
#[cfg(test)]
pub use metadata_source::MockMetadataSource;
pub use tag_ops::TagOps;
#[cfg(test)]
pub use tag_ops::MockTagOps;
pub use tag_repository::{TagRepository, TagRepositoryError};
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
