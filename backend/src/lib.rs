//! Bookmark backend library.
//!
//! Hexagonal layout: `domain` holds the entities, ports and services;
//! `inbound` the HTTP adapter; `outbound` the persistence, metadata and mail
//! adapters; `server` wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware.
pub use middleware::Trace;
