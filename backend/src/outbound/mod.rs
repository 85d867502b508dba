//! Driven-side adapters: persistence, metadata fetching, token delivery.

pub mod email;
pub mod metadata;
pub mod persistence;
