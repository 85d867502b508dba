//! Shared fixtures for the HTTP integration tests.

// Each test binary compiles this module and uses a subset of it.
#![allow(dead_code)]

pub mod memory;

use std::sync::Arc;

use backend::domain::bookmark::PageMetadata;
use backend::domain::{AccountService, BookmarkService, CollectionService, TagLifecycleService};
use backend::inbound::http::session::TokenConfig;
use backend::inbound::http::state::HttpState;

use memory::{
    InMemoryBookmarkRepository, InMemoryCollectionRepository, InMemoryTagRepository,
    InMemoryUserRepository, RecordingMailer, ScriptedMetadataSource,
};

/// Fully wired application state over in-memory stores.
pub struct TestHarness {
    pub state: HttpState,
    pub mailer: Arc<RecordingMailer>,
    pub metadata: Arc<ScriptedMetadataSource>,
}

/// Harness whose metadata source always returns `meta`.
pub fn harness_with_meta(meta: PageMetadata) -> TestHarness {
    let users = Arc::new(InMemoryUserRepository::default());
    let bookmarks = Arc::new(InMemoryBookmarkRepository::default());
    let tags = Arc::new(InMemoryTagRepository::default());
    let collections = Arc::new(InMemoryCollectionRepository::default());
    let mailer = Arc::new(RecordingMailer::default());
    let metadata = Arc::new(ScriptedMetadataSource::new(meta));

    let state = HttpState {
        accounts: Arc::new(AccountService::new(users, mailer.clone())),
        bookmarks: Arc::new(BookmarkService::new(
            bookmarks.clone(),
            tags.clone(),
            metadata.clone(),
        )),
        tags: Arc::new(TagLifecycleService::new(tags, bookmarks)),
        collections: Arc::new(CollectionService::new(collections)),
    };

    TestHarness {
        state,
        mailer,
        metadata,
    }
}

/// Harness whose metadata source never finds anything, as for an unreachable
/// URL.
pub fn harness() -> TestHarness {
    harness_with_meta(PageMetadata::default())
}

/// Token configuration shared by every test app.
pub fn token_config() -> TokenConfig {
    TokenConfig::new("test-access-secret", "test-refresh-secret", false)
}
