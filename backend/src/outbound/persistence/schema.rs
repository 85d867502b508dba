//! Diesel table definitions for the bookmark store.

diesel::table! {
    /// Registered accounts with credential and token state.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Login email, unique across all accounts.
        email -> Varchar,
        /// Argon2 PHC password hash.
        password_hash -> Text,
        /// Whether the email address has been confirmed.
        is_email_verified -> Bool,
        /// Outstanding email verification token, if any.
        verification_token -> Nullable<Text>,
        /// Expiry of the verification token.
        verification_expires_at -> Nullable<Timestamptz>,
        /// Outstanding password reset token, if any.
        reset_token -> Nullable<Text>,
        /// Expiry of the reset token.
        reset_expires_at -> Nullable<Timestamptz>,
        /// Currently valid refresh token, cleared on logout.
        refresh_token -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-owner labels, unique by name within an owner.
    tags (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning account.
        owner_id -> Uuid,
        /// Normalised tag name.
        name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-owner named groupings of bookmarks.
    collections (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning account.
        owner_id -> Uuid,
        /// Collection name, unique within an owner.
        name -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Saved links with denormalised tag references and fetched page metadata.
    bookmarks (id) {
        /// Primary key.
        id -> Uuid,
        /// Owning account.
        owner_id -> Uuid,
        /// User-supplied title.
        title -> Varchar,
        /// Saved URL.
        url -> Text,
        /// Optional free-text note.
        note -> Nullable<Text>,
        /// Tag references stored inline; stale ids are tolerated.
        tag_ids -> Array<Uuid>,
        /// Optional collection membership; not a foreign key, stale refs allowed.
        collection_id -> Nullable<Uuid>,
        /// Fetched page title.
        meta_title -> Nullable<Text>,
        /// Fetched page description.
        meta_description -> Nullable<Text>,
        /// Fetched preview image URL.
        meta_image -> Nullable<Text>,
        /// Fetched video URL.
        meta_video -> Nullable<Text>,
        /// Fetched site name.
        meta_site_name -> Nullable<Text>,
        /// Fetched publication timestamp.
        meta_published_at -> Nullable<Timestamptz>,
        /// Fetched author.
        meta_author -> Nullable<Text>,
        /// Fetched content type hint.
        meta_content_type -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, tags, collections, bookmarks);
