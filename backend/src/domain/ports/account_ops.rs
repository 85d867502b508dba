//! Driving port for account and session operations.
//!
//! Token *signing* is a transport concern and lives in the HTTP adapter; this
//! port covers credential checks, refresh-token custody, and the time-boxed
//! verification/reset token exchanges.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::user::{OwnerId, User};

/// Validated input for registration.
///
/// Field-level validation (e-mail shape, password policy) happens at the HTTP
/// boundary; by the time this struct reaches the service the values are
/// well-formed.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Display name.
    pub name: String,
    /// E-mail address.
    pub email: String,
    /// Plaintext password, hashed inside the service.
    pub password: String,
}

/// Use-cases over accounts and sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountOps: Send + Sync {
    /// Register a new account, issue its verification token, and hand it to
    /// the mailer. Duplicate e-mail surfaces as a conflict.
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error>;

    /// Check credentials. Unknown e-mail and wrong password are
    /// indistinguishable; an unverified e-mail is a distinct forbidden error.
    async fn login(&self, email: &str, password: &str) -> Result<User, Error>;

    /// Persist the refresh token the transport just issued for the account.
    async fn store_refresh_token(&self, owner: &OwnerId, token: &str) -> Result<(), Error>;

    /// Resolve the account a presented refresh token belongs to; the stored
    /// value must match exactly, otherwise the session is rejected.
    async fn take_refresh_user(&self, presented: &str) -> Result<User, Error>;

    /// Invalidate whatever session holds the presented refresh token.
    async fn logout(&self, presented: &str) -> Result<(), Error>;

    /// Exchange a time-boxed verification token for verified status.
    async fn verify_email(&self, token: &str) -> Result<(), Error>;

    /// Issue a password reset token when the e-mail exists; the result never
    /// reveals whether it did.
    async fn request_password_reset(&self, email: &str) -> Result<(), Error>;

    /// Exchange a time-boxed reset token for a new password.
    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), Error>;

    /// Sanitisable profile of the authenticated account.
    async fn profile(&self, owner: &OwnerId) -> Result<User, Error>;
}
