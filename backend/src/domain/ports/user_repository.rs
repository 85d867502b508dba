//! Port for account persistence.

use async_trait::async_trait;

use crate::domain::user::{NewUser, OwnerId, TimedToken, User};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The e-mail address is already registered.
        DuplicateEmail { email: String } =>
            "email already registered: {email}",
    }
}

/// Port for storing and retrieving accounts.
///
/// E-mail uniqueness is enforced by the store; adapters translate the unique
/// violation into [`UserRepositoryError::DuplicateEmail`] so the service can
/// surface a conflict rather than a generic failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account.
    async fn insert(&self, user: NewUser) -> Result<User, UserRepositoryError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &OwnerId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account by e-mail address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch the account currently holding the given refresh token.
    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace (or clear) the stored refresh token for an account.
    async fn set_refresh_token<'a>(
        &self,
        id: &OwnerId,
        token: Option<&'a str>,
    ) -> Result<(), UserRepositoryError>;

    /// Clear the refresh token wherever the given value is stored.
    ///
    /// A no-op when no account holds the value; logout must not leak whether
    /// the presented token was live.
    async fn clear_refresh_token(&self, token: &str) -> Result<(), UserRepositoryError>;

    /// Fetch the account holding the given e-mail verification token.
    ///
    /// Expiry is checked by the caller; the repository only matches the value.
    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Mark the e-mail verified and clear the verification token pair.
    async fn mark_email_verified(&self, id: &OwnerId) -> Result<(), UserRepositoryError>;

    /// Store a password reset token pair on the account.
    async fn set_password_reset(
        &self,
        id: &OwnerId,
        token: &TimedToken,
    ) -> Result<(), UserRepositoryError>;

    /// Fetch the account holding the given password reset token.
    async fn find_by_reset_token(&self, token: &str)
    -> Result<Option<User>, UserRepositoryError>;

    /// Replace the password hash and clear the reset token pair.
    async fn update_password(
        &self,
        id: &OwnerId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError>;
}
