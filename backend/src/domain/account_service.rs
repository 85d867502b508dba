//! Account use-cases: registration, credential checks, refresh-token custody
//! and the time-boxed e-mail verification / password reset exchanges.

use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde_json::json;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::{
    AccountOps, Mailer, RegistrationRequest, UserRepository, UserRepositoryError,
};
use crate::domain::user::{NewUser, OwnerId, TimedToken, User};

/// Verification tokens outlive reset tokens by design: registration mail can
/// sit unread for a day, a reset link should not.
const VERIFICATION_TTL_HOURS: i64 = 24;
const RESET_TTL_HOURS: i64 = 1;

/// Service implementing [`AccountOps`] over the user repository and mailer.
#[derive(Clone)]
pub struct AccountService<U, M> {
    users: Arc<U>,
    mailer: Arc<M>,
}

impl<U, M> AccountService<U, M> {
    /// Wire the service over its ports.
    pub fn new(users: Arc<U>, mailer: Arc<M>) -> Self {
        Self { users, mailer }
    }
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::conflict("Email already registered")
        }
    }
}

fn invalid_credentials() -> Error {
    // Unknown e-mail and wrong password share one message so the endpoint
    // cannot be used to probe which addresses exist.
    Error::unauthorized("Invalid email or password")
}

/// Hash a password into PHC string format with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))
}

/// Check a password against a stored PHC hash. An unparseable hash counts as
/// a mismatch.
#[must_use]
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// Generate a hex token from 32 random bytes for out-of-band exchanges.
fn generate_token() -> String {
    let mut bytes = [0_u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn timed_token(ttl_hours: i64) -> TimedToken {
    TimedToken {
        token: generate_token(),
        expires_at: Utc::now() + Duration::hours(ttl_hours),
    }
}

fn token_matches(stored: Option<&TimedToken>, presented: &str, now: DateTime<Utc>) -> bool {
    stored.is_some_and(|token| token.token == presented && token.is_valid_at(now))
}

#[async_trait]
impl<U, M> AccountOps for AccountService<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let password_hash = hash_password(&request.password)?;
        let verification = timed_token(VERIFICATION_TTL_HOURS);
        let user = self
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                email_verification: verification.clone(),
            })
            .await
            .map_err(map_user_error)?;

        // Best-effort: a mail outage must not lose the registration.
        if let Err(error) = self
            .mailer
            .send_verification(&user.email, &verification.token)
            .await
        {
            warn!(user_id = %user.id, %error, "verification mail not delivered");
        }
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, Error> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_credentials)?;
        if !verify_password(&user.password_hash, password) {
            return Err(invalid_credentials());
        }
        if !user.is_email_verified {
            return Err(
                Error::forbidden("Please verify your email before logging in")
                    .with_details(json!({"isEmailVerified": false})),
            );
        }
        Ok(user)
    }

    async fn store_refresh_token(&self, owner: &OwnerId, token: &str) -> Result<(), Error> {
        self.users
            .set_refresh_token(owner, Some(token))
            .await
            .map_err(map_user_error)
    }

    async fn take_refresh_user(&self, presented: &str) -> Result<User, Error> {
        self.users
            .find_by_refresh_token(presented)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("Invalid refresh token"))
    }

    async fn logout(&self, presented: &str) -> Result<(), Error> {
        self.users
            .clear_refresh_token(presented)
            .await
            .map_err(map_user_error)
    }

    async fn verify_email(&self, token: &str) -> Result<(), Error> {
        let rejected = || Error::invalid_request("Invalid or expired verification token");
        let user = self
            .users
            .find_by_verification_token(token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(rejected)?;
        if !token_matches(user.email_verification.as_ref(), token, Utc::now()) {
            return Err(rejected());
        }
        self.users
            .mark_email_verified(&user.id)
            .await
            .map_err(map_user_error)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        // The outcome is identical for known and unknown addresses.
        let Some(user) = self
            .users
            .find_by_email(email)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(());
        };

        let reset = timed_token(RESET_TTL_HOURS);
        self.users
            .set_password_reset(&user.id, &reset)
            .await
            .map_err(map_user_error)?;
        if let Err(error) = self
            .mailer
            .send_password_reset(&user.email, &reset.token)
            .await
        {
            warn!(user_id = %user.id, %error, "password reset mail not delivered");
        }
        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), Error> {
        let rejected = || Error::invalid_request("Invalid or expired reset token");
        let user = self
            .users
            .find_by_reset_token(token)
            .await
            .map_err(map_user_error)?
            .ok_or_else(rejected)?;
        if !token_matches(user.password_reset.as_ref(), token, Utc::now()) {
            return Err(rejected());
        }
        let password_hash = hash_password(new_password)?;
        self.users
            .update_password(&user.id, &password_hash)
            .await
            .map_err(map_user_error)
    }

    async fn profile(&self, owner: &OwnerId) -> Result<User, Error> {
        self.users
            .find_by_id(owner)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockMailer, MockUserRepository};
    use mockall::predicate::eq;

    fn user(email: &str, password: &str, verified: bool) -> User {
        User {
            id: OwnerId::random(),
            name: "Ada".into(),
            email: email.into(),
            password_hash: hash_password(password).expect("hashing succeeds"),
            is_email_verified: verified,
            email_verification: None,
            password_reset: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(
        users: MockUserRepository,
        mailer: MockMailer,
    ) -> AccountService<MockUserRepository, MockMailer> {
        AccountService::new(Arc::new(users), Arc::new(mailer))
    }

    #[test]
    fn password_round_trips_and_rejects_others() {
        let hash = hash_password("Secret1!").expect("hashing succeeds");
        assert!(verify_password(&hash, "Secret1!"));
        assert!(!verify_password(&hash, "Secret2!"));
        assert!(!verify_password("not-a-phc-hash", "Secret1!"));
    }

    #[test]
    fn tokens_are_64_hex_characters() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, generate_token());
    }

    #[tokio::test]
    async fn register_mails_the_verification_token() {
        let mut users = MockUserRepository::new();
        users.expect_insert().times(1).returning(|new_user| {
            Ok(User {
                id: OwnerId::random(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                is_email_verified: false,
                email_verification: Some(new_user.email_verification),
                password_reset: None,
                refresh_token: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification()
            .withf(|email, token| email == "ada@example.com" && token.len() == 64)
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(users, mailer);
        let created = svc
            .register(RegistrationRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "Secret1!".into(),
            })
            .await
            .expect("registration succeeds");
        assert!(!created.is_email_verified);
        assert!(verify_password(&created.password_hash, "Secret1!"));
    }

    #[tokio::test]
    async fn register_survives_mail_outage() {
        let mut users = MockUserRepository::new();
        users.expect_insert().returning(|new_user| {
            Ok(User {
                id: OwnerId::random(),
                name: new_user.name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                is_email_verified: false,
                email_verification: Some(new_user.email_verification),
                password_reset: None,
                refresh_token: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });
        let mut mailer = MockMailer::new();
        mailer
            .expect_send_verification()
            .returning(|_, _| Err(crate::domain::ports::MailerError::delivery("smtp down")));

        let svc = service(users, mailer);
        let result = svc
            .register(RegistrationRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "Secret1!".into(),
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_registers_as_conflict() {
        let mut users = MockUserRepository::new();
        users.expect_insert().returning(|new_user| {
            Err(UserRepositoryError::duplicate_email(new_user.email))
        });

        let svc = service(users, MockMailer::new());
        let err = svc
            .register(RegistrationRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "Secret1!".into(),
            })
            .await
            .expect_err("duplicate is rejected");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn login_hides_whether_the_email_exists() {
        let known = user("ada@example.com", "Secret1!", true);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .with(eq("ada@example.com"))
            .returning(move |_| Ok(Some(known.clone())));
        users
            .expect_find_by_email()
            .with(eq("ghost@example.com"))
            .returning(|_| Ok(None));

        let svc = service(users, MockMailer::new());
        let wrong_password = svc
            .login("ada@example.com", "WrongPass1!")
            .await
            .expect_err("wrong password rejected");
        let unknown_email = svc
            .login("ghost@example.com", "Secret1!")
            .await
            .expect_err("unknown email rejected");
        assert_eq!(wrong_password, unknown_email);
    }

    #[tokio::test]
    async fn unverified_login_is_forbidden_with_flag() {
        let unverified = user("ada@example.com", "Secret1!", false);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(unverified.clone())));

        let svc = service(users, MockMailer::new());
        let err = svc
            .login("ada@example.com", "Secret1!")
            .await
            .expect_err("unverified rejected");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(
            err.details().and_then(|d| d["isEmailVerified"].as_bool()),
            Some(false)
        );
    }

    #[tokio::test]
    async fn expired_verification_token_is_rejected() {
        let mut stale = user("ada@example.com", "Secret1!", false);
        stale.email_verification = Some(TimedToken {
            token: "deadbeef".into(),
            expires_at: Utc::now() - Duration::minutes(1),
        });
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_verification_token()
            .returning(move |_| Ok(Some(stale.clone())));

        let svc = service(users, MockMailer::new());
        let err = svc
            .verify_email("deadbeef")
            .await
            .expect_err("expired token rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn reset_request_for_unknown_email_stays_silent() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        // No set_password_reset or mail expectation: either would panic.
        let svc = service(users, MockMailer::new());
        svc.request_password_reset("ghost@example.com")
            .await
            .expect("unknown email still succeeds");
    }

    #[tokio::test]
    async fn valid_reset_token_updates_the_password() {
        let mut holder = user("ada@example.com", "Secret1!", true);
        holder.password_reset = Some(TimedToken {
            token: "cafebabe".into(),
            expires_at: Utc::now() + Duration::minutes(30),
        });
        let id = holder.id;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_reset_token()
            .with(eq("cafebabe"))
            .returning(move |_| Ok(Some(holder.clone())));
        users
            .expect_update_password()
            .withf(move |owner, hash| *owner == id && verify_password(hash, "NewSecret1!"))
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(users, MockMailer::new());
        svc.reset_password("cafebabe", "NewSecret1!")
            .await
            .expect("reset succeeds");
    }

    #[tokio::test]
    async fn unknown_refresh_token_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_refresh_token().returning(|_| Ok(None));
        let svc = service(users, MockMailer::new());
        let err = svc
            .take_refresh_user("bogus")
            .await
            .expect_err("unknown token rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
