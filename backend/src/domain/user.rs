//! User account entity and related value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the account that owns a record.
///
/// Every repository query is parameterised by an `OwnerId`; it is the
/// mandatory filter predicate that keeps tenants apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(Uuid);

impl OwnerId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A registered account.
///
/// The password hash and the out-of-band token fields never leave the domain
/// layer; API responses use a sanitised projection.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Primary identifier.
    pub id: OwnerId,
    /// Display name chosen at registration.
    pub name: String,
    /// Globally unique e-mail address.
    pub email: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Whether the e-mail address has been verified.
    pub is_email_verified: bool,
    /// Pending e-mail verification token, if any.
    pub email_verification: Option<TimedToken>,
    /// Pending password reset token, if any.
    pub password_reset: Option<TimedToken>,
    /// Current refresh token accepted for session renewal.
    pub refresh_token: Option<String>,
    /// Record creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single-use token paired with its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedToken {
    /// Opaque token value (hex).
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl TimedToken {
    /// Whether the token is still usable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Fields required to persist a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// E-mail address; uniqueness enforced by the repository.
    pub email: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Verification token issued at registration.
    pub email_verification: TimedToken,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn timed_token_expiry_is_exclusive() {
        let now = Utc::now();
        let token = TimedToken {
            token: "abc".into(),
            expires_at: now,
        };
        assert!(!token.is_valid_at(now));
        assert!(token.is_valid_at(now - Duration::seconds(1)));
    }

    #[test]
    fn owner_id_parses_its_display_form() {
        let id = OwnerId::random();
        let parsed: OwnerId = id.to_string().parse().expect("round trip");
        assert_eq!(parsed, id);
    }
}
