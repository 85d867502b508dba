//! Cookie-based JWT sessions.
//!
//! Authentication uses a signed access token (short-lived) and a refresh
//! token (long-lived, additionally matched against the value stored on the
//! account) carried in `httpOnly` cookies. Token signing and cookie shaping
//! are transport concerns and live here; the domain only ever sees an
//! [`OwnerId`].

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use chrono::Utc;
use futures_util::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, user::OwnerId};
use crate::inbound::http::error::ApiError;

/// Cookie carrying the access token.
pub const ACCESS_COOKIE: &str = "accessToken";
/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

const ACCESS_TTL_SECS: i64 = 60 * 60;
const REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Signing configuration shared by the login, refresh and guard paths.
///
/// Access and refresh tokens use separate secrets so one kind can never be
/// replayed as the other.
#[derive(Clone)]
pub struct TokenConfig {
    access_secret: String,
    refresh_secret: String,
    cookie_secure: bool,
}

impl TokenConfig {
    /// Build a config from the two signing secrets.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        cookie_secure: bool,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            cookie_secure,
        }
    }

    fn issue(secret: &str, owner: &OwnerId, ttl_secs: i64) -> Result<String, Error> {
        let claims = Claims {
            sub: owner.to_string(),
            exp: Utc::now().timestamp() + ttl_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|error| Error::internal(format!("token signing failed: {error}")))
    }

    fn verify(secret: &str, token: &str) -> Result<OwnerId, Error> {
        let rejected = || Error::unauthorized("Invalid or expired token");
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| rejected())?;
        data.claims.sub.parse().map_err(|_| rejected())
    }

    /// Sign a fresh access token for the account.
    pub fn issue_access(&self, owner: &OwnerId) -> Result<String, Error> {
        Self::issue(&self.access_secret, owner, ACCESS_TTL_SECS)
    }

    /// Sign a fresh refresh token for the account.
    pub fn issue_refresh(&self, owner: &OwnerId) -> Result<String, Error> {
        Self::issue(&self.refresh_secret, owner, REFRESH_TTL_SECS)
    }

    /// Validate an access token and recover its account.
    pub fn verify_access(&self, token: &str) -> Result<OwnerId, Error> {
        Self::verify(&self.access_secret, token)
    }

    /// Validate a refresh token and recover its account.
    pub fn verify_refresh(&self, token: &str) -> Result<OwnerId, Error> {
        Self::verify(&self.refresh_secret, token)
    }

    fn cookie(&self, name: &'static str, value: String, ttl_secs: i64) -> Cookie<'static> {
        Cookie::build(name, value)
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::seconds(ttl_secs))
            .finish()
    }

    /// Shape the access cookie around a signed token.
    #[must_use]
    pub fn access_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(ACCESS_COOKIE, token, ACCESS_TTL_SECS)
    }

    /// Shape the refresh cookie around a signed token.
    #[must_use]
    pub fn refresh_cookie(&self, token: String) -> Cookie<'static> {
        self.cookie(REFRESH_COOKIE, token, REFRESH_TTL_SECS)
    }

    /// Expired replacements that clear both cookies on logout.
    #[must_use]
    pub fn clearing_cookies(&self) -> (Cookie<'static>, Cookie<'static>) {
        (
            self.cookie(ACCESS_COOKIE, String::new(), 0),
            self.cookie(REFRESH_COOKIE, String::new(), 0),
        )
    }
}

/// Authenticated request context extracted from the access cookie.
///
/// Adding `SessionContext` as a handler parameter is what makes an endpoint
/// require authentication; extraction fails with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext {
    owner: OwnerId,
}

impl SessionContext {
    /// The authenticated account.
    #[must_use]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

fn extract_session(req: &HttpRequest) -> Result<SessionContext, ApiError> {
    let config = req
        .app_data::<web::Data<TokenConfig>>()
        .ok_or_else(|| ApiError::from(Error::internal("token configuration missing")))?;
    let cookie = req
        .cookie(ACCESS_COOKIE)
        .ok_or_else(|| ApiError::from(Error::unauthorized("Authentication required")))?;
    let owner = config.verify_access(cookie.value())?;
    Ok(SessionContext { owner })
}

impl FromRequest for SessionContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_session(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    fn config() -> TokenConfig {
        TokenConfig::new("access-secret", "refresh-secret", false)
    }

    #[std::prelude::v1::test]
    fn access_token_round_trips() {
        let config = config();
        let owner = OwnerId::random();
        let token = config.issue_access(&owner).expect("signing succeeds");
        assert_eq!(config.verify_access(&token).expect("verifies"), owner);
    }

    #[std::prelude::v1::test]
    fn token_kinds_are_not_interchangeable() {
        let config = config();
        let owner = OwnerId::random();
        let refresh = config.issue_refresh(&owner).expect("signing succeeds");
        assert!(config.verify_access(&refresh).is_err());
    }

    #[std::prelude::v1::test]
    fn expired_token_is_rejected() {
        let config = config();
        let owner = OwnerId::random();
        let token = TokenConfig::issue(&config.access_secret, &owner, -60)
            .expect("signing succeeds");
        assert!(config.verify_access(&token).is_err());
    }

    #[std::prelude::v1::test]
    fn cookies_are_http_only() {
        let config = config();
        let cookie = config.access_cookie("value".into());
        assert_eq!(cookie.name(), ACCESS_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[actix_web::test]
    async fn extractor_guards_routes() {
        let config = config();
        let owner = OwnerId::random();
        let token = config.issue_access(&owner).expect("signing succeeds");
        let cookie = config.access_cookie(token);

        let app = test::init_service(
            App::new().app_data(web::Data::new(config)).route(
                "/guarded",
                web::get().to(|session: SessionContext| async move {
                    HttpResponse::Ok().body(session.owner().to_string())
                }),
            ),
        )
        .await;

        let anonymous =
            test::call_service(&app, test::TestRequest::get().uri("/guarded").to_request()).await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authed = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/guarded")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(authed.status(), StatusCode::OK);
        let body = test::read_body(authed).await;
        assert_eq!(body, owner.to_string().as_bytes());
    }
}
