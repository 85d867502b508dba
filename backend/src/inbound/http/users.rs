//! Account HTTP handlers.
//!
//! ```text
//! POST /api/users/register
//! POST /api/users/login
//! POST /api/users/refresh-token
//! POST /api/users/logout
//! POST /api/users/verify-email
//! POST /api/users/forgot-password
//! POST /api/users/reset-password
//! GET  /api/users/me
//! ```

use actix_web::cookie::Cookie;
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::RegistrationRequest;
use crate::domain::user::{OwnerId, User};
use crate::inbound::http::error::{ApiError, ApiResult};
use crate::inbound::http::session::{REFRESH_COOKIE, SessionContext, TokenConfig};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{require_non_empty, validate_email, validate_password};

/// Registration payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// E-mail verification payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
}

/// Password reset request payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Password reset payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

/// Sanitised account projection; never carries the hash or token fields.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_email_verified: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            email: value.email,
            is_email_verified: value.is_email_verified,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Plain acknowledgement payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Sign a fresh cookie pair and persist the refresh token on the account.
async fn issue_session(
    state: &HttpState,
    tokens: &TokenConfig,
    owner: &OwnerId,
) -> Result<(Cookie<'static>, Cookie<'static>), ApiError> {
    let access = tokens.issue_access(owner)?;
    let refresh = tokens.issue_refresh(owner)?;
    state.accounts.store_refresh_token(owner, &refresh).await?;
    Ok((tokens.access_cookie(access), tokens.refresh_cookie(refresh)))
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Validation failure or duplicate email", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/api/users/register")]
pub async fn register(
    state: web::Data<HttpState>,
    tokens: web::Data<TokenConfig>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let name = require_non_empty(payload.name.as_deref().unwrap_or(""), "name")?;
    let email = validate_email(payload.email.as_deref().unwrap_or(""))?;
    let password = payload.password.unwrap_or_default();
    validate_password(&password)?;

    let user = state
        .accounts
        .register(RegistrationRequest {
            name,
            email,
            password,
        })
        .await?;
    let (access, refresh) = issue_session(&state, &tokens, &user.id).await?;
    Ok(HttpResponse::Created()
        .cookie(access)
        .cookie(refresh)
        .json(UserResponse::from(user)))
}

/// Exchange credentials for a session cookie pair.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 403, description = "E-mail not verified", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/api/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    tokens: web::Data<TokenConfig>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = require_non_empty(payload.email.as_deref().unwrap_or(""), "email")?;
    let password = payload.password.unwrap_or_default();
    if password.is_empty() {
        return Err(Error::invalid_request("password is required").into());
    }

    let user = state.accounts.login(&email, &password).await?;
    let (access, refresh) = issue_session(&state, &tokens, &user.id).await?;
    Ok(HttpResponse::Ok()
        .cookie(access)
        .cookie(refresh)
        .json(UserResponse::from(user)))
}

/// Rotate the cookie pair using the refresh token.
#[utoipa::path(
    post,
    path = "/api/users/refresh-token",
    responses(
        (status = 200, description = "Session renewed", body = UserResponse),
        (status = 401, description = "Missing, expired or superseded refresh token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "refreshToken"
)]
#[post("/api/users/refresh-token")]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<HttpState>,
    tokens: web::Data<TokenConfig>,
) -> ApiResult<HttpResponse> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or_else(|| ApiError::from(Error::unauthorized("Refresh token required")))?;
    let presented = cookie.value();
    tokens.verify_refresh(presented)?;
    // The signed token must also still be the one stored on the account;
    // rotation invalidates every previously issued refresh token.
    let user = state.accounts.take_refresh_user(presented).await?;
    let (access, refresh) = issue_session(&state, &tokens, &user.id).await?;
    Ok(HttpResponse::Ok()
        .cookie(access)
        .cookie(refresh)
        .json(UserResponse::from(user)))
}

/// End the session and clear both cookies.
#[utoipa::path(
    post,
    path = "/api/users/logout",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/api/users/logout")]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<HttpState>,
    tokens: web::Data<TokenConfig>,
) -> ApiResult<HttpResponse> {
    if let Some(cookie) = req.cookie(REFRESH_COOKIE) {
        state.accounts.logout(cookie.value()).await?;
    }
    let (access, refresh) = tokens.clearing_cookies();
    Ok(HttpResponse::Ok()
        .cookie(access)
        .cookie(refresh)
        .json(MessageResponse::new("Logged out successfully")))
}

/// Exchange a verification token for verified status.
#[utoipa::path(
    post,
    path = "/api/users/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "E-mail verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "verifyEmail"
)]
#[post("/api/users/verify-email")]
pub async fn verify_email(
    state: web::Data<HttpState>,
    payload: web::Json<VerifyEmailRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let token = require_non_empty(payload.token.as_deref().unwrap_or(""), "token")?;
    state.accounts.verify_email(&token).await?;
    Ok(web::Json(MessageResponse::new("Email verified successfully")))
}

/// Request a password reset token.
#[utoipa::path(
    post,
    path = "/api/users/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Acknowledged without revealing whether the address exists", body = MessageResponse),
        (status = 400, description = "Malformed e-mail", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "forgotPassword"
)]
#[post("/api/users/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let email = validate_email(payload.email.as_deref().unwrap_or(""))?;
    state.accounts.request_password_reset(&email).await?;
    Ok(web::Json(MessageResponse::new(
        "If the email exists, a password reset link has been sent",
    )))
}

/// Exchange a reset token for a new password.
#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid token or weak password", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "resetPassword"
)]
#[post("/api/users/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let payload = payload.into_inner();
    let token = require_non_empty(payload.token.as_deref().unwrap_or(""), "token")?;
    let new_password = payload.new_password.unwrap_or_default();
    validate_password(&new_password)?;
    state.accounts.reset_password(&token, &new_password).await?;
    Ok(web::Json(MessageResponse::new("Password reset successfully")))
}

/// Profile of the authenticated account.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Authenticated account", body = UserResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/api/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts.profile(session.owner()).await?;
    Ok(web::Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountOps, MockBookmarkOps, MockCollectionOps, MockTagOps,
    };
    use crate::inbound::http::session::ACCESS_COOKIE;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::Utc;
    use std::sync::Arc;

    fn sample_user() -> User {
        User {
            id: OwnerId::random(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$fixture".into(),
            is_email_verified: true,
            email_verification: None,
            password_reset: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn state_with_accounts(accounts: MockAccountOps) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            accounts: Arc::new(accounts),
            bookmarks: Arc::new(MockBookmarkOps::new()),
            tags: Arc::new(MockTagOps::new()),
            collections: Arc::new(MockCollectionOps::new()),
        })
    }

    fn token_config() -> web::Data<TokenConfig> {
        web::Data::new(TokenConfig::new("access-secret", "refresh-secret", false))
    }

    #[actix_web::test]
    async fn register_sets_both_cookies() {
        let created = sample_user();
        let mut accounts = MockAccountOps::new();
        let returned = created.clone();
        accounts
            .expect_register()
            .times(1)
            .returning(move |_| Ok(returned.clone()));
        accounts
            .expect_store_refresh_token()
            .times(1)
            .returning(|_, _| Ok(()));

        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(accounts))
                .app_data(token_config())
                .service(register),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/register")
                .set_json(serde_json::json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "Secret1!",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let cookie_names: Vec<String> = res
            .response()
            .cookies()
            .map(|c| c.name().to_owned())
            .collect();
        assert!(cookie_names.contains(&ACCESS_COOKIE.to_owned()));
        assert!(cookie_names.contains(&REFRESH_COOKIE.to_owned()));
        let body: UserResponse = test::read_body_json(res).await;
        assert_eq!(body.email, "ada@example.com");
    }

    #[actix_web::test]
    async fn register_rejects_weak_passwords_before_the_service() {
        // No expectations: reaching the service would panic.
        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(MockAccountOps::new()))
                .app_data(token_config())
                .service(register),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/register")
                .set_json(serde_json::json!({
                    "name": "Ada",
                    "email": "ada@example.com",
                    "password": "weak",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn refresh_requires_the_cookie() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(MockAccountOps::new()))
                .app_data(token_config())
                .service(refresh_token),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/refresh-token")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn refresh_rotates_the_pair_for_a_stored_token() {
        let user = sample_user();
        let owner = user.id;
        let config = TokenConfig::new("access-secret", "refresh-secret", false);
        let refresh = config.issue_refresh(&owner).expect("signing succeeds");

        let mut accounts = MockAccountOps::new();
        let resolved = user.clone();
        let expected = refresh.clone();
        accounts
            .expect_take_refresh_user()
            .withf(move |presented| presented == expected)
            .times(1)
            .returning(move |_| Ok(resolved.clone()));
        accounts
            .expect_store_refresh_token()
            .times(1)
            .returning(|_, _| Ok(()));

        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(accounts))
                .app_data(web::Data::new(config.clone()))
                .service(refresh_token),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/users/refresh-token")
                .cookie(config.refresh_cookie(refresh))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn logout_clears_cookies_even_without_a_session() {
        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(MockAccountOps::new()))
                .app_data(token_config())
                .service(logout),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/users/logout").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        for cookie in res.response().cookies() {
            assert!(cookie.value().is_empty());
        }
    }

    #[actix_web::test]
    async fn me_requires_authentication() {
        let user = sample_user();
        let owner = user.id;
        let config = TokenConfig::new("access-secret", "refresh-secret", false);
        let access = config.issue_access(&owner).expect("signing succeeds");

        let mut accounts = MockAccountOps::new();
        let profiled = user.clone();
        accounts
            .expect_profile()
            .returning(move |_| Ok(profiled.clone()));

        let app = test::init_service(
            App::new()
                .app_data(state_with_accounts(accounts))
                .app_data(web::Data::new(config.clone()))
                .service(current_user),
        )
        .await;

        let anonymous = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/users/me").to_request(),
        )
        .await;
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let authed = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/users/me")
                .cookie(config.access_cookie(access))
                .to_request(),
        )
        .await;
        assert_eq!(authed.status(), StatusCode::OK);
        let body: UserResponse = test::read_body_json(authed).await;
        assert_eq!(body.id, owner.to_string());
    }
}
