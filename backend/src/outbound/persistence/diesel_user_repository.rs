//! Diesel-backed [`UserRepository`] adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::{NewUser, OwnerId, TimedToken, User};

use super::error_map::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Stores accounts in the `users` table.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// New repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(err: &PoolError) -> UserRepositoryError {
    map_pool_error(err, UserRepositoryError::connection)
}

fn query_error(err: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        err,
        UserRepositoryError::connection,
        UserRepositoryError::query,
    )
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email.clone(),
            password_hash: user.password_hash,
            verification_token: user.email_verification.token,
            verification_expires_at: user.email_verification.expires_at,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email)
                } else {
                    query_error(err)
                }
            })
    }

    async fn find_by_id(&self, id: &OwnerId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(query_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(query_error)
    }

    async fn find_by_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        users::table
            .filter(users::refresh_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(query_error)
    }

    async fn set_refresh_token<'a>(
        &self,
        id: &OwnerId,
        token: Option<&'a str>,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::refresh_token.eq(token),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(query_error)
    }

    async fn clear_refresh_token(&self, token: &str) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(users::table.filter(users::refresh_token.eq(token)))
            .set((
                users::refresh_token.eq(None::<String>),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(query_error)
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        users::table
            .filter(users::verification_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(query_error)
    }

    async fn mark_email_verified(&self, id: &OwnerId) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::is_email_verified.eq(true),
                users::verification_token.eq(None::<String>),
                users::verification_expires_at.eq(None::<chrono::DateTime<Utc>>),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(query_error)
    }

    async fn set_password_reset(
        &self,
        id: &OwnerId,
        token: &TimedToken,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::reset_token.eq(&token.token),
                users::reset_expires_at.eq(token.expires_at),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(query_error)
    }

    async fn find_by_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        users::table
            .filter(users::reset_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(query_error)
    }

    async fn update_password(
        &self,
        id: &OwnerId,
        password_hash: &str,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|e| pool_error(&e))?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::password_hash.eq(password_hash),
                users::reset_token.eq(None::<String>),
                users::reset_expires_at.eq(None::<chrono::DateTime<Utc>>),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(query_error)
    }
}
