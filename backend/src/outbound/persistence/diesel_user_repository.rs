//! SQLite-backed `UserRepository` implementation using Diesel.
//!
//! This adapter owns the full user row, credential and API token columns
//! included; the domain aggregate it hands out never carries either. The
//! unique indexes on `username` and `email` are the concurrency backstop
//! for registration, surfaced through the duplicate-field error variant.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::{
    ApiTokenRecord, NewUserRecord, ProfileUpdate, UserRepository, UserStoreError,
};
use crate::domain::user::{User, UserId};

use super::diesel_error::{map_user_diesel_error, map_user_pool_error};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn load_optional<F>(&self, query: F) -> Result<Option<User>, UserStoreError>
    where
        F: FnOnce(&mut SqliteConnection) -> QueryResult<Option<UserRow>>,
    {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        let row = query(&mut conn).map_err(map_user_diesel_error)?;
        row.map(UserRow::into_domain).transpose()
    }
}

impl UserRepository for DieselUserRepository {
    fn insert(&self, record: &NewUserRecord) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;

        let new_row = NewUserRow {
            username: record.username.as_str(),
            email: record.email.as_str(),
            password_hash: &record.password_hash,
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_user_diesel_error)?;
        row.into_domain()
    }

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        self.load_optional(|conn| {
            users::table
                .find(id.0)
                .select(UserRow::as_select())
                .first(conn)
                .optional()
        })
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        self.load_optional(|conn| {
            users::table
                .filter(users::username.eq(username))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
        })
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        self.load_optional(|conn| {
            users::table
                .filter(users::email.eq(email))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
        })
    }

    fn password_hash(&self, id: UserId) -> Result<Option<String>, UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        users::table
            .find(id.0)
            .select(users::password_hash)
            .first(&mut conn)
            .optional()
            .map_err(map_user_diesel_error)
    }

    fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        diesel::update(users::table.find(id.0))
            .set(users::password_hash.eq(hash))
            .execute(&mut conn)
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;

        // An all-None changeset is a no-op Diesel refuses to build.
        if update.username.is_some() || update.about_me.is_some() {
            let changeset = UserProfileChangeset {
                username: update.username.as_ref().map(|username| username.as_str()),
                about_me: update.about_me.as_deref(),
            };
            diesel::update(users::table.find(id.0))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(map_user_diesel_error)?;
        }

        let row: UserRow = users::table
            .find(id.0)
            .select(UserRow::as_select())
            .first(&mut conn)
            .map_err(map_user_diesel_error)?;
        row.into_domain()
    }

    fn api_token(&self, id: UserId) -> Result<Option<ApiTokenRecord>, UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        let columns: Option<(Option<String>, Option<chrono::NaiveDateTime>)> = users::table
            .find(id.0)
            .select((users::api_token, users::api_token_expiration))
            .first(&mut conn)
            .optional()
            .map_err(map_user_diesel_error)?;

        Ok(columns.and_then(|(token, expiration)| {
            let token = token?;
            let expires_at = expiration?.and_utc();
            Some(ApiTokenRecord { token, expires_at })
        }))
    }

    fn store_api_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        diesel::update(users::table.find(id.0))
            .set((
                users::api_token.eq(token),
                users::api_token_expiration.eq(expires_at.naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    fn find_by_api_token(
        &self,
        token: &str,
    ) -> Result<Option<(User, DateTime<Utc>)>, UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::api_token.eq(token))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_user_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        // A token without an expiry never verifies.
        let Some(expiration) = row.api_token_expiration else {
            return Ok(None);
        };
        let expires_at = expiration.and_utc();
        Ok(Some((row.into_domain()?, expires_at)))
    }

    fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        diesel::update(users::table.find(id.0))
            .set(users::last_seen.eq(at.naive_utc()))
            .execute(&mut conn)
            .map_err(map_user_diesel_error)?;
        Ok(())
    }

    fn set_last_message_read_time(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().map_err(map_user_pool_error)?;
        diesel::update(users::table.find(id.0))
            .set(users::last_message_read_time.eq(at.naive_utc()))
            .execute(&mut conn)
            .map_err(map_user_diesel_error)?;
        Ok(())
    }
}
