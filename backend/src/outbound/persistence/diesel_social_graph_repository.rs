//! SQLite-backed `SocialGraphRepository` implementation using Diesel.
//!
//! Edges live in the `followers` join table; its composite primary key
//! makes insert-or-ignore the natural idempotent follow and leaves nothing
//! to deduplicate on read.

use diesel::prelude::*;

use pagination::{Page, PageRequest};

use crate::domain::ports::{SocialGraphRepository, StoreError};
use crate::domain::user::{User, UserId};

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{FollowerRow, UserRow};
use super::pool::DbPool;
use super::schema::{followers, users};

/// Diesel-backed implementation of the `SocialGraphRepository` port.
#[derive(Clone)]
pub struct DieselSocialGraphRepository {
    pool: DbPool,
}

impl DieselSocialGraphRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn count_edges(
        &self,
        conn: &mut SqliteConnection,
        filter_followed: Option<UserId>,
        filter_follower: Option<UserId>,
    ) -> Result<i64, StoreError> {
        let mut query = followers::table.into_boxed();
        if let Some(followed) = filter_followed {
            query = query.filter(followers::followed_id.eq(followed.0));
        }
        if let Some(follower) = filter_follower {
            query = query.filter(followers::follower_id.eq(follower.0));
        }
        query
            .count()
            .get_result(conn)
            .map_err(map_diesel_error)
    }
}

fn rows_into_users(rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
    rows.into_iter()
        .map(|row| {
            row.into_domain()
                .map_err(|err| StoreError::query(err.to_string()))
        })
        .collect()
}

impl SocialGraphRepository for DieselSocialGraphRepository {
    fn insert_edge(&self, follower: UserId, followed: UserId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        diesel::insert_or_ignore_into(followers::table)
            .values(&FollowerRow {
                follower_id: follower.0,
                followed_id: followed.0,
            })
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }

    fn delete_edge(&self, follower: UserId, followed: UserId) -> Result<(), StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        diesel::delete(
            followers::table
                .filter(followers::follower_id.eq(follower.0))
                .filter(followers::followed_id.eq(followed.0)),
        )
        .execute(&mut conn)
        .map_err(map_diesel_error)?;
        Ok(())
    }

    fn edge_exists(&self, follower: UserId, followed: UserId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            followers::table
                .filter(followers::follower_id.eq(follower.0))
                .filter(followers::followed_id.eq(followed.0)),
        ))
        .get_result(&mut conn)
        .map_err(map_diesel_error)
    }

    fn follower_count(&self, user: UserId) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let count = self.count_edges(&mut conn, Some(user), None)?;
        Ok(count.max(0) as u64)
    }

    fn following_count(&self, user: UserId) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let count = self.count_edges(&mut conn, None, Some(user))?;
        Ok(count.max(0) as u64)
    }

    fn followers(&self, user: UserId, page: PageRequest) -> Result<Page<User>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let total = self.count_edges(&mut conn, Some(user), None)?;

        let rows: Vec<UserRow> = users::table
            .inner_join(followers::table.on(followers::follower_id.eq(users::id)))
            .filter(followers::followed_id.eq(user.0))
            .order(users::username.asc())
            .limit(page.limit())
            .offset(page.offset())
            .select(UserRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_into_users(rows)?, page, total.max(0) as u64))
    }

    fn following(&self, user: UserId, page: PageRequest) -> Result<Page<User>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let total = self.count_edges(&mut conn, None, Some(user))?;

        let rows: Vec<UserRow> = users::table
            .inner_join(followers::table.on(followers::followed_id.eq(users::id)))
            .filter(followers::follower_id.eq(user.0))
            .order(users::username.asc())
            .limit(page.limit())
            .offset(page.offset())
            .select(UserRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_into_users(rows)?, page, total.max(0) as u64))
    }
}
