//! SQLite-backed `PostRepository` implementation using Diesel.
//!
//! The home timeline is the one interesting query: a single left join from
//! posts to the follow edges pointing at each author, filtered to rows
//! where the reader either follows the author or is the author. A reader
//! following themselves would duplicate their own rows through the join,
//! so the select is distinct by post.

use diesel::dsl::count_distinct;
use diesel::prelude::*;

use pagination::{Page, PageRequest};

use crate::domain::ports::{NewPostRecord, PostRepository, StoreError};
use crate::domain::post::{Post, PostId};
use crate::domain::user::UserId;

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{NewPostRow, PostRow};
use super::pool::DbPool;
use super::schema::{followers, posts};

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn rows_into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, StoreError> {
    rows.into_iter().map(PostRow::into_domain).collect()
}

impl PostRepository for DieselPostRepository {
    fn insert(&self, record: &NewPostRecord) -> Result<Post, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let new_row = NewPostRow {
            user_id: record.author.0,
            body: record.body.as_str(),
            timestamp: record.timestamp.naive_utc(),
            language: record.language.as_deref(),
        };
        let row: PostRow = diesel::insert_into(posts::table)
            .values(&new_row)
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;
        row.into_domain()
    }

    fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .find(id.0)
            .select(PostRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PostRow::into_domain).transpose()
    }

    fn find_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.0).collect();
        let rows: Vec<PostRow> = posts::table
            .filter(posts::id.eq_any(raw_ids))
            .select(PostRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        rows_into_posts(rows)
    }

    fn delete(&self, id: PostId) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let deleted = diesel::delete(posts::table.find(id.0))
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    fn home_timeline(&self, user: UserId, page: PageRequest) -> Result<Page<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let total: i64 = posts::table
            .left_join(followers::table.on(followers::followed_id.eq(posts::user_id)))
            .filter(
                followers::follower_id
                    .eq(user.0)
                    .or(posts::user_id.eq(user.0)),
            )
            .select(count_distinct(posts::id))
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let rows: Vec<PostRow> = posts::table
            .left_join(followers::table.on(followers::followed_id.eq(posts::user_id)))
            .filter(
                followers::follower_id
                    .eq(user.0)
                    .or(posts::user_id.eq(user.0)),
            )
            .select(PostRow::as_select())
            .distinct()
            .order(posts::timestamp.desc())
            .then_order_by(posts::id.desc())
            .limit(page.limit())
            .offset(page.offset())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_into_posts(rows)?, page, total.max(0) as u64))
    }

    fn explore(&self, page: PageRequest) -> Result<Page<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let total: i64 = posts::table
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let rows: Vec<PostRow> = posts::table
            .order(posts::timestamp.desc())
            .then_order_by(posts::id.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(PostRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_into_posts(rows)?, page, total.max(0) as u64))
    }

    fn by_author(&self, author: UserId, page: PageRequest) -> Result<Page<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let total: i64 = posts::table
            .filter(posts::user_id.eq(author.0))
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let rows: Vec<PostRow> = posts::table
            .filter(posts::user_id.eq(author.0))
            .order(posts::timestamp.desc())
            .then_order_by(posts::id.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(PostRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        Ok(Page::new(rows_into_posts(rows)?, page, total.max(0) as u64))
    }

    fn all_for_reindex(&self) -> Result<Vec<Post>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let rows: Vec<PostRow> = posts::table
            .order(posts::id.asc())
            .select(PostRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        rows_into_posts(rows)
    }
}
