//! SQLite-backed `MessageRepository` implementation using Diesel.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use pagination::{Page, PageRequest};

use crate::domain::message::Message;
use crate::domain::ports::{MessageRepository, NewMessageRecord, StoreError};
use crate::domain::user::UserId;

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{MessageRow, NewMessageRow};
use super::pool::DbPool;
use super::schema::messages;

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MessageRepository for DieselMessageRepository {
    fn insert(&self, record: &NewMessageRecord) -> Result<Message, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let new_row = NewMessageRow {
            sender_id: record.sender.0,
            recipient_id: record.recipient.0,
            body: &record.body,
            timestamp: record.timestamp.naive_utc(),
        };
        let row: MessageRow = diesel::insert_into(messages::table)
            .values(&new_row)
            .returning(MessageRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(row.into_domain())
    }

    fn received(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let total: i64 = messages::table
            .filter(messages::recipient_id.eq(user.0))
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let rows: Vec<MessageRow> = messages::table
            .filter(messages::recipient_id.eq(user.0))
            .order(messages::timestamp.desc())
            .then_order_by(messages::id.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(MessageRow::into_domain).collect();
        Ok(Page::new(items, page, total.max(0) as u64))
    }

    fn sent(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let total: i64 = messages::table
            .filter(messages::sender_id.eq(user.0))
            .count()
            .get_result(&mut conn)
            .map_err(map_diesel_error)?;

        let rows: Vec<MessageRow> = messages::table
            .filter(messages::sender_id.eq(user.0))
            .order(messages::timestamp.desc())
            .then_order_by(messages::id.desc())
            .limit(page.limit())
            .offset(page.offset())
            .select(MessageRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        let items = rows.into_iter().map(MessageRow::into_domain).collect();
        Ok(Page::new(items, page, total.max(0) as u64))
    }

    fn received_count_since(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;

        let count: i64 = match since {
            Some(since) => messages::table
                .filter(messages::recipient_id.eq(user.0))
                .filter(messages::timestamp.gt(since.naive_utc()))
                .count()
                .get_result(&mut conn),
            None => messages::table
                .filter(messages::recipient_id.eq(user.0))
                .count()
                .get_result(&mut conn),
        }
        .map_err(map_diesel_error)?;

        Ok(count.max(0) as u64)
    }
}
