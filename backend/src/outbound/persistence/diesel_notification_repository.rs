//! SQLite-backed `NotificationRepository` implementation using Diesel.
//!
//! Replace-by-name runs delete-then-insert inside one transaction, so a
//! poller can never observe two live notifications with the same name for
//! one user.

use diesel::prelude::*;
use serde_json::Value;

use crate::domain::notification::Notification;
use crate::domain::ports::{NotificationRepository, StoreError};
use crate::domain::user::UserId;

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl NotificationRepository for DieselNotificationRepository {
    fn replace(
        &self,
        user: UserId,
        name: &str,
        payload: &Value,
        timestamp: f64,
    ) -> Result<Notification, StoreError> {
        let payload_json = serde_json::to_string(payload)
            .map_err(|err| StoreError::query(format!("payload serialisation failed: {err}")))?;

        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let row: NotificationRow = conn
            .transaction(|conn| {
                diesel::delete(
                    notifications::table
                        .filter(notifications::user_id.eq(user.0))
                        .filter(notifications::name.eq(name)),
                )
                .execute(conn)?;

                diesel::insert_into(notifications::table)
                    .values(&NewNotificationRow {
                        name,
                        user_id: user.0,
                        timestamp,
                        payload_json: &payload_json,
                    })
                    .returning(NotificationRow::as_returning())
                    .get_result(conn)
            })
            .map_err(map_diesel_error)?;

        row.into_domain()
    }

    fn since(&self, user: UserId, since: f64) -> Result<Vec<Notification>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user.0))
            .filter(notifications::timestamp.gt(since))
            .order(notifications::timestamp.asc())
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;

        rows.into_iter().map(NotificationRow::into_domain).collect()
    }
}
