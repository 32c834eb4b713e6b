//! SQLite-backed `TaskRepository` implementation using Diesel.

use diesel::prelude::*;

use crate::domain::ports::{StoreError, TaskRepository};
use crate::domain::task::Task;
use crate::domain::user::UserId;

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::{NewTaskRow, TaskRow};
use super::pool::DbPool;
use super::schema::tasks;

/// Diesel-backed implementation of the `TaskRepository` port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TaskRepository for DieselTaskRepository {
    fn insert(&self, task: &Task) -> Result<(), StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        diesel::insert_into(tasks::table)
            .values(&NewTaskRow {
                id: &task.id,
                name: &task.name,
                description: task.description.as_deref(),
                user_id: task.user.0,
                complete: task.complete,
            })
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let row: Option<TaskRow> = tasks::table
            .find(id)
            .select(TaskRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(TaskRow::into_domain))
    }

    fn in_progress(&self, user: UserId) -> Result<Vec<Task>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let rows: Vec<TaskRow> = tasks::table
            .filter(tasks::user_id.eq(user.0))
            .filter(tasks::complete.eq(false))
            .order(tasks::id.asc())
            .select(TaskRow::as_select())
            .load(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(TaskRow::into_domain).collect())
    }

    fn in_progress_named(&self, user: UserId, name: &str) -> Result<Option<Task>, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let row: Option<TaskRow> = tasks::table
            .filter(tasks::user_id.eq(user.0))
            .filter(tasks::name.eq(name))
            .filter(tasks::complete.eq(false))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(TaskRow::into_domain))
    }

    fn mark_complete(&self, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.pool.get().map_err(map_pool_error)?;
        let updated = diesel::update(tasks::table.find(id))
            .set(tasks::complete.eq(true))
            .execute(&mut conn)
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }
}
