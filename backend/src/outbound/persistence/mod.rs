//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by SQLite via Diesel with `r2d2` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel rows and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to domain
//!   persistence error types; unique-index violations on users become the
//!   duplicate-field variant the identity service relies on.
//!
//! Migrations are embedded in the binary; [`run_migrations`] brings a
//! freshly opened database up to date at startup.

use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::domain::ports::StoreError;

pub(crate) mod diesel_error;
mod diesel_message_repository;
mod diesel_notification_repository;
mod diesel_post_repository;
mod diesel_social_graph_repository;
mod diesel_task_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_social_graph_repository::DieselSocialGraphRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply any pending migrations to the connected database.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| StoreError::query(format!("migration failed: {err}")))
}
