//! Shared mapping from pool and Diesel failures to domain store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{StoreError, UserStoreError};

use super::pool::PoolError;

/// Map pool errors to domain store errors.
pub fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain store errors.
pub fn map_diesel_error(error: DieselError) -> StoreError {
    log_diesel_error(&error);

    match error {
        DieselError::NotFound => StoreError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection error")
        }
        _ => StoreError::query("database error"),
    }
}

/// Map pool errors for the user repository, whose port has its own error
/// type.
pub fn map_user_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

/// Map Diesel errors for the user repository, turning unique-index
/// violations into the duplicate-field variant the identity service keys
/// on.
pub fn map_user_diesel_error(error: DieselError) -> UserStoreError {
    log_diesel_error(&error);

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            // SQLite names the violated index column as `users.<column>`.
            if info.message().contains("users.username") {
                UserStoreError::duplicate("username")
            } else if info.message().contains("users.email") {
                UserStoreError::duplicate("email")
            } else {
                UserStoreError::query("unique constraint violation")
            }
        }
        DieselError::NotFound => UserStoreError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        _ => UserStoreError::query("database error"),
    }
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, StoreError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let repo_err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(repo_err, StoreError::Query { .. }));
    }

    #[rstest]
    fn user_unique_violation_names_the_field() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("UNIQUE constraint failed: users.email".to_owned()),
        );
        assert_eq!(
            map_user_diesel_error(error),
            UserStoreError::duplicate("email")
        );
    }
}
