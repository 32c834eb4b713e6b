//! Background task record model.

use serde::{Deserialize, Serialize};

use super::user::UserId;

/// A background job enqueued on the external runner, tracked locally.
///
/// The identifier is the runner's opaque job id. The `complete` flag is
/// authoritative application-side state; it is flipped by the job's own
/// completion callback, never inferred from the runner. Live progress is
/// read from the runner and not persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// External job identifier handed back by the runner.
    pub id: String,
    /// Job name, e.g. `export_posts`.
    pub name: String,
    /// Human-readable description for progress displays.
    pub description: Option<String>,
    /// User the work belongs to.
    pub user: UserId,
    /// Whether the completion callback has fired.
    pub complete: bool,
}
