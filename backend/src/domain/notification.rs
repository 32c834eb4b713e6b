//! Per-user notification event model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::UserId;

/// Stable numeric notification identifier assigned by storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NotificationId(pub i32);

/// A named, timestamped event in a user's notification ledger.
///
/// For a given user at most one live row exists per name; pushing a
/// notification replaces any prior row with that name. The float
/// epoch-second timestamp doubles as the polling cursor: clients remember
/// the largest value they have seen and poll with a strictly-greater
/// filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Stable identifier assigned by storage.
    pub id: NotificationId,
    /// Event name, e.g. `unread_message_count`.
    pub name: String,
    /// Owner of the ledger entry.
    pub user: UserId,
    /// Epoch seconds at insertion; the polling cursor.
    pub timestamp: f64,
    /// Opaque JSON payload carried to the client.
    pub payload: Value,
}
