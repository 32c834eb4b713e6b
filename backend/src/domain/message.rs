//! Direct message model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Stable numeric message identifier assigned by storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(pub i32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A private message between two users.
///
/// Directional: sender and recipient are distinct users, each with their own
/// reverse collection (`sent`, `received`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identifier assigned by storage.
    pub id: MessageId,
    /// User who wrote the message.
    pub sender: UserId,
    /// User the message was addressed to.
    pub recipient: UserId,
    /// Message text.
    pub body: String,
    /// Delivery time, the inbox ordering key.
    pub timestamp: DateTime<Utc>,
}
