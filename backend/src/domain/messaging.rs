//! Private messaging with an unread counter kept in the notification
//! ledger.
//!
//! Sending a message bumps the recipient's `unread_message_count`
//! notification to the fresh count; reading the inbox moves the reader's
//! watermark forward and zeroes the counter. The counter therefore always
//! reflects latest state rather than accumulating deltas.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;

use pagination::{Page, PageRequest};

use super::error::Error;
use super::message::Message;
use super::notifications::NotificationService;
use super::ports::{MessageRepository, NewMessageRecord, NotificationRepository, UserRepository};
use super::user::UserId;

/// Notification name carrying a user's unread message count.
pub const UNREAD_COUNT_NOTIFICATION: &str = "unread_message_count";

/// Application service for direct messages.
pub struct MessagingService<M, U, N> {
    messages: Arc<M>,
    users: Arc<U>,
    notifications: NotificationService<N>,
    clock: Arc<dyn Clock>,
}

impl<M, U, N> MessagingService<M, U, N>
where
    M: MessageRepository,
    U: UserRepository,
    N: NotificationRepository,
{
    /// Create the service over its collaborators.
    pub fn new(
        messages: Arc<M>,
        users: Arc<U>,
        notifications: NotificationService<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            messages,
            users,
            notifications,
            clock,
        }
    }

    /// Deliver a message and bump the recipient's unread counter.
    pub fn send(
        &self,
        sender: UserId,
        recipient: UserId,
        body: impl Into<String>,
    ) -> Result<Message, Error> {
        if sender == recipient {
            return Err(Error::invalid_request("you cannot message yourself"));
        }
        let recipient_user = self
            .users
            .find_by_id(recipient)?
            .ok_or_else(|| Error::not_found(format!("user {recipient} does not exist")))?;

        let record = NewMessageRecord {
            sender,
            recipient,
            body: body.into(),
            timestamp: self.clock.utc(),
        };
        let message = self.messages.insert(&record)?;

        let unread = self
            .messages
            .received_count_since(recipient, recipient_user.last_message_read_time)?;
        self.notifications
            .push(recipient, UNREAD_COUNT_NOTIFICATION, &json!(unread))?;
        Ok(message)
    }

    /// The user's received messages, newest first.
    ///
    /// Reading the inbox marks everything as read: the watermark moves to
    /// now and the unread counter notification drops to zero.
    pub fn inbox(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, Error> {
        self.users.set_last_message_read_time(user, self.clock.utc())?;
        self.notifications
            .push(user, UNREAD_COUNT_NOTIFICATION, &json!(0))?;
        Ok(self.messages.received(user, page)?)
    }

    /// The user's sent messages, newest first.
    pub fn sent(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, Error> {
        Ok(self.messages.sent(user, page)?)
    }

    /// Messages received after the user's read watermark.
    pub fn unread_count(&self, user: UserId) -> Result<u64, Error> {
        let user_row = self
            .users
            .find_by_id(user)?
            .ok_or_else(|| Error::not_found(format!("user {user} does not exist")))?;
        Ok(self
            .messages
            .received_count_since(user, user_row.last_message_read_time)?)
    }
}
