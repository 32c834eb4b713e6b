//! Per-user notification ledger.
//!
//! Each notification name holds at most one live entry per user; pushing a
//! notification atomically replaces its predecessor, so the ledger carries
//! only latest-state events such as the current unread message count.
//! Clients poll with the largest float timestamp they have seen and get
//! everything strictly newer.

use std::sync::Arc;

use mockable::Clock;
use serde_json::Value;

use super::error::Error;
use super::notification::Notification;
use super::ports::NotificationRepository;
use super::user::UserId;

/// Application service for the notification ledger.
pub struct NotificationService<N> {
    notifications: Arc<N>,
    clock: Arc<dyn Clock>,
}

impl<N> NotificationService<N>
where
    N: NotificationRepository,
{
    /// Create the service over the notification repository.
    pub fn new(notifications: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }

    /// Record a notification, replacing any earlier one with the same name.
    pub fn push(
        &self,
        user: UserId,
        name: &str,
        payload: &Value,
    ) -> Result<Notification, Error> {
        // Microsecond precision keeps successive pushes distinguishable
        // through the float cursor.
        let timestamp = self.clock.utc().timestamp_micros() as f64 / 1e6;
        Ok(self.notifications.replace(user, name, payload, timestamp)?)
    }

    /// Notifications newer than the client's cursor, oldest first.
    ///
    /// The cursor is exclusive: a client replaying its last-seen timestamp
    /// never receives the same notification twice.
    pub fn poll(&self, user: UserId, since: f64) -> Result<Vec<Notification>, Error> {
        Ok(self.notifications.since(user, since)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotificationId;
    use crate::domain::ports::MockNotificationRepository;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    struct FixtureClock {
        utc_now: DateTime<Utc>,
    }

    impl Clock for FixtureClock {
        fn local(&self) -> DateTime<Local> {
            self.utc_now.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.utc_now
        }
    }

    #[rstest]
    fn push_stamps_epoch_seconds_from_the_clock() {
        let now = Utc
            .with_ymd_and_hms(2026, 8, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        let expected = now.timestamp_micros() as f64 / 1e6;

        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_replace()
            .withf(move |user, name, payload, timestamp| {
                *user == UserId(1)
                    && name == "unread_message_count"
                    && payload == &json!(3)
                    && (*timestamp - expected).abs() < 1e-9
            })
            .times(1)
            .returning(|user, name, payload, timestamp| {
                Ok(Notification {
                    id: NotificationId(1),
                    name: name.to_owned(),
                    user,
                    timestamp,
                    payload: payload.clone(),
                })
            });

        let service =
            NotificationService::new(Arc::new(notifications), Arc::new(FixtureClock {
                utc_now: now,
            }));
        let pushed = service
            .push(UserId(1), "unread_message_count", &json!(3))
            .expect("pushed");
        assert_eq!(pushed.name, "unread_message_count");
    }

    #[rstest]
    fn poll_passes_the_cursor_through() {
        let mut notifications = MockNotificationRepository::new();
        notifications
            .expect_since()
            .with(eq(UserId(1)), eq(17.5))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let service = NotificationService::new(
            Arc::new(notifications),
            Arc::new(FixtureClock {
                utc_now: Utc::now(),
            }),
        );
        assert!(service.poll(UserId(1), 17.5).expect("polled").is_empty());
    }
}
