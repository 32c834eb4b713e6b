//! Row models bridging the Diesel schema and the domain entities.
//!
//! Timestamps cross the boundary here: the database stores naive UTC, the
//! domain carries `DateTime<Utc>`. Validation of stored text happens on the
//! way out; the writes only ever see already-validated newtypes, so a row
//! failing validation means the database was edited behind the
//! application's back and is reported as a query error.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use tracing::warn;

use crate::domain::message::{Message, MessageId};
use crate::domain::notification::{Notification, NotificationId};
use crate::domain::ports::{StoreError, UserStoreError};
use crate::domain::post::{Post, PostBody, PostId};
use crate::domain::task::Task;
use crate::domain::user::{Email, User, UserId, Username};

use super::schema::{followers, messages, notifications, posts, tasks, users};

/// A full user row as stored, credential and token columns included.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about_me: Option<String>,
    pub last_seen: Option<NaiveDateTime>,
    pub last_message_read_time: Option<NaiveDateTime>,
    pub api_token: Option<String>,
    pub api_token_expiration: Option<NaiveDateTime>,
}

impl UserRow {
    /// Convert the row into the domain aggregate, revalidating stored text.
    pub fn into_domain(self) -> Result<User, UserStoreError> {
        let username = Username::new(self.username).map_err(|err| {
            warn!(user = self.id, %err, "stored username fails validation");
            UserStoreError::query("stored user row is invalid")
        })?;
        let email = Email::new(self.email).map_err(|err| {
            warn!(user = self.id, %err, "stored email fails validation");
            UserStoreError::query("stored user row is invalid")
        })?;
        Ok(User {
            id: UserId(self.id),
            username,
            email,
            about_me: self.about_me,
            last_seen: self.last_seen.map(|naive| naive.and_utc()),
            last_message_read_time: self.last_message_read_time.map(|naive| naive.and_utc()),
        })
    }
}

/// Insertable user row.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Partial profile changeset; `None` columns are left untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserProfileChangeset<'a> {
    pub username: Option<&'a str>,
    pub about_me: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PostRow {
    pub id: i32,
    pub user_id: i32,
    pub body: String,
    pub timestamp: NaiveDateTime,
    pub language: Option<String>,
}

impl PostRow {
    /// Convert the row into the domain entity, revalidating the body.
    pub fn into_domain(self) -> Result<Post, StoreError> {
        let body = PostBody::new(self.body).map_err(|err| {
            warn!(post = self.id, %err, "stored post body fails validation");
            StoreError::query("stored post row is invalid")
        })?;
        Ok(Post {
            id: PostId(self.id),
            author: UserId(self.user_id),
            body,
            timestamp: self.timestamp.and_utc(),
            language: self.language,
        })
    }
}

/// Insertable post row.
#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow<'a> {
    pub user_id: i32,
    pub body: &'a str,
    pub timestamp: NaiveDateTime,
    pub language: Option<&'a str>,
}

/// A follow edge row; the table is all key.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = followers)]
pub struct FollowerRow {
    pub follower_id: i32,
    pub followed_id: i32,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageRow {
    pub id: i32,
    pub sender_id: i32,
    pub recipient_id: i32,
    pub body: String,
    pub timestamp: NaiveDateTime,
}

impl MessageRow {
    /// Convert the row into the domain entity.
    pub fn into_domain(self) -> Message {
        Message {
            id: MessageId(self.id),
            sender: UserId(self.sender_id),
            recipient: UserId(self.recipient_id),
            body: self.body,
            timestamp: self.timestamp.and_utc(),
        }
    }
}

/// Insertable message row.
#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow<'a> {
    pub sender_id: i32,
    pub recipient_id: i32,
    pub body: &'a str,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NotificationRow {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub timestamp: f64,
    pub payload_json: String,
}

impl NotificationRow {
    /// Convert the row into the domain entity, parsing the JSON payload.
    pub fn into_domain(self) -> Result<Notification, StoreError> {
        let payload = serde_json::from_str(&self.payload_json).map_err(|err| {
            warn!(notification = self.id, %err, "stored payload is not valid JSON");
            StoreError::query("stored notification row is invalid")
        })?;
        Ok(Notification {
            id: NotificationId(self.id),
            name: self.name,
            user: UserId(self.user_id),
            timestamp: self.timestamp,
            payload,
        })
    }
}

/// Insertable notification row.
#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotificationRow<'a> {
    pub name: &'a str,
    pub user_id: i32,
    pub timestamp: f64,
    pub payload_json: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i32,
    pub complete: bool,
}

impl TaskRow {
    /// Convert the row into the domain entity.
    pub fn into_domain(self) -> Task {
        Task {
            id: self.id,
            name: self.name,
            description: self.description,
            user: UserId(self.user_id),
            complete: self.complete,
        }
    }
}

/// Insertable task row.
#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub user_id: i32,
    pub complete: bool,
}
