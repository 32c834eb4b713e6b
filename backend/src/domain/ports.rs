//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the relational store, the search index, the job runner, the mail
//! spool). Each trait exposes strongly typed errors so adapters map their
//! failures into predictable variants instead of returning `anyhow::Result`.
//!
//! The ports are synchronous: every inbound request runs on one worker with
//! a short-lived unit of work, so there is no async runtime to thread
//! through the signatures.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use pagination::{Page, PageRequest};

use super::error::Error;
use super::message::Message;
use super::notification::Notification;
use super::post::{Post, PostBody, PostId};
use super::task::Task;
use super::user::{Email, User, UserId, Username};

/// Persistence errors raised by the relational store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Repository connection could not be established.
    #[error("store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl StoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection { .. } => Self::service_unavailable(err.to_string()),
            StoreError::Query { .. } => Self::internal(err.to_string()),
        }
    }
}

/// Persistence errors raised by [`UserRepository`] adapters.
///
/// Uniqueness violations get their own variant: the storage-level unique
/// constraint is the backstop for the check-then-act validation in the
/// identity service, and the service maps this variant back to a
/// user-visible validation error after rollback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Repository connection could not be established.
    #[error("user store connection failed: {message}")]
    Connection {
        /// Adapter-provided failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-provided failure description.
        message: String,
    },
    /// A unique constraint rejected the write.
    #[error("{field} is already taken")]
    Duplicate {
        /// Column the constraint guards: `username` or `email`.
        field: &'static str,
    },
}

impl UserStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique constraint violations.
    pub fn duplicate(field: &'static str) -> Self {
        Self::Duplicate { field }
    }
}

impl From<UserStoreError> for Error {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Connection { .. } => Self::service_unavailable(err.to_string()),
            UserStoreError::Query { .. } => Self::internal(err.to_string()),
            UserStoreError::Duplicate { .. } => Self::invalid_request(err.to_string()),
        }
    }
}

/// Validated column values for inserting a new user row.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Unique handle.
    pub username: Username,
    /// Unique contact address.
    pub email: Email,
    /// Salted credential hash in PHC string format.
    pub password_hash: String,
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Replacement handle, subject to the same uniqueness rules.
    pub username: Option<Username>,
    /// Replacement profile text.
    pub about_me: Option<String>,
}

/// A user's current API token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTokenRecord {
    /// Opaque token value.
    pub token: String,
    /// Instant the token stops being honoured.
    pub expires_at: DateTime<Utc>,
}

/// Persistence port for user identity rows.
#[cfg_attr(test, automock)]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, relying on unique indexes as the uniqueness
    /// backstop.
    fn insert(&self, record: &NewUserRecord) -> Result<User, UserStoreError>;

    /// Fetch a user by identifier.
    fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by exact handle.
    fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError>;

    /// Fetch a user by exact address.
    fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    /// Read the stored credential hash for a user.
    fn password_hash(&self, id: UserId) -> Result<Option<String>, UserStoreError>;

    /// Replace the stored credential hash.
    fn set_password_hash(&self, id: UserId, hash: &str) -> Result<(), UserStoreError>;

    /// Apply a partial profile update and return the fresh row.
    fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<User, UserStoreError>;

    /// Read the user's current API token, when one was ever issued.
    fn api_token(&self, id: UserId) -> Result<Option<ApiTokenRecord>, UserStoreError>;

    /// Store a freshly minted API token and its expiry.
    fn store_api_token(
        &self,
        id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError>;

    /// Resolve a bearer token to its user and expiry.
    fn find_by_api_token(
        &self,
        token: &str,
    ) -> Result<Option<(User, DateTime<Utc>)>, UserStoreError>;

    /// Record request activity for the user.
    fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<(), UserStoreError>;

    /// Move the unread direct-message watermark forward.
    fn set_last_message_read_time(
        &self,
        id: UserId,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError>;
}

/// Persistence port for the directed follow graph.
///
/// The join table's composite primary key guarantees at most one edge per
/// ordered pair; `insert_edge` must therefore be insert-or-ignore so a
/// repeated follow is a no-op rather than a constraint failure.
#[cfg_attr(test, automock)]
pub trait SocialGraphRepository: Send + Sync {
    /// Add a follow edge; a duplicate insert is silently absorbed.
    fn insert_edge(&self, follower: UserId, followed: UserId) -> Result<(), StoreError>;

    /// Remove a follow edge; removing a missing edge is a no-op.
    fn delete_edge(&self, follower: UserId, followed: UserId) -> Result<(), StoreError>;

    /// Whether `follower` currently follows `followed`.
    fn edge_exists(&self, follower: UserId, followed: UserId) -> Result<bool, StoreError>;

    /// Number of users following `user`, counted from join rows.
    fn follower_count(&self, user: UserId) -> Result<u64, StoreError>;

    /// Number of users `user` follows, counted from join rows.
    fn following_count(&self, user: UserId) -> Result<u64, StoreError>;

    /// Users following `user`, ordered by handle.
    fn followers(&self, user: UserId, page: PageRequest) -> Result<Page<User>, StoreError>;

    /// Users `user` follows, ordered by handle.
    fn following(&self, user: UserId, page: PageRequest) -> Result<Page<User>, StoreError>;
}

/// Column values for inserting a new post row.
#[derive(Debug, Clone)]
pub struct NewPostRecord {
    /// Author of the post.
    pub author: UserId,
    /// Bounded status text.
    pub body: PostBody,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Detected language code, when detection ran.
    pub language: Option<String>,
}

/// Persistence port for posts, including the feed composition queries.
#[cfg_attr(test, automock)]
pub trait PostRepository: Send + Sync {
    /// Insert a new post and return the stored row.
    fn insert(&self, record: &NewPostRecord) -> Result<Post, StoreError>;

    /// Fetch a post by identifier.
    fn find_by_id(&self, id: PostId) -> Result<Option<Post>, StoreError>;

    /// Fetch several posts at once; missing ids are skipped.
    fn find_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, StoreError>;

    /// Delete a post, reporting whether a row existed.
    fn delete(&self, id: PostId) -> Result<bool, StoreError>;

    /// The user's home timeline: own posts plus followed authors' posts,
    /// deduplicated, newest first. Implemented as a single join query.
    fn home_timeline(&self, user: UserId, page: PageRequest) -> Result<Page<Post>, StoreError>;

    /// Every post, newest first.
    fn explore(&self, page: PageRequest) -> Result<Page<Post>, StoreError>;

    /// Posts by one author, newest first.
    fn by_author(&self, author: UserId, page: PageRequest) -> Result<Page<Post>, StoreError>;

    /// Every post, for rebuilding the search index.
    fn all_for_reindex(&self) -> Result<Vec<Post>, StoreError>;
}

/// Column values for inserting a new message row.
#[derive(Debug, Clone)]
pub struct NewMessageRecord {
    /// User who wrote the message.
    pub sender: UserId,
    /// User the message is addressed to.
    pub recipient: UserId,
    /// Message text.
    pub body: String,
    /// Delivery time.
    pub timestamp: DateTime<Utc>,
}

/// Persistence port for direct messages.
#[cfg_attr(test, automock)]
pub trait MessageRepository: Send + Sync {
    /// Insert a new message and return the stored row.
    fn insert(&self, record: &NewMessageRecord) -> Result<Message, StoreError>;

    /// Messages received by `user`, newest first.
    fn received(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, StoreError>;

    /// Messages sent by `user`, newest first.
    fn sent(&self, user: UserId, page: PageRequest) -> Result<Page<Message>, StoreError>;

    /// Count of messages received by `user` after `since`; all messages
    /// when `since` is `None`.
    fn received_count_since(
        &self,
        user: UserId,
        since: Option<DateTime<Utc>>,
    ) -> Result<u64, StoreError>;
}

/// Persistence port for the notification ledger.
#[cfg_attr(test, automock)]
pub trait NotificationRepository: Send + Sync {
    /// Atomically replace any notification with this name for the user:
    /// delete-then-insert inside one transaction.
    fn replace(
        &self,
        user: UserId,
        name: &str,
        payload: &Value,
        timestamp: f64,
    ) -> Result<Notification, StoreError>;

    /// Notifications with timestamp strictly greater than `since`, oldest
    /// first.
    fn since(&self, user: UserId, since: f64) -> Result<Vec<Notification>, StoreError>;
}

/// Persistence port for background task records.
#[cfg_attr(test, automock)]
pub trait TaskRepository: Send + Sync {
    /// Record a task keyed by the runner's job id.
    fn insert(&self, task: &Task) -> Result<(), StoreError>;

    /// Fetch a task by job id.
    fn find_by_id(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Incomplete tasks for the user.
    fn in_progress(&self, user: UserId) -> Result<Vec<Task>, StoreError>;

    /// The incomplete task with this name for the user, when one exists.
    fn in_progress_named(&self, user: UserId, name: &str) -> Result<Option<Task>, StoreError>;

    /// Flip the completion flag, reporting whether a row existed.
    fn mark_complete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Errors surfaced by the external search index adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchIndexError {
    /// The index for this table does not exist yet.
    ///
    /// Callers soft-fail this to an empty result set rather than
    /// propagating it.
    #[error("search index for table '{table}' is missing")]
    IndexMissing {
        /// Table whose index is absent.
        table: String,
    },
    /// The index backend is unreachable or rejected the call.
    #[error("search index backend failure: {message}")]
    Backend {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl SearchIndexError {
    /// Helper for missing-index results.
    pub fn index_missing(table: impl Into<String>) -> Self {
        Self::IndexMissing {
            table: table.into(),
        }
    }

    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Ranked primary keys returned by a search query, plus the total match
/// count before pagination.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankedIds {
    /// Primary keys in descending rank order for the requested page.
    pub ids: Vec<i32>,
    /// Total matches in the whole index.
    pub total: u64,
}

/// Port for the external full-text index.
///
/// Documents are addressed by `(table, primary key)` and hold only the
/// declared searchable fields. The synchroniser is the only writer.
#[cfg_attr(test, automock)]
pub trait SearchIndex: Send + Sync {
    /// Insert or update a document.
    fn upsert(&self, table: &str, id: i32, fields: &[(String, String)])
    -> Result<(), SearchIndexError>;

    /// Delete a document by primary key; deleting an absent document is a
    /// no-op.
    fn remove(&self, table: &str, id: i32) -> Result<(), SearchIndexError>;

    /// Free-text query returning ranked primary keys and the total count.
    fn query(
        &self,
        table: &str,
        text: &str,
        page: PageRequest,
    ) -> Result<RankedIds, SearchIndexError>;
}

/// Errors surfaced by the job runner adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobRunnerError {
    /// Queue infrastructure is unavailable.
    #[error("job runner is unavailable: {message}")]
    Unavailable {
        /// Adapter-provided failure description.
        message: String,
    },
    /// The job could not be accepted.
    #[error("job was rejected: {message}")]
    Rejected {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl JobRunnerError {
    /// Helper for queue outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for rejected jobs.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<JobRunnerError> for Error {
    fn from(err: JobRunnerError) -> Self {
        Self::service_unavailable(err.to_string())
    }
}

/// Work submitted to the external job runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    /// Registered job name the runner dispatches on.
    pub name: String,
    /// User the work belongs to.
    pub user: UserId,
    /// JSON-encoded job arguments.
    pub args: Value,
}

/// Live job metadata read back from the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobStatus {
    /// Completion percentage, `0..=100`.
    pub progress: u8,
}

/// Port for the external background job runner.
///
/// The web process only enqueues and polls; it never blocks on execution.
/// Lookups for unknown or expired job ids yield `Ok(None)`, not an error.
#[cfg_attr(test, automock)]
pub trait JobRunner: Send + Sync {
    /// Enqueue work, returning the runner's opaque job id.
    fn enqueue(&self, request: &JobRequest) -> Result<String, JobRunnerError>;

    /// Look up live metadata for a job.
    fn status(&self, job_id: &str) -> Result<Option<JobStatus>, JobRunnerError>;
}

/// Errors surfaced by mail delivery adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    /// The message could not be handed to the delivery backend.
    #[error("mail delivery failed: {message}")]
    Delivery {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl MailError {
    /// Helper for delivery failures.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
        }
    }
}

impl From<MailError> for Error {
    fn from(err: MailError) -> Self {
        Self::service_unavailable(err.to_string())
    }
}

/// An outbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    /// Subject line.
    pub subject: String,
    /// Sender address.
    pub sender: String,
    /// Recipient addresses.
    pub recipients: Vec<String>,
    /// Plain-text body.
    pub text_body: String,
    /// Optional HTML body.
    pub html_body: Option<String>,
}

/// Port for mail delivery.
///
/// Submission may be synchronous or fire-and-forget; the guarantee is
/// at-most-once delivery with no caller-visible blocking.
#[cfg_attr(test, automock)]
pub trait Mailer: Send + Sync {
    /// Hand a message to the delivery backend.
    fn send(&self, mail: OutboundMail) -> Result<(), MailError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn store_error_helpers_carry_messages() {
        assert!(
            StoreError::connection("refused")
                .to_string()
                .contains("refused")
        );
        assert!(StoreError::query("syntax").to_string().contains("syntax"));
    }

    #[rstest]
    fn duplicate_error_names_the_field() {
        let err = UserStoreError::duplicate("username");
        assert_eq!(err.to_string(), "username is already taken");
    }

    #[rstest]
    fn missing_index_error_names_the_table() {
        let err = SearchIndexError::index_missing("posts");
        assert!(err.to_string().contains("posts"));
    }
}
