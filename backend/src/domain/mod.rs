//! Domain entities, ports, and application services.
//!
//! Purpose: hold the whole behaviour of the system behind storage- and
//! transport-agnostic types. Entities are strongly typed and validated at
//! construction; ports describe what the domain needs from driven adapters;
//! services compose the two into the operations the serving layer exposes.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload and taxonomy.
//! - Entities: User, Post, Message, Notification, Task and their id and
//!   value newtypes.
//! - Services: IdentityService, SocialGraphService, FeedService,
//!   ContentService, MessagingService, NotificationService, TaskService,
//!   SearchService.

pub mod auth;
pub mod content;
pub mod error;
pub mod feed;
pub mod identity;
pub mod message;
pub mod messaging;
pub mod notification;
pub mod notifications;
pub mod ports;
pub mod post;
pub mod search;
pub mod social_graph;
pub mod task;
pub mod tasks;
pub mod user;

pub use self::content::ContentService;
pub use self::error::{Error, ErrorCode};
pub use self::feed::FeedService;
pub use self::identity::IdentityService;
pub use self::message::{Message, MessageId};
pub use self::messaging::{MessagingService, UNREAD_COUNT_NOTIFICATION};
pub use self::notification::{Notification, NotificationId};
pub use self::notifications::NotificationService;
pub use self::post::{Post, PostBody, PostId, PostValidationError};
pub use self::search::{IndexBatch, SearchService, Searchable};
pub use self::social_graph::SocialGraphService;
pub use self::task::Task;
pub use self::tasks::TaskService;
pub use self::user::{Email, User, UserId, UserValidationError, Username};

/// Convenient domain result alias.
pub type DomainResult<T> = Result<T, Error>;
