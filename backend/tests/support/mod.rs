//! Shared fixture wiring the real adapters for integration suites.
//!
//! Each backend instance owns a private temp-file SQLite database with the
//! embedded migrations applied, plus in-process search, job runner, and
//! mail adapters, so suites exercise the same wiring the application uses
//! without external services.

#![allow(dead_code)]

use std::sync::Arc;

use mockable::DefaultClock;
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use backend::domain::post::PostBody;
use backend::domain::user::{Email, User, UserId, Username};
use backend::domain::{
    ContentService, FeedService, IdentityService, MessagingService, NotificationService, Post,
    SearchService, SocialGraphService, TaskService,
};
use backend::outbound::jobs::InMemoryJobRunner;
use backend::outbound::mail::RecordingMailer;
use backend::outbound::persistence::{
    DbPool, DieselMessageRepository, DieselNotificationRepository, DieselPostRepository,
    DieselSocialGraphRepository, DieselTaskRepository, DieselUserRepository, PoolConfig,
    run_migrations,
};
use backend::outbound::search::InMemorySearchIndex;

const TEST_SECRET: &[u8] = b"integration-test-secret";
const TEST_SENDER: &str = "admin@example.test";

/// Everything an integration scenario needs, wired over one database.
pub struct TestBackend {
    // Holds the database file open for the fixture's lifetime.
    _db_file: NamedTempFile,
    pub index: Arc<InMemorySearchIndex>,
    pub runner: Arc<InMemoryJobRunner>,
    pub mailer: Arc<RecordingMailer>,
    pub identity: IdentityService<DieselUserRepository, RecordingMailer>,
    pub social: SocialGraphService<DieselSocialGraphRepository>,
    pub feed: FeedService<DieselPostRepository>,
    pub content: ContentService<DieselPostRepository, InMemorySearchIndex>,
    pub messaging:
        MessagingService<DieselMessageRepository, DieselUserRepository, DieselNotificationRepository>,
    pub notifications: NotificationService<DieselNotificationRepository>,
    pub tasks: TaskService<DieselTaskRepository, InMemoryJobRunner>,
}

impl TestBackend {
    /// Stand up a fresh backend over an empty migrated database.
    pub fn new() -> Self {
        let db_file = NamedTempFile::new().expect("temp database file");
        let database_url = db_file
            .path()
            .to_str()
            .expect("temp path is valid UTF-8")
            .to_owned();

        let pool = DbPool::new(PoolConfig::new(database_url)).expect("pool");
        let mut conn = pool.get().expect("connection");
        run_migrations(&mut conn).expect("migrations");
        drop(conn);

        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let graph = Arc::new(DieselSocialGraphRepository::new(pool.clone()));
        let posts = Arc::new(DieselPostRepository::new(pool.clone()));
        let messages = Arc::new(DieselMessageRepository::new(pool.clone()));
        let notification_repo = Arc::new(DieselNotificationRepository::new(pool.clone()));
        let task_repo = Arc::new(DieselTaskRepository::new(pool));

        let index = Arc::new(InMemorySearchIndex::new());
        let runner = Arc::new(InMemoryJobRunner::new());
        let mailer = Arc::new(RecordingMailer::new());
        let clock = Arc::new(DefaultClock);

        Self {
            _db_file: db_file,
            index: index.clone(),
            runner: runner.clone(),
            mailer: mailer.clone(),
            identity: IdentityService::new(
                users.clone(),
                mailer,
                clock.clone(),
                TEST_SECRET.to_vec(),
                TEST_SENDER,
            ),
            social: SocialGraphService::new(graph),
            feed: FeedService::new(posts.clone()),
            content: ContentService::new(
                posts,
                SearchService::new(index),
                clock.clone(),
            ),
            messaging: MessagingService::new(
                messages,
                users,
                NotificationService::new(notification_repo.clone(), clock.clone()),
                clock.clone(),
            ),
            notifications: NotificationService::new(notification_repo, clock),
            tasks: TaskService::new(task_repo, runner),
        }
    }

    /// Register a user with a throwaway password.
    pub fn register(&self, handle: &str) -> User {
        self.identity
            .register(
                Username::new(handle).expect("valid handle"),
                Email::new(format!("{handle}@example.test")).expect("valid email"),
                Zeroizing::new("correct horse battery".to_owned()),
            )
            .expect("registered")
    }

    /// Publish a post for the given author.
    pub fn publish(&self, author: UserId, body: &str) -> Post {
        self.content
            .create_post(author, PostBody::new(body).expect("valid body"), None)
            .expect("published")
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new()
    }
}
