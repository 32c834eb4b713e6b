//! Backend for a micro-blogging service.
//!
//! The crate is organised hexagonally:
//!
//! - [`domain`] holds the entities, the ports the domain expects its
//!   collaborators to implement, and the application services: identity,
//!   the follow graph, feed composition, content and search, private
//!   messaging, the notification ledger, and background task tracking.
//! - [`outbound`] holds the driven adapters: Diesel/SQLite repositories,
//!   the in-process search index and job runner, and mail delivery.
//! - [`config`] and [`telemetry`] wire the environment and tracing.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod telemetry;
