//! Driven adapters implementing the domain ports.
//!
//! - [`persistence`]: Diesel/SQLite repositories behind the relational
//!   store ports.
//! - [`search`]: the in-process full-text index behind the `SearchIndex`
//!   port.
//! - [`jobs`]: the in-process runner behind the `JobRunner` port.
//! - [`mail`]: recording and spooling implementations of the `Mailer`
//!   port.

pub mod jobs;
pub mod mail;
pub mod persistence;
pub mod search;
