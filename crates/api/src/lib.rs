//! Bistro API library.
//!
//! This crate provides the ordering backend as a library, allowing the
//! router to be exercised directly in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod state;

/// Embedded sqlx migrations for the service database.
///
/// Run at startup by the binary and by test harnesses against in-memory
/// databases.
#[must_use]
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}
