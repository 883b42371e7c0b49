//! reading-log: a personal reading log served over HTTP.
//!
//! Tracks books (title, author, genre, progress, status, notes) in a
//! single SQLite table, enriches new entries with cover art from the
//! Google Books volumes API and exports the library as CSV.
//!
//! # Features
//!
//! - JSON API for listing, creating, updating and deleting books
//! - Status filter and case-insensitive title/author search
//! - Best-effort cover lookup with `https` thumbnails
//! - CSV export as a downloadable attachment
//! - Static serving of the HTML front end

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Cover art lookup.
pub mod covers;
/// Database operations.
pub mod db;
/// Error types.
pub mod error;
/// CSV export.
pub mod export;
/// HTTP server.
pub mod server;


pub use config::{Cli, Command, Config};
pub use covers::CoverResolver;
pub use db::Database;
pub use error::{AppError, Result};
pub use server::AppState;
