//! Application state shared across handlers.

use crate::config::Config;
use crate::covers::CoverResolver;
use crate::db::Database;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Database connection.
    pub db: Database,
    /// Cover lookup.
    pub covers: CoverResolver,
}

impl AppState {
    /// Create application state, building the cover resolver from config.
    pub fn new(config: Config, db: Database) -> Self {
        let covers = CoverResolver::new(&config.covers);
        Self::with_covers(config, db, covers)
    }

    /// Create application state with an explicit cover resolver.
    pub fn with_covers(config: Config, db: Database, covers: CoverResolver) -> Self {
        Self {
            config: Arc::new(config),
            db,
            covers,
        }
    }
}
