//! Shared application state passed to the route builders.

use mongodb::{Client, Database};

/// Cloned per handler; the client and database share one connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client, kept for health checks and shutdown
    pub mongo_client: Client,
    /// Handle to the events database
    pub db: Database,
}
