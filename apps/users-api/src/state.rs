//! Application state management.
//!
//! Shared state handed to route builders: configuration plus the MongoDB
//! client and database handles.

use mongodb::{Client, Database};

/// Shared application state.
///
/// Cloning is cheap; the MongoDB client shares its connection pool.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    pub mongo_client: Client,
    /// Database named by `MONGODB_DATABASE`
    pub db: Database,
}
