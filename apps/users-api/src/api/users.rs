//! Users API routes
//!
//! Wires the users domain to HTTP routes over the configured collection.

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState) -> Router {
    let repository =
        MongoUserRepository::with_collection(state.db.clone(), &state.config.mongodb.collection);

    handlers::router(UserService::new(repository))
}
