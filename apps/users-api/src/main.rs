use axum_helpers::server::{create_production_app, create_router, health_router, info_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::MongoUserRepository;
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(&config.mongodb.database);

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database
    );

    MongoUserRepository::with_collection(db.clone(), &config.mongodb.collection)
        .create_indexes()
        .await?;

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let api_routes = api::routes(&state);

    let router = create_router::<openapi::ApiDoc>(api_routes, &state.config.server).await?;

    let app = router
        .merge(health_router(state.config.app))
        .merge(info_router(state.config.app));

    let shutdown_timeout = Duration::from_secs(state.config.server.shutdown_timeout_secs);
    info!(
        "Starting {} with graceful shutdown ({:?} timeout)",
        state.config.app.name, shutdown_timeout
    );

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, shutdown_timeout, async move {
        info!("Shutting down: closing MongoDB connections");
        // MongoDB client closes automatically on drop
        drop(state.mongo_client);
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("User Management API shutdown complete");
    Ok(())
}
