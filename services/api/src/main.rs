use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod routes;
mod state;

use catalog::{
    repositories::{MovieRepository, RatingRepository},
    services::{MovieService, RatingService},
};
use common::database::{ConnectionFactory, DatabaseConfig, init_pool, initialize_schema};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{config::Settings, middleware::JwtVerifier, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting movies API service");

    let settings = Settings::from_env()?;
    let jwt = JwtVerifier::from_settings(&settings)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    initialize_schema(&pool).await?;

    let db = ConnectionFactory::new(pool.clone());
    let movie_repository = MovieRepository::new(db.clone());
    let rating_repository = RatingRepository::new(db);

    let shutdown = CancellationToken::new();
    let app_state = AppState {
        db_pool: pool,
        movie_service: MovieService::new(movie_repository.clone(), rating_repository.clone()),
        rating_service: RatingService::new(rating_repository, movie_repository),
        jwt,
        shutdown: shutdown.clone(),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("Movies API listening on {}", settings.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Movies API stopped");
    Ok(())
}

/// Resolves on Ctrl-C and cancels every in-flight request token
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}
