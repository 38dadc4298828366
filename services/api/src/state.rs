//! Application state shared across handlers

use catalog::services::{MovieService, RatingService};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::middleware::JwtVerifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub movie_service: MovieService,
    pub rating_service: RatingService,
    pub jwt: JwtVerifier,
    /// Cancelled when the process shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Token for one request, cancelled together with the server
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
