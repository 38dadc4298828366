//! Rating models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One entry of a user's rating history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct MovieRating {
    #[sqlx(rename = "movieid")]
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

/// Aggregate rating plus the caller's own rating, read in one round trip
#[derive(Debug, Clone, Copy, PartialEq, Default, FromRow)]
pub struct RatingSummary {
    pub rating: Option<f32>,
    #[sqlx(rename = "userrating")]
    pub user_rating: Option<i32>,
}
