//! Rating contracts

use catalog::models::MovieRating;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for rating a movie
#[derive(Debug, Clone, Deserialize)]
pub struct RateMovieRequest {
    pub rating: i32,
}

/// One entry of the caller's rating history
#[derive(Debug, Clone, Serialize)]
pub struct MovieRatingResponse {
    pub movie_id: Uuid,
    pub slug: String,
    pub rating: i32,
}

impl From<MovieRating> for MovieRatingResponse {
    fn from(rating: MovieRating) -> Self {
        Self {
            movie_id: rating.movie_id,
            slug: rating.slug,
            rating: rating.rating,
        }
    }
}
