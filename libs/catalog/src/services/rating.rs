//! Rating service

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::CatalogResult,
    models::MovieRating,
    repositories::{MovieRepository, RatingRepository},
    validation::{ValidationErrors, validate_rating},
};

/// Rating service
#[derive(Clone)]
pub struct RatingService {
    ratings: RatingRepository,
    movies: MovieRepository,
}

impl RatingService {
    /// Create a new rating service
    pub fn new(ratings: RatingRepository, movies: MovieRepository) -> Self {
        Self { ratings, movies }
    }

    /// Rate a movie on behalf of a user.
    ///
    /// Out-of-range values and unknown movies are validation failures, raised
    /// before anything is written.
    pub async fn rate_movie(
        &self,
        movie_id: Uuid,
        rating: i32,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> CatalogResult<bool> {
        validate_rating(rating)?;

        if !self.movies.exists_by_id(movie_id, cancel).await? {
            return Err(ValidationErrors::single("movie_id", "Movie does not exist").into());
        }

        Ok(self
            .ratings
            .rate_movie(movie_id, rating, user_id, cancel)
            .await?)
    }

    /// `false` when the user had not rated the movie
    pub async fn delete_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> CatalogResult<bool> {
        Ok(self.ratings.delete_rating(movie_id, user_id, cancel).await?)
    }

    pub async fn get_all_ratings(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> CatalogResult<Vec<MovieRating>> {
        Ok(self.ratings.get_ratings_for_user(user_id, cancel).await?)
    }
}
