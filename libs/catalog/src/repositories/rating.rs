//! Rating repository for database operations

use common::{
    cancel::cancellable,
    database::ConnectionFactory,
    error::{DatabaseError, DatabaseResult},
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

use crate::models::{MovieRating, RatingSummary};

/// Rating repository
#[derive(Clone)]
pub struct RatingRepository {
    db: ConnectionFactory,
}

impl RatingRepository {
    /// Create a new rating repository
    pub fn new(db: ConnectionFactory) -> Self {
        Self { db }
    }

    /// Insert or overwrite the user's rating for a movie.
    ///
    /// Concurrent calls for the same pair rely on the upsert being atomic per
    /// row: the last committed value wins and no duplicate-key error escapes.
    pub async fn rate_movie(
        &self,
        movie_id: Uuid,
        rating: i32,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> DatabaseResult<bool> {
        cancellable(cancel, async {
            info!("User {} rating movie {} with {}", user_id, movie_id, rating);

            let mut conn = self.db.connect().await?;
            let result = sqlx::query(
                r#"
                INSERT INTO ratings (userid, movieid, rating)
                VALUES ($1, $2, $3)
                ON CONFLICT (userid, movieid) DO UPDATE
                SET rating = EXCLUDED.rating
                "#,
            )
            .bind(user_id)
            .bind(movie_id)
            .bind(rating)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::Query)?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Remove the user's rating; `false` when there was none
    pub async fn delete_rating(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> DatabaseResult<bool> {
        cancellable(cancel, async {
            info!("User {} removing rating for movie {}", user_id, movie_id);

            let mut conn = self.db.connect().await?;
            let result = sqlx::query("DELETE FROM ratings WHERE userid = $1 AND movieid = $2")
                .bind(user_id)
                .bind(movie_id)
                .execute(&mut *conn)
                .await
                .map_err(DatabaseError::Query)?;

            Ok(result.rows_affected() > 0)
        })
        .await
    }

    /// Average rating of a movie, `None` when nobody rated it
    pub async fn get_rating(
        &self,
        movie_id: Uuid,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Option<f32>> {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            // AVG over zero rows yields a single NULL row
            sqlx::query_scalar("SELECT AVG(rating)::real FROM ratings WHERE movieid = $1")
                .bind(movie_id)
                .fetch_one(&mut *conn)
                .await
                .map_err(DatabaseError::Query)
        })
        .await
    }

    /// Average rating and the user's own rating in one round trip
    pub async fn get_rating_for_user(
        &self,
        movie_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> DatabaseResult<RatingSummary> {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            sqlx::query_as(
                r#"
                SELECT AVG(rating)::real AS rating,
                       (SELECT rating FROM ratings WHERE movieid = $1 AND userid = $2) AS userrating
                FROM ratings
                WHERE movieid = $1
                "#,
            )
            .bind(movie_id)
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::Query)
        })
        .await
    }

    /// Every rating a user has given, with the rated movie's slug
    pub async fn get_ratings_for_user(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Vec<MovieRating>> {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            sqlx::query_as(
                r#"
                SELECT r.movieid, m.slug, r.rating
                FROM ratings r
                INNER JOIN movies m ON m.id = r.movieid
                WHERE r.userid = $1
                ORDER BY m.slug
                "#,
            )
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::Query)
        })
        .await
    }
}
