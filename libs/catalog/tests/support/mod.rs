//! Shared setup for the catalog integration tests
//!
//! The tests run against the PostgreSQL database named by `DATABASE_URL`.
//! Every test works on movies with unique titles so that runs do not see
//! each other's rows.

#![allow(dead_code)]

use catalog::{
    models::Movie,
    repositories::{MovieRepository, RatingRepository},
    services::{MovieService, RatingService},
};
use common::database::{ConnectionFactory, DatabaseConfig, init_pool, initialize_schema};
use sqlx::PgPool;
use uuid::Uuid;

pub struct Catalog {
    pub pool: PgPool,
    pub movies: MovieService,
    pub ratings: RatingService,
    pub movie_repository: MovieRepository,
}

pub async fn setup() -> Catalog {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    initialize_schema(&pool).await.expect("schema");

    let db = ConnectionFactory::new(pool.clone());
    let movie_repository = MovieRepository::new(db.clone());
    let rating_repository = RatingRepository::new(db);

    Catalog {
        pool,
        movies: MovieService::new(movie_repository.clone(), rating_repository.clone()),
        ratings: RatingService::new(rating_repository, movie_repository.clone()),
        movie_repository,
    }
}

/// A title no other test run will produce
pub fn unique_title(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

pub fn genres(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn sorted(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values
}

pub fn movie(title: &str, year: i32, genre_names: &[&str]) -> Movie {
    Movie::new(title, year, genres(genre_names))
}

pub async fn row_count(pool: &PgPool, table: &str, movie_id: Uuid) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE movieid = $1", table);
    sqlx::query_scalar(&sql)
        .bind(movie_id)
        .fetch_one(pool)
        .await
        .expect("row count")
}
