//! Movie repository: joined reads, row flattening and transactional writes

use common::{
    cancel::cancellable,
    database::ConnectionFactory,
    error::{DatabaseError, DatabaseResult},
};
use sqlx::{Connection, FromRow};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Movie, MovieFilter, MovieListQuery, Sort};

/// Average rating per movie, joined into every movie read
const AVERAGE_RATINGS: &str =
    "SELECT movieid, AVG(rating)::real AS rating FROM ratings GROUP BY movieid";

/// Title/year predicate over `movies m`, binding `$1` (title) and `$2` (year).
/// Listing and counting both use it so page and total agree.
const FILTER_PREDICATE: &str = r#"
    ($1::text IS NULL OR m.title ILIKE ('%' || $1 || '%'))
    AND ($2::int IS NULL OR m.yearofrelease = $2)
"#;

/// One row of the movie/genre/rating join.
///
/// A movie with n genres arrives as n rows that differ only in `genre`.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct MovieRow {
    pub id: Uuid,
    pub title: String,
    #[sqlx(rename = "yearofrelease")]
    pub year_of_release: i32,
    pub genre: Option<String>,
    pub rating: Option<f32>,
    #[sqlx(rename = "userrating")]
    pub user_rating: Option<i32>,
}

/// Fold joined rows into movies, preserving the order of first arrival.
pub(crate) fn flatten_rows(rows: Vec<MovieRow>) -> Vec<Movie> {
    let mut index_by_id: HashMap<Uuid, usize> = HashMap::new();
    let mut movies: Vec<Movie> = Vec::new();

    for row in rows {
        let index = match index_by_id.get(&row.id) {
            Some(&index) => index,
            None => {
                movies.push(Movie {
                    id: row.id,
                    title: row.title,
                    year_of_release: row.year_of_release,
                    genres: Vec::new(),
                    rating: row.rating,
                    user_rating: row.user_rating,
                });
                index_by_id.insert(row.id, movies.len() - 1);
                movies.len() - 1
            }
        };

        if let Some(genre) = row.genre.filter(|genre| !genre.is_empty()) {
            movies[index].genres.push(genre);
        }
    }

    movies
}

/// Genres to delete and to insert to move from one genre set to another
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct GenreDiff {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

impl GenreDiff {
    /// Set difference in both directions; genres present on both sides are
    /// left out so their rows are never touched.
    pub fn between(existing: &[String], desired: &[String]) -> Self {
        Self {
            removed: difference(existing, desired),
            added: difference(desired, existing),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

fn difference(left: &[String], right: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for genre in left {
        if !right.contains(genre) && !result.contains(genre) {
            result.push(genre.clone());
        }
    }
    result
}

/// ORDER BY body for a listing, qualified with `alias`.
///
/// Only enum-derived column names reach the SQL text; the movie id is always
/// the last key so pages are stable.
pub(crate) fn order_clause(alias: &str, sort: Option<Sort>) -> String {
    match sort {
        Some(sort) => format!(
            "{alias}.{} {}, {alias}.id",
            sort.field.column(),
            if sort.descending { "DESC" } else { "ASC" }
        ),
        None => format!("{alias}.id"),
    }
}

fn list_sql(sort: Option<Sort>) -> String {
    format!(
        r#"
        WITH page AS (
            SELECT m.id, m.title, m.yearofrelease
            FROM movies m
            WHERE {FILTER_PREDICATE}
            ORDER BY {inner_order}
            LIMIT $3 OFFSET $4
        )
        SELECT p.id, p.title, p.yearofrelease, g.name AS genre,
               ar.rating, ur.rating AS userrating
        FROM page p
        LEFT JOIN genres g ON g.movieid = p.id
        LEFT JOIN ({AVERAGE_RATINGS}) ar ON ar.movieid = p.id
        LEFT JOIN ratings ur ON ur.movieid = p.id AND ur.userid = $5
        ORDER BY {outer_order}
        "#,
        inner_order = order_clause("m", sort),
        outer_order = order_clause("p", sort),
    )
}

fn single_sql(predicate: &str) -> String {
    format!(
        r#"
        SELECT m.id, m.title, m.yearofrelease, g.name AS genre,
               ar.rating, ur.rating AS userrating
        FROM movies m
        LEFT JOIN genres g ON g.movieid = m.id
        LEFT JOIN ({AVERAGE_RATINGS}) ar ON ar.movieid = m.id
        LEFT JOIN ratings ur ON ur.movieid = m.id AND ur.userid = $2
        WHERE {predicate}
        "#
    )
}

fn ensure_genre_name(genre: &str) -> DatabaseResult<()> {
    if genre.trim().is_empty() {
        return Err(DatabaseError::InvalidInput(
            "Genre name cannot be null or empty".to_string(),
        ));
    }
    Ok(())
}

/// Movie repository for database operations
#[derive(Clone)]
pub struct MovieRepository {
    db: ConnectionFactory,
}

impl MovieRepository {
    /// Create a new movie repository
    pub fn new(db: ConnectionFactory) -> Self {
        Self { db }
    }

    /// Insert a movie and its genres in one transaction
    pub async fn create(&self, movie: &Movie, cancel: &CancellationToken) -> DatabaseResult<bool> {
        if movie.id.is_nil() || movie.title.trim().is_empty() {
            return Err(DatabaseError::InvalidInput(
                "Movie must have a valid id and title".to_string(),
            ));
        }

        cancellable(cancel, async {
            info!("Creating movie {} ({})", movie.id, movie.slug());

            let mut conn = self.db.connect().await?;
            let mut tx = conn.begin().await.map_err(DatabaseError::Query)?;

            let result = sqlx::query(
                r#"
                INSERT INTO movies (id, slug, title, yearofrelease)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(movie.id)
            .bind(movie.slug())
            .bind(&movie.title)
            .bind(movie.year_of_release)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::NoRowsAffected(format!(
                    "insert of movie {}",
                    movie.id
                )));
            }

            for genre in &movie.genres {
                ensure_genre_name(genre)?;

                sqlx::query("INSERT INTO genres (movieid, name) VALUES ($1, $2)")
                    .bind(movie.id)
                    .bind(genre)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::Query)?;
            }

            tx.commit().await.map_err(DatabaseError::Query)?;
            Ok(true)
        })
        .await
    }

    /// Get a movie by id, with the given user's rating attached when present
    pub async fn get_by_id(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Option<Movie>> {
        debug!("Getting movie by id: {}", id);
        self.fetch_single(&single_sql("m.id = $1"), id, user_id, cancel)
            .await
    }

    /// Get a movie by slug, with the given user's rating attached when present
    pub async fn get_by_slug(
        &self,
        slug: &str,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Option<Movie>> {
        debug!("Getting movie by slug: {}", slug);
        self.fetch_single(&single_sql("m.slug = $1"), slug, user_id, cancel)
            .await
    }

    async fn fetch_single<'q, K>(
        &self,
        sql: &'q str,
        key: K,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Option<Movie>>
    where
        K: 'q + Send + sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            let rows: Vec<MovieRow> = sqlx::query_as(sql)
                .bind(key)
                .bind(user_id)
                .fetch_all(&mut *conn)
                .await
                .map_err(DatabaseError::Query)?;

            Ok(flatten_rows(rows).into_iter().next())
        })
        .await
    }

    /// Get one page of movies matching a validated query
    pub async fn get_all(
        &self,
        query: &MovieListQuery,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Vec<Movie>> {
        debug!(
            "Listing movies: page {} size {} sort {:?}",
            query.page, query.page_size, query.sort
        );

        let sql = list_sql(query.sort);
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            let rows: Vec<MovieRow> = sqlx::query_as(&sql)
                .bind(query.filter.title.as_deref())
                .bind(query.filter.year_of_release)
                .bind(query.limit())
                .bind(query.offset())
                .bind(query.user_id)
                .fetch_all(&mut *conn)
                .await
                .map_err(DatabaseError::Query)?;

            Ok(flatten_rows(rows))
        })
        .await
    }

    /// Count every movie matching the filter, ignoring paging
    pub async fn count(
        &self,
        filter: &MovieFilter,
        cancel: &CancellationToken,
    ) -> DatabaseResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM movies m WHERE {FILTER_PREDICATE}");
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            sqlx::query_scalar(&sql)
                .bind(filter.title.as_deref())
                .bind(filter.year_of_release)
                .fetch_one(&mut *conn)
                .await
                .map_err(DatabaseError::Query)
        })
        .await
    }

    /// Update the movie row and reconcile its genres with `movie.genres`
    pub async fn update(&self, movie: &Movie, cancel: &CancellationToken) -> DatabaseResult<bool> {
        cancellable(cancel, async {
            info!("Updating movie {} ({})", movie.id, movie.slug());

            let mut conn = self.db.connect().await?;
            let mut tx = conn.begin().await.map_err(DatabaseError::Query)?;

            let result = sqlx::query(
                r#"
                UPDATE movies
                SET slug = $2, title = $3, yearofrelease = $4
                WHERE id = $1
                "#,
            )
            .bind(movie.id)
            .bind(movie.slug())
            .bind(&movie.title)
            .bind(movie.year_of_release)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::NoRowsAffected(format!(
                    "update of movie {}",
                    movie.id
                )));
            }

            let existing: Vec<String> =
                sqlx::query_scalar("SELECT name FROM genres WHERE movieid = $1")
                    .bind(movie.id)
                    .fetch_all(&mut *tx)
                    .await
                    .map_err(DatabaseError::Query)?;

            let diff = GenreDiff::between(&existing, &movie.genres);
            if diff.is_empty() {
                debug!("Genres of movie {} unchanged", movie.id);
            } else {
                debug!(
                    "Genre changes for movie {}: -{:?} +{:?}",
                    movie.id, diff.removed, diff.added
                );
            }

            for genre in &diff.removed {
                sqlx::query("DELETE FROM genres WHERE movieid = $1 AND name = $2")
                    .bind(movie.id)
                    .bind(genre)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::Query)?;
            }

            for genre in &diff.added {
                ensure_genre_name(genre)?;

                sqlx::query("INSERT INTO genres (movieid, name) VALUES ($1, $2)")
                    .bind(movie.id)
                    .bind(genre)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::Query)?;
            }

            tx.commit().await.map_err(DatabaseError::Query)?;
            Ok(true)
        })
        .await
    }

    /// Delete a movie with its genres and ratings.
    ///
    /// Returns `false`, with everything rolled back, when no movie row had
    /// that id.
    pub async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> DatabaseResult<bool> {
        cancellable(cancel, async {
            info!("Deleting movie {}", id);

            let mut conn = self.db.connect().await?;
            let mut tx = conn.begin().await.map_err(DatabaseError::Query)?;

            for statement in [
                "DELETE FROM genres WHERE movieid = $1",
                "DELETE FROM ratings WHERE movieid = $1",
            ] {
                sqlx::query(statement)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(DatabaseError::Query)?;
            }

            let result = sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(DatabaseError::Query)?;

            if result.rows_affected() == 0 {
                warn!("Movie {} not found, rolling back delete", id);
                tx.rollback().await.map_err(DatabaseError::Query)?;
                return Ok(false);
            }

            tx.commit().await.map_err(DatabaseError::Query)?;
            Ok(true)
        })
        .await
    }

    /// Cheap existence probe that does not materialize the movie
    pub async fn exists_by_id(&self, id: Uuid, cancel: &CancellationToken) -> DatabaseResult<bool> {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *conn)
                .await
                .map_err(DatabaseError::Query)
        })
        .await
    }

    /// Id of the movie currently holding `slug`, if any
    pub async fn slug_owner(
        &self,
        slug: &str,
        cancel: &CancellationToken,
    ) -> DatabaseResult<Option<Uuid>> {
        cancellable(cancel, async {
            let mut conn = self.db.connect().await?;

            sqlx::query_scalar("SELECT id FROM movies WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&mut *conn)
                .await
                .map_err(DatabaseError::Query)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SortField;

    fn row(id: Uuid, title: &str, genre: Option<&str>) -> MovieRow {
        MovieRow {
            id,
            title: title.to_string(),
            year_of_release: 1999,
            genre: genre.map(str::to_string),
            rating: Some(4.5),
            user_rating: Some(5),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_flatten_merges_duplicate_rows() {
        let matrix = Uuid::new_v4();
        let rows = vec![
            row(matrix, "The Matrix", Some("Action")),
            row(matrix, "The Matrix", Some("Sci-Fi")),
        ];

        let movies = flatten_rows(rows);
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].genres, strings(&["Action", "Sci-Fi"]));
        assert_eq!(movies[0].rating, Some(4.5));
        assert_eq!(movies[0].user_rating, Some(5));
    }

    #[test]
    fn test_flatten_keeps_first_arrival_order_with_interleaved_rows() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            row(first, "Alien", Some("Horror")),
            row(second, "Brazil", Some("Comedy")),
            row(first, "Alien", Some("Sci-Fi")),
        ];

        let movies = flatten_rows(rows);
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].id, first);
        assert_eq!(movies[0].genres, strings(&["Horror", "Sci-Fi"]));
        assert_eq!(movies[1].id, second);
    }

    #[test]
    fn test_flatten_skips_missing_and_empty_genres() {
        let id = Uuid::new_v4();
        let movies = flatten_rows(vec![row(id, "Untitled", None), row(id, "Untitled", Some(""))]);

        assert_eq!(movies.len(), 1);
        assert!(movies[0].genres.is_empty());
    }

    #[test]
    fn test_flatten_empty_input() {
        assert!(flatten_rows(Vec::new()).is_empty());
    }

    #[test]
    fn test_genre_diff_leaves_shared_genres_alone() {
        let diff = GenreDiff::between(
            &strings(&["Action", "Drama"]),
            &strings(&["Drama", "Comedy"]),
        );

        assert_eq!(diff.removed, strings(&["Action"]));
        assert_eq!(diff.added, strings(&["Comedy"]));
    }

    #[test]
    fn test_genre_diff_identical_sets() {
        let genres = strings(&["Drama", "Action"]);
        let reordered = strings(&["Action", "Drama"]);
        assert!(GenreDiff::between(&genres, &reordered).is_empty());
    }

    #[test]
    fn test_genre_diff_is_distinct() {
        let diff = GenreDiff::between(
            &strings(&["Action", "Action"]),
            &strings(&["Western", "Western"]),
        );
        assert_eq!(diff.removed, strings(&["Action"]));
        assert_eq!(diff.added, strings(&["Western"]));
    }

    #[test]
    fn test_order_clause() {
        assert_eq!(order_clause("m", None), "m.id");
        assert_eq!(
            order_clause(
                "m",
                Some(Sort {
                    field: SortField::Title,
                    descending: false
                })
            ),
            "m.title ASC, m.id"
        );
        assert_eq!(
            order_clause(
                "p",
                Some(Sort {
                    field: SortField::YearOfRelease,
                    descending: true
                })
            ),
            "p.yearofrelease DESC, p.id"
        );
    }

    #[test]
    fn test_list_sql_paginates_movies_before_joining() {
        let sql = list_sql(None);
        let limit = sql.find("LIMIT $3 OFFSET $4").unwrap();
        let genre_join = sql.find("LEFT JOIN genres").unwrap();
        assert!(limit < genre_join);
    }
}
