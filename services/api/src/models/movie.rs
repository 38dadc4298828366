//! Movie contracts and their mapping to catalog types

use catalog::models::{GetAllMoviesOptions, Movie, SortOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for creating a movie
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl CreateMovieRequest {
    /// New movie with a freshly generated id
    pub fn into_movie(self) -> Movie {
        Movie::new(self.title, self.year_of_release, self.genres)
    }
}

/// Request for replacing a movie's title, year and genres
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: String,
    pub year_of_release: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl UpdateMovieRequest {
    pub fn into_movie(self, id: Uuid) -> Movie {
        Movie::with_id(id, self.title, self.year_of_release, self.genres)
    }
}

/// Movie as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub year_of_release: i32,
    pub genres: Vec<String>,
    pub rating: Option<f32>,
    pub user_rating: Option<i32>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        let slug = movie.slug();
        Self {
            id: movie.id,
            title: movie.title,
            slug,
            year_of_release: movie.year_of_release,
            genres: movie.genres,
            rating: movie.rating,
            user_rating: movie.user_rating,
        }
    }
}

/// Query parameters for movie listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieQuery {
    /// Case-insensitive title substring
    pub title: Option<String>,
    /// Exact release year
    pub year: Option<i32>,
    /// Field name, optionally prefixed with `+` (ascending) or `-` (descending)
    pub sort_by: Option<String>,
    /// Page number (1-based)
    pub page: Option<i32>,
    pub page_size: Option<i32>,
}

impl MovieQuery {
    /// Listing options for the catalog; range checks are left to its
    /// validator
    pub fn into_options(self, user_id: Option<Uuid>) -> GetAllMoviesOptions {
        let defaults = GetAllMoviesOptions::default();

        let (sort_field, sort_order) = match self.sort_by {
            None => (None, SortOrder::Unsorted),
            Some(sort_by) => {
                let order = if sort_by.starts_with('-') {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                let field = sort_by.trim_start_matches(['+', '-']).to_string();
                (Some(field), order)
            }
        };

        GetAllMoviesOptions {
            title: self.title,
            year_of_release: self.year,
            sort_field,
            sort_order,
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
            user_id,
        }
    }
}

/// Response for movie listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct MovieListResponse {
    pub items: Vec<MovieResponse>,
    pub page: i32,
    pub page_size: i32,
    pub total: i64,
    pub has_next_page: bool,
}

impl MovieListResponse {
    pub fn new(movies: Vec<Movie>, page: i32, page_size: i32, total: i64) -> Self {
        Self {
            items: movies.into_iter().map(MovieResponse::from).collect(),
            page,
            page_size,
            total,
            has_next_page: total > i64::from(page) * i64::from(page_size),
        }
    }
}
