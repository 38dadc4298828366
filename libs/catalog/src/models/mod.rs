//! Catalog models

pub mod movie;
pub mod options;
pub mod rating;

pub use movie::{Movie, generate_slug};
pub use options::{GetAllMoviesOptions, MovieFilter, MovieListQuery, Sort, SortField, SortOrder};
pub use rating::{MovieRating, RatingSummary};
