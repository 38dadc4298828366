//! API models for request and response payloads

pub mod movie;
pub mod rating;

pub use movie::{
    CreateMovieRequest, MovieListResponse, MovieQuery, MovieResponse, UpdateMovieRequest,
};
pub use rating::{MovieRatingResponse, RateMovieRequest};
