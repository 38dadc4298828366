//! Repositories for database operations

pub mod movie;
pub mod rating;

pub use movie::MovieRepository;
pub use rating::RatingRepository;
