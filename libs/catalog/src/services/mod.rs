//! Catalog services consumed by the request layer

pub mod movie;
pub mod rating;

pub use movie::MovieService;
pub use rating::RatingService;
