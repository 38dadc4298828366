//! Movie catalog core
//!
//! Reconstructs movies from joined movie/genre/rating rows, performs the
//! transactional multi-table writes, validates list options and movie input,
//! and computes aggregate and per-user ratings. The HTTP layer talks to this
//! crate only through [`services::MovieService`] and
//! [`services::RatingService`].

pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

pub use error::{CatalogError, CatalogResult};
