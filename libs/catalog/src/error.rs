//! Error type for catalog operations

use common::error::DatabaseError;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors surfaced by the catalog services
///
/// Absence (unknown movie, missing rating) is not an error: it is reported as
/// `None` or `false` by the operation itself.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input was rejected before any write happened
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Storage failure; any open transaction has been rolled back
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Type alias for Result with CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;
