//! Custom error types for the common library
//!
//! This module defines the persistence error type shared by every store in
//! the movies application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred while creating the schema
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// A store precondition was violated before any statement ran
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A write statement affected no rows when one was expected
    #[error("No rows affected: {0}")]
    NoRowsAffected(String),

    /// The operation was abandoned through its cancellation token
    #[error("Operation cancelled")]
    Cancelled,
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
