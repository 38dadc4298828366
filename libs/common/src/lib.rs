//! Common library for the movies application
//!
//! This crate provides the persistence plumbing shared by the catalog core
//! and the API service: database configuration and pooling, schema creation,
//! the shared error type and cooperative cancellation.

pub mod cancel;
pub mod database;
pub mod error;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{
///     ConnectionFactory, DatabaseConfig, health_check, init_pool, initialize_schema,
/// };
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     initialize_schema(&pool).await?;
///     let is_healthy = health_check(&pool).await?;
///     println!("Database health check: {}", is_healthy);
///
///     let factory = ConnectionFactory::new(pool);
///     let _conn = factory.connect().await?;
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
