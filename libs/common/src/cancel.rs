//! Cooperative cancellation for database operations

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{DatabaseError, DatabaseResult};

/// Run `operation` until it completes or `token` is cancelled.
///
/// On cancellation the operation future is dropped in place. Any
/// `sqlx::Transaction` it holds rolls back on drop and its pooled connection
/// goes back to the pool, so a cancelled write never commits partially.
pub async fn cancellable<F, T>(token: &CancellationToken, operation: F) -> DatabaseResult<T>
where
    F: Future<Output = DatabaseResult<T>>,
{
    if token.is_cancelled() {
        return Err(DatabaseError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            warn!("Database operation cancelled");
            Err(DatabaseError::Cancelled)
        }
        result = operation => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let result = cancellable(&token, async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_skips_operation() {
        let token = CancellationToken::new();
        token.cancel();

        let mut ran = false;
        let result = cancellable(&token, async {
            ran = true;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(DatabaseError::Cancelled)));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_pending_operation() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result: DatabaseResult<()> = cancellable(&token, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(DatabaseError::Cancelled)));
    }

    #[tokio::test]
    async fn test_operation_errors_pass_through() {
        let token = CancellationToken::new();
        let result: DatabaseResult<()> = cancellable(&token, async {
            Err(DatabaseError::NoRowsAffected("insert movie".to_string()))
        })
        .await;

        assert!(matches!(result, Err(DatabaseError::NoRowsAffected(_))));
    }
}
