//! Unit-of-work helper: commit on `Ok`, roll back on any `Err`.

use crate::errors::ServiceError;
use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionError, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};
use uuid::Uuid;

/// Type alias for boxed future used in transactions
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Execute `f` inside one database transaction.
///
/// Errors raised by `f` are returned unchanged after the rollback, so a
/// `NotFound` or `InsufficientStock` raised mid-workflow reaches the caller
/// as itself rather than as a generic database failure.
///
/// ```rust,ignore
/// run_in_transaction(&db, "transactions.create", |txn| {
///     Box::pin(async move {
///         let header = header.insert(txn).await?;
///         Ok(header)
///     })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<F, T>(
    db: &DatabaseConnection,
    operation: &'static str,
    f: F,
) -> Result<T, ServiceError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, ServiceError>> + Send,
    T: Send,
{
    let transaction_id = Uuid::new_v4();
    let start = std::time::Instant::now();

    debug!(%transaction_id, operation, "Starting database transaction");
    counter!("pantry_db.transaction.started", 1, "operation" => operation);

    let result = db.transaction::<_, T, ServiceError>(f).await;

    let elapsed = start.elapsed();
    histogram!("pantry_db.transaction.duration", elapsed, "operation" => operation);

    match &result {
        Ok(_) => {
            counter!("pantry_db.transaction.committed", 1, "operation" => operation);
            debug!(%transaction_id, operation, "Transaction committed in {:?}", elapsed);
        }
        Err(e) => {
            counter!("pantry_db.transaction.rolled_back", 1, "operation" => operation);
            warn!(%transaction_id, operation, error = %e, "Transaction rolled back after {:?}", elapsed);
        }
    }

    result.map_err(|e| match e {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(err) => err,
    })
}
