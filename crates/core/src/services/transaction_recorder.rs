use tracing::{info, warn};

use crate::datastore::traits::LedgerQuery;
use crate::errors::CoreError;
use crate::models::transaction::{NewTransaction, Transaction};

/// Persists new transactions.
///
/// Exactly one write attempt per call; no automatic retry. Re-invoking with
/// the same arguments after a failure is the caller's decision, and so is
/// idempotency in that case.
pub struct TransactionRecorder;

impl TransactionRecorder {
    pub fn new() -> Self {
        Self
    }

    /// Validate and insert `new`.
    ///
    /// Invalid input fails with `CoreError::ValidationError` before anything
    /// is written. A datastore failure maps to `CoreError::RecordTransaction`.
    pub async fn record(
        &self,
        ledger: &dyn LedgerQuery,
        new: &NewTransaction,
    ) -> Result<Transaction, CoreError> {
        new.validate()?;

        let tx = ledger.insert_transaction(new).await.map_err(|e| {
            warn!(
                backend = ledger.name(),
                user = %new.user_id,
                error = %e,
                "insert failed"
            );
            CoreError::RecordTransaction(e.to_string())
        })?;

        info!(
            user = %tx.user_id,
            id = %tx.id,
            kind = %tx.transaction_type,
            amount = %tx.amount,
            "transaction recorded"
        );
        Ok(tx)
    }
}

impl Default for TransactionRecorder {
    fn default() -> Self {
        Self::new()
    }
}
