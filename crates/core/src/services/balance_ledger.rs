use tracing::{debug, warn};

use crate::datastore::traits::{LedgerQuery, TransactionQuery};
use crate::errors::CoreError;
use crate::models::ledger::{LedgerView, RECENT_FEED_LIMIT};
use crate::models::transaction::{Transaction, UserId};

/// Owns the running balance and the recent-transactions feed.
///
/// `load` reads the authoritative state; `apply_optimistic` patches a local
/// copy after a successful insert. The patched value is advisory: the next
/// `load` replaces it without any reconciliation (last load wins).
pub struct BalanceLedger {
    feed_limit: usize,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::with_feed_limit(RECENT_FEED_LIMIT)
    }

    pub fn with_feed_limit(feed_limit: usize) -> Self {
        Self {
            feed_limit: feed_limit.max(1),
        }
    }

    pub fn feed_limit(&self) -> usize {
        self.feed_limit
    }

    /// Fetch the profile balance and the newest `feed_limit` transactions.
    pub async fn load(
        &self,
        ledger: &dyn LedgerQuery,
        user_id: &UserId,
    ) -> Result<LedgerView, CoreError> {
        let feed_query = TransactionQuery::for_user(user_id.clone()).newest_first(self.feed_limit);

        let (balance, feed) = tokio::join!(
            ledger.fetch_profile_balance(user_id),
            ledger.fetch_transactions(&feed_query),
        );

        let failed = |what: &str, e: CoreError| {
            warn!(backend = ledger.name(), user = %user_id, error = %e, "{what} fetch failed");
            CoreError::LedgerLoad(format!("{what}: {e}"))
        };
        let balance = balance.map_err(|e| failed("balance", e))?;
        let mut recent_feed = feed.map_err(|e| failed("recent transactions", e))?;
        recent_feed.truncate(self.feed_limit);

        debug!(user = %user_id, %balance, entries = recent_feed.len(), "ledger loaded");
        Ok(LedgerView::new(balance, recent_feed))
    }

    /// Pure state transition for a freshly inserted transaction: adjust the
    /// balance by the signed amount and push the transaction to the front of
    /// the feed, keeping at most `feed_limit` entries.
    pub fn apply_optimistic(&self, view: LedgerView, tx: Transaction) -> LedgerView {
        let balance = view.balance + tx.signed_amount();

        let mut recent_feed = Vec::with_capacity(self.feed_limit);
        recent_feed.push(tx);
        recent_feed.extend(view.recent_feed);
        recent_feed.truncate(self.feed_limit);

        LedgerView {
            balance,
            recent_feed,
        }
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}
