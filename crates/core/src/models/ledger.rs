use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Maximum number of entries kept in the recent-transactions feed.
pub const RECENT_FEED_LIMIT: usize = 5;

/// Running balance plus the most recent transactions, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    pub balance: Decimal,
    pub recent_feed: Vec<Transaction>,
}

impl LedgerView {
    pub fn new(balance: Decimal, recent_feed: Vec<Transaction>) -> Self {
        Self {
            balance,
            recent_feed,
        }
    }

    /// Zero balance and an empty feed: the fallback after a failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Most recent transaction, if any.
    pub fn latest(&self) -> Option<&Transaction> {
        self.recent_feed.first()
    }
}
