use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::range::ResolvedRange;
use crate::models::transaction::{NewTransaction, Transaction, TransactionType, UserId};

/// Ordering of a transaction fetch by creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedOrder {
    Ascending,
    Descending,
}

/// Filter for [`LedgerQuery::fetch_transactions`].
///
/// Bounds are inclusive on both ends. Unset fields do not filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub user_id: UserId,
    pub transaction_type: Option<TransactionType>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub order: Option<CreatedOrder>,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    /// Every transaction of `user_id`, unordered and unbounded.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            transaction_type: None,
            start: None,
            end: None,
            order: None,
            limit: None,
        }
    }

    pub fn of_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = Some(transaction_type);
        self
    }

    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn within(self, range: &ResolvedRange) -> Self {
        self.between(range.start, range.end)
    }

    pub fn newest_first(mut self, limit: usize) -> Self {
        self.order = Some(CreatedOrder::Descending);
        self.limit = Some(limit);
        self
    }

    /// Whether `tx` passes every filter of this query (limit and order excluded).
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.user_id == self.user_id
            && self.transaction_type.map_or(true, |t| t == tx.transaction_type)
            && self.start.map_or(true, |s| tx.created_at >= s)
            && self.end.map_or(true, |e| tx.created_at <= e)
    }
}

/// Trait abstraction over the transaction datastore.
///
/// The aggregation services only talk to this trait. The datastore owns the
/// authoritative profile balance and assigns ids and creation timestamps.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LedgerQuery: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch transactions matching `query`.
    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, CoreError>;

    /// Fetch the authoritative running balance of a user's profile.
    async fn fetch_profile_balance(&self, user_id: &UserId) -> Result<Decimal, CoreError>;

    /// Fetch the display name stored on the profile, if any.
    async fn fetch_profile_name(&self, user_id: &UserId) -> Result<Option<String>, CoreError>;

    /// Insert a transaction. The datastore assigns id and creation timestamp.
    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, CoreError>;
}
