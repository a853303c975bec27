use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::{NewTransaction, Transaction, TransactionId, UserId};

use super::traits::{CreatedOrder, LedgerQuery, TransactionQuery};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Default)]
struct Profile {
    name: Option<String>,
    balance: Decimal,
}

#[derive(Debug, Default)]
struct Store {
    /// Insertion order; the newest entry is last.
    transactions: Vec<Transaction>,
    profiles: HashMap<UserId, Profile>,
}

/// In-process ledger backend.
///
/// Behaves like the remote datastore: ids are random UUIDs, the creation
/// timestamp is taken from the clock at insertion, and the profile balance
/// moves with every insert so it always equals income minus expenses.
pub struct MemoryLedger {
    store: Mutex<Store>,
    clock: Clock,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Use `clock` for the creation timestamp of inserted transactions.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    /// Create (or rename) a profile. The balance is left untouched.
    pub fn create_profile(&self, user_id: &UserId, name: Option<&str>) -> Result<(), CoreError> {
        let mut store = self.lock()?;
        let profile = store.profiles.entry(user_id.clone()).or_default();
        profile.name = name.map(str::to_string);
        Ok(())
    }

    /// Overwrite a profile balance directly, bypassing the ledger.
    /// Models an external writer (another session) touching the balance.
    pub fn set_profile_balance(&self, user_id: &UserId, balance: Decimal) -> Result<(), CoreError> {
        let mut store = self.lock()?;
        store.profiles.entry(user_id.clone()).or_default().balance = balance;
        Ok(())
    }

    /// Import an already-persisted transaction (e.g. history with past
    /// timestamps). The owner's balance is adjusted like for an insert.
    pub fn seed(&self, tx: Transaction) -> Result<(), CoreError> {
        let mut store = self.lock()?;
        store
            .profiles
            .entry(tx.user_id.clone())
            .or_default()
            .balance += tx.signed_amount();
        store.transactions.push(tx);
        Ok(())
    }

    /// Number of stored transactions across all users.
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.transactions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, CoreError> {
        self.store.lock().map_err(|_| CoreError::Datastore {
            backend: "memory".into(),
            message: "store lock poisoned".into(),
        })
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerQuery for MemoryLedger {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, CoreError> {
        let store = self.lock()?;
        // Newest insert first, so equal timestamps keep insertion recency after a stable sort.
        let mut matched: Vec<Transaction> = store
            .transactions
            .iter()
            .rev()
            .filter(|tx| query.matches(tx))
            .cloned()
            .collect();

        match query.order {
            Some(CreatedOrder::Descending) => {
                matched.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            Some(CreatedOrder::Ascending) => {
                matched.reverse();
                matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            }
            None => {}
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }

    async fn fetch_profile_balance(&self, user_id: &UserId) -> Result<Decimal, CoreError> {
        let store = self.lock()?;
        store
            .profiles
            .get(user_id)
            .map(|p| p.balance)
            .ok_or_else(|| CoreError::Datastore {
                backend: "memory".into(),
                message: format!("no profile for user {user_id}"),
            })
    }

    async fn fetch_profile_name(&self, user_id: &UserId) -> Result<Option<String>, CoreError> {
        let store = self.lock()?;
        Ok(store.profiles.get(user_id).and_then(|p| p.name.clone()))
    }

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, CoreError> {
        let tx = Transaction {
            id: TransactionId::new(Uuid::new_v4().to_string()),
            user_id: new.user_id.clone(),
            amount: new.amount,
            transaction_type: new.transaction_type,
            category: new.category.clone(),
            description: new.description.clone(),
            created_at: (self.clock)(),
        };

        let mut store = self.lock()?;
        store
            .profiles
            .entry(tx.user_id.clone())
            .or_default()
            .balance += tx.signed_amount();
        store.transactions.push(tx.clone());
        Ok(tx)
    }
}
