use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Category labels offered by the transaction form.
/// Free-form labels are accepted as well; these are only the presets.
pub const PRESET_CATEGORIES: [&str; 10] = [
    "Transporte",
    "Entretenimiento",
    "Compras",
    "Servicios",
    "Salud",
    "Educación",
    "Otros",
    "Comida",
    "Diversión",
    "Ingreso",
];

/// Returns `true` if `label` is one of [`PRESET_CATEGORIES`] (exact match).
pub fn is_preset_category(label: &str) -> bool {
    PRESET_CATEGORIES.contains(&label)
}

/// Opaque identifier of a signed-in user, as handed out by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque, datastore-assigned transaction identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in (adds to the balance)
    Income,
    /// Money going out (subtracts from the balance)
    Expense,
}

impl TransactionType {
    /// Wire name used by the datastore (`income` / `expense`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Apply the sign of this type to a non-negative amount.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(CoreError::ValidationError(format!(
                "Unknown transaction type '{other}': expected 'income' or 'expense'"
            ))),
        }
    }
}

/// A persisted ledger entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Datastore-assigned identifier
    pub id: TransactionId,

    /// Owner of the transaction
    pub user_id: UserId,

    /// Always non-negative; direction comes from `transaction_type`
    pub amount: Decimal,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Preset or free-form label, may be empty
    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Assigned by the datastore at insertion time
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign of the transaction type applied.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }
}

/// A transaction as submitted by the user, before the datastore assigns
/// an id and a creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: Option<String>,
}

impl NewTransaction {
    /// Build a new transaction. An empty description is stored as `None`.
    pub fn new(
        user_id: UserId,
        amount: Decimal,
        transaction_type: TransactionType,
        category: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Self {
            user_id,
            amount,
            transaction_type,
            category: category.into().trim().to_string(),
            description,
        }
    }

    /// Check the write preconditions: the amount must be strictly positive.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::ValidationError(format!(
                "Amount must be greater than zero, got {}",
                self.amount
            )));
        }
        Ok(())
    }
}
