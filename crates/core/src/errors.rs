use thiserror::Error;

/// Unified error type for the entire finance-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Component failures (surfaced to the caller) ─────────────────
    #[error("Invalid range selector: {0}")]
    InvalidRange(String),

    #[error("Metrics unavailable: {0}")]
    MetricsUnavailable(String),

    #[error("Trailing window unavailable: {0}")]
    FixedWindowUnavailable(String),

    #[error("Failed to load ledger: {0}")]
    LedgerLoad(String),

    #[error("Failed to record transaction: {0}")]
    RecordTransaction(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("No user is signed in")]
    NotSignedIn,

    // ── Datastore / Network ─────────────────────────────────────────
    #[error("Datastore error ({backend}): {message}")]
    Datastore {
        backend: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<rust_decimal::Error> for CoreError {
    fn from(e: rust_decimal::Error) -> Self {
        CoreError::ValidationError(format!("invalid decimal amount: {e}"))
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters: PostgREST URLs carry user ids and filters,
        // and misconfigured deployments put the api key there too.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
