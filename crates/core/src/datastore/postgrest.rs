use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::settings::DatastoreSettings;
use crate::models::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionType, UserId,
};

use super::traits::{CreatedOrder, LedgerQuery, TransactionQuery};

const BACKEND: &str = "postgrest";
const TRANSACTIONS_TABLE: &str = "transactions";
const PROFILES_TABLE: &str = "profiles";

/// Ledger backend talking to a PostgREST endpoint (e.g. a Supabase project).
///
/// - `transactions` table: `id`, `user_id`, `amount`, `type`, `category`,
///   `description`, `created_at`.
/// - `profiles` table: `id`, `name`, `balance_total`. The balance is kept up
///   to date server-side; this client never writes it.
pub struct PostgrestLedger {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl PostgrestLedger {
    pub fn new(settings: &DatastoreSettings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            access_token: None,
        }
    }

    /// Authenticate requests as a signed-in user instead of with the API key,
    /// so row-level security applies.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn checked(response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CoreError::Datastore {
            backend: BACKEND.into(),
            message: format!("HTTP {status}: {body}"),
        })
    }

    async fn fetch_profile(&self, user_id: &UserId, columns: &str) -> Result<ProfileRow, CoreError> {
        let params = vec![
            ("select".to_string(), columns.to_string()),
            ("id".to_string(), format!("eq.{user_id}")),
        ];
        let response = self
            .authorized(self.client.get(self.table_url(PROFILES_TABLE)))
            .query(&params)
            .send()
            .await?;
        let rows: Vec<ProfileRow> = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Datastore {
                backend: BACKEND.into(),
                message: format!("Failed to parse profile for {user_id}: {e}"),
            })?;
        rows.into_iter().next().ok_or_else(|| CoreError::Datastore {
            backend: BACKEND.into(),
            message: format!("no profile for user {user_id}"),
        })
    }
}

/// PostgREST filter parameters for a transaction query, in request order.
pub fn transaction_query_params(query: &TransactionQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("user_id".to_string(), format!("eq.{}", query.user_id)),
    ];
    if let Some(t) = query.transaction_type {
        params.push(("type".to_string(), format!("eq.{t}")));
    }
    if let Some(start) = query.start {
        params.push(("created_at".to_string(), format!("gte.{}", iso(start))));
    }
    if let Some(end) = query.end {
        params.push(("created_at".to_string(), format!("lte.{}", iso(end))));
    }
    match query.order {
        Some(CreatedOrder::Descending) => {
            params.push(("order".to_string(), "created_at.desc".to_string()))
        }
        Some(CreatedOrder::Ascending) => {
            params.push(("order".to_string(), "created_at.asc".to_string()))
        }
        None => {}
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── PostgREST row types ─────────────────────────────────────────────

#[derive(Deserialize)]
struct TransactionRow {
    /// Integer or UUID depending on the schema
    id: serde_json::Value,
    user_id: String,
    amount: Decimal,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Transaction {
            id: TransactionId::new(id),
            user_id: UserId::new(row.user_id),
            amount: row.amount,
            transaction_type: row.transaction_type,
            category: row.category.unwrap_or_default(),
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Deserialize)]
struct ProfileRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    balance_total: Option<Decimal>,
}

#[derive(Serialize)]
struct InsertRow<'a> {
    user_id: &'a str,
    amount: Decimal,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: &'a str,
    description: Option<&'a str>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LedgerQuery for PostgrestLedger {
    fn name(&self) -> &str {
        "PostgREST"
    }

    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, CoreError> {
        let params = transaction_query_params(query);
        debug!(user = %query.user_id, ?params, "fetching transactions");

        let response = self
            .authorized(self.client.get(self.table_url(TRANSACTIONS_TABLE)))
            .query(&params)
            .send()
            .await?;
        let rows: Vec<TransactionRow> = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Datastore {
                backend: BACKEND.into(),
                message: format!("Failed to parse transactions for {}: {e}", query.user_id),
            })?;

        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn fetch_profile_balance(&self, user_id: &UserId) -> Result<Decimal, CoreError> {
        let profile = self.fetch_profile(user_id, "balance_total").await?;
        Ok(profile.balance_total.unwrap_or(Decimal::ZERO))
    }

    async fn fetch_profile_name(&self, user_id: &UserId) -> Result<Option<String>, CoreError> {
        let profile = self.fetch_profile(user_id, "name").await?;
        Ok(profile.name.filter(|n| !n.trim().is_empty()))
    }

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, CoreError> {
        // created_at is left to the column default so the server clock stamps the row
        let row = InsertRow {
            user_id: new.user_id.as_str(),
            amount: new.amount,
            transaction_type: new.transaction_type,
            category: &new.category,
            description: new.description.as_deref(),
        };

        let response = self
            .authorized(self.client.post(self.table_url(TRANSACTIONS_TABLE)))
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let rows: Vec<TransactionRow> = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Datastore {
                backend: BACKEND.into(),
                message: format!("Failed to parse inserted transaction: {e}"),
            })?;

        rows.into_iter()
            .next()
            .map(Transaction::from)
            .ok_or_else(|| CoreError::Datastore {
                backend: BACKEND.into(),
                message: "insert returned no rows".into(),
            })
    }
}
