use chrono::{DateTime, TimeZone};
use tracing::{debug, warn};

use crate::datastore::traits::{LedgerQuery, TransactionQuery};
use crate::errors::CoreError;
use crate::models::metrics::FixedWindowSnapshot;
use crate::models::settings::TRAILING_WINDOW_DAYS;
use crate::models::transaction::{TransactionType, UserId};
use crate::services::metrics_engine::sum_amounts;
use crate::services::range_resolver::RangeResolver;

/// Tracks total expenses over `[now - 30 days, now]`, regardless of the
/// range the user is looking at.
pub struct FixedWindowTracker {
    window_days: u32,
}

impl FixedWindowTracker {
    pub fn new() -> Self {
        Self::with_window(TRAILING_WINDOW_DAYS)
    }

    pub fn with_window(window_days: u32) -> Self {
        Self {
            window_days: window_days.max(1),
        }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// One expense fetch over the trailing window, summed.
    pub async fn compute_trailing<Tz: TimeZone>(
        &self,
        ledger: &dyn LedgerQuery,
        user_id: &UserId,
        now: &DateTime<Tz>,
    ) -> Result<FixedWindowSnapshot, CoreError> {
        let range = RangeResolver::trailing(now, i64::from(self.window_days));
        debug!(user = %user_id, start = %range.start, end = %range.end, "computing trailing expenses");

        let query = TransactionQuery::for_user(user_id.clone())
            .of_type(TransactionType::Expense)
            .within(&range);

        let expenses = ledger.fetch_transactions(&query).await.map_err(|e| {
            warn!(backend = ledger.name(), error = %e, "trailing window fetch failed");
            CoreError::FixedWindowUnavailable(e.to_string())
        })?;

        Ok(FixedWindowSnapshot {
            trailing_expense_total: sum_amounts(&expenses),
            window_days: self.window_days,
        })
    }
}

impl Default for FixedWindowTracker {
    fn default() -> Self {
        Self::new()
    }
}
