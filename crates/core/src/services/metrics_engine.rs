use chrono::{DateTime, TimeZone};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::datastore::traits::{LedgerQuery, TransactionQuery};
use crate::errors::CoreError;
use crate::models::metrics::MetricsSnapshot;
use crate::models::range::{RangeSelector, ResolvedRange};
use crate::models::transaction::{Transaction, TransactionType, UserId};
use crate::services::range_resolver::RangeResolver;

/// Computes income/expense totals and the daily expense average for the
/// selected reporting range.
///
/// Each call issues exactly two reads (income and expense inside the window)
/// and is otherwise pure: same inputs and an unchanged ledger give the same
/// snapshot.
pub struct MetricsEngine;

impl MetricsEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `selector` at `now` and compute the snapshot for that window.
    ///
    /// If either fetch fails the whole computation fails with
    /// `CoreError::MetricsUnavailable`; no half snapshot is ever returned.
    pub async fn compute_metrics<Tz: TimeZone>(
        &self,
        ledger: &dyn LedgerQuery,
        user_id: &UserId,
        selector: RangeSelector,
        now: &DateTime<Tz>,
    ) -> Result<MetricsSnapshot, CoreError> {
        let range = RangeResolver::resolve(selector, now);
        self.compute_for_range(ledger, user_id, selector, range).await
    }

    /// Compute the snapshot for an already-resolved window.
    pub async fn compute_for_range(
        &self,
        ledger: &dyn LedgerQuery,
        user_id: &UserId,
        selector: RangeSelector,
        range: ResolvedRange,
    ) -> Result<MetricsSnapshot, CoreError> {
        debug!(
            user = %user_id,
            %selector,
            start = %range.start,
            end = %range.end,
            day_count = range.day_count,
            "computing metrics"
        );

        let income_query = TransactionQuery::for_user(user_id.clone())
            .of_type(TransactionType::Income)
            .within(&range);
        let expense_query = TransactionQuery::for_user(user_id.clone())
            .of_type(TransactionType::Expense)
            .within(&range);

        let (income, expense) = tokio::join!(
            ledger.fetch_transactions(&income_query),
            ledger.fetch_transactions(&expense_query),
        );

        let unavailable = |kind: &str, e: CoreError| {
            warn!(backend = ledger.name(), error = %e, "{kind} fetch failed");
            CoreError::MetricsUnavailable(format!("{kind} fetch failed: {e}"))
        };
        let income = income.map_err(|e| unavailable("income", e))?;
        let expense = expense.map_err(|e| unavailable("expense", e))?;

        let income_total = sum_amounts(&income);
        let expense_total = sum_amounts(&expense);

        Ok(MetricsSnapshot {
            selector,
            income_total,
            expense_total,
            daily_average_expense: daily_average(expense_total, range.day_count),
        })
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of the (unsigned) amounts, zero for an empty slice.
pub fn sum_amounts(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}

/// `total / day_count` rounded to a whole unit, halves away from zero.
/// A zero day count is treated as one day.
pub fn daily_average(total: Decimal, day_count: u32) -> Decimal {
    let days = Decimal::from(day_count.max(1));
    (total / days).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
