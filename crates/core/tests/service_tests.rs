// ═══════════════════════════════════════════════════════════════════
// Service Tests — RangeResolver, MetricsEngine, FixedWindowTracker,
// BalanceLedger, TransactionRecorder
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};

use finance_tracker_core::datastore::memory::MemoryLedger;
use finance_tracker_core::datastore::traits::{LedgerQuery, TransactionQuery};
use finance_tracker_core::errors::CoreError;
use finance_tracker_core::models::ledger::LedgerView;
use finance_tracker_core::models::range::RangeSelector;
use finance_tracker_core::models::transaction::{
    NewTransaction, Transaction, TransactionId, TransactionType, UserId,
};
use finance_tracker_core::services::balance_ledger::BalanceLedger;
use finance_tracker_core::services::fixed_window_tracker::FixedWindowTracker;
use finance_tracker_core::services::metrics_engine::{daily_average, sum_amounts, MetricsEngine};
use finance_tracker_core::services::range_resolver::RangeResolver;
use finance_tracker_core::services::transaction_recorder::TransactionRecorder;

// ═══════════════════════════════════════════════════════════════════
// Mock Ledger
// ═══════════════════════════════════════════════════════════════════

type FetchPredicate = Box<dyn Fn(&TransactionQuery) -> bool + Send + Sync>;

/// Wraps a `MemoryLedger` and fails selected operations.
struct ScriptedLedger {
    inner: MemoryLedger,
    fail_fetch: FetchPredicate,
    fail_balance: bool,
    fail_insert: bool,
    fetches: AtomicUsize,
    inserts: AtomicUsize,
}

impl ScriptedLedger {
    fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            fail_fetch: Box::new(|_| false),
            fail_balance: false,
            fail_insert: false,
            fetches: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    fn failing_fetch(mut self, pred: impl Fn(&TransactionQuery) -> bool + Send + Sync + 'static) -> Self {
        self.fail_fetch = Box::new(pred);
        self
    }

    fn failing_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }
}

fn simulated(what: &str) -> CoreError {
    CoreError::Datastore {
        backend: "scripted".into(),
        message: format!("simulated {what} failure"),
    }
}

#[async_trait]
impl LedgerQuery for ScriptedLedger {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if (self.fail_fetch)(query) {
            return Err(simulated("fetch"));
        }
        self.inner.fetch_transactions(query).await
    }

    async fn fetch_profile_balance(&self, user_id: &UserId) -> Result<Decimal, CoreError> {
        if self.fail_balance {
            return Err(simulated("balance"));
        }
        self.inner.fetch_profile_balance(user_id).await
    }

    async fn fetch_profile_name(&self, user_id: &UserId) -> Result<Option<String>, CoreError> {
        self.inner.fetch_profile_name(user_id).await
    }

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, CoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(simulated("insert"));
        }
        self.inner.insert_transaction(new).await
    }
}

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// 2025-01-15 12:00:00 at UTC+0.
fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
        .unwrap()
}

fn dec(v: i64) -> Decimal {
    Decimal::from(v)
}

fn user() -> UserId {
    UserId::new("user-1")
}

fn tx_for(user_id: &UserId, amount: i64, kind: TransactionType, at: DateTime<Utc>) -> Transaction {
    Transaction {
        id: TransactionId::new(uuid::Uuid::new_v4().to_string()),
        user_id: user_id.clone(),
        amount: dec(amount),
        transaction_type: kind,
        category: "Otros".into(),
        description: None,
        created_at: at,
    }
}

fn tx(amount: i64, kind: TransactionType, at: DateTime<Utc>) -> Transaction {
    tx_for(&user(), amount, kind, at)
}

fn seeded(txs: Vec<Transaction>) -> MemoryLedger {
    let ledger = MemoryLedger::new();
    ledger.create_profile(&user(), Some("Ana")).unwrap();
    for t in txs {
        ledger.seed(t).unwrap();
    }
    ledger
}

// ═══════════════════════════════════════════════════════════════════
// RangeResolver
// ═══════════════════════════════════════════════════════════════════

mod range_resolver {
    use super::*;

    #[test]
    fn today_covers_local_calendar_day() {
        let r = RangeResolver::resolve(RangeSelector::Today, &now());
        assert_eq!(r.start, utc(2025, 1, 15, 0, 0, 0));
        assert_eq!(
            r.end,
            utc(2025, 1, 15, 23, 59, 59) + TimeDelta::milliseconds(999)
        );
        assert_eq!(r.day_count, 1);
    }

    #[test]
    fn yesterday_is_previous_calendar_day() {
        let r = RangeResolver::resolve(RangeSelector::Yesterday, &now());
        assert_eq!(r.start, utc(2025, 1, 14, 0, 0, 0));
        assert_eq!(
            r.end,
            utc(2025, 1, 14, 23, 59, 59) + TimeDelta::milliseconds(999)
        );
        assert_eq!(r.day_count, 1);
    }

    #[test]
    fn yesterday_crosses_month_boundary() {
        let first = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let r = RangeResolver::resolve(RangeSelector::Yesterday, &first);
        assert_eq!(r.start, utc(2025, 2, 28, 0, 0, 0));
    }

    #[test]
    fn today_uses_offset_of_now() {
        // 01:00 in UTC-6 is still Jan 15 locally, 07:00 UTC
        let mexico = FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, 15, 1, 0, 0)
            .unwrap();
        let r = RangeResolver::resolve(RangeSelector::Today, &mexico);
        assert_eq!(r.start, utc(2025, 1, 15, 6, 0, 0));
        assert_eq!(
            r.end,
            utc(2025, 1, 16, 5, 59, 59) + TimeDelta::milliseconds(999)
        );
    }

    #[test]
    fn trailing_selectors_use_instant_arithmetic() {
        let n = now().with_timezone(&Utc);
        for (selector, days) in [
            (RangeSelector::Last7d, 7),
            (RangeSelector::Last14d, 14),
            (RangeSelector::Last30d, 30),
        ] {
            let r = RangeResolver::resolve(selector, &now());
            assert_eq!(r.end, n);
            assert_eq!(r.start, n - TimeDelta::days(days));
            assert_eq!(r.day_count, days as u32 + 1, "{selector}");
        }
    }

    #[test]
    fn every_selector_is_well_formed() {
        let instants = [
            now(),
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 2, 29, 0, 0, 0)
                .unwrap(),
            FixedOffset::west_opt(6 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 12, 31, 23, 59, 59)
                .unwrap(),
            FixedOffset::east_opt(14 * 3600)
                .unwrap()
                .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .unwrap(),
        ];
        for n in &instants {
            for selector in RangeSelector::ALL {
                let r = RangeResolver::resolve(selector, n);
                assert!(r.end >= r.start, "{selector} at {n}");
                assert!(r.day_count >= 1, "{selector} at {n}");
            }
        }
    }

    #[test]
    fn day_count_rounds_span() {
        let start = utc(2025, 1, 1, 0, 0, 0);
        assert_eq!(RangeResolver::day_count(start, start), 1);
        assert_eq!(RangeResolver::day_count(start, start + TimeDelta::hours(11)), 1);
        assert_eq!(RangeResolver::day_count(start, start + TimeDelta::hours(12)), 2);
        assert_eq!(RangeResolver::day_count(start, start + TimeDelta::days(7)), 8);
    }

    #[test]
    fn resolve_str_accepts_short_forms() {
        let r = RangeResolver::resolve_str("7d", &now()).unwrap();
        assert_eq!(r, RangeResolver::resolve(RangeSelector::Last7d, &now()));
    }

    #[test]
    fn resolve_str_rejects_unknown() {
        let err = RangeResolver::resolve_str("fortnight", &now()).unwrap_err();
        assert_eq!(err, CoreError::InvalidRange("fortnight".into()));
    }

    #[test]
    fn unknown_selector_falls_back_to_last30d() {
        assert_eq!(
            RangeResolver::selector_or_default("fortnight"),
            RangeSelector::Last30d
        );
        assert_eq!(
            RangeResolver::selector_or_default("yesterday"),
            RangeSelector::Yesterday
        );
    }
}

// ═══════════════════════════════════════════════════════════════════
// MetricsEngine
// ═══════════════════════════════════════════════════════════════════

mod metrics_engine {
    use super::*;

    #[tokio::test]
    async fn empty_ledger_gives_zero_snapshot() {
        let ledger = seeded(vec![]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Last30d, &now())
            .await
            .unwrap();
        assert!(snapshot.is_zero());
        assert_eq!(snapshot.selector, RangeSelector::Last30d);
    }

    #[tokio::test]
    async fn today_average_equals_total() {
        let ledger = seeded(vec![
            tx(300, TransactionType::Expense, utc(2025, 1, 15, 9, 0, 0)),
            tx(999, TransactionType::Expense, utc(2025, 1, 14, 23, 0, 0)),
        ]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Today, &now())
            .await
            .unwrap();
        assert_eq!(snapshot.expense_total, dec(300));
        assert_eq!(snapshot.daily_average_expense, dec(300));
    }

    #[tokio::test]
    async fn today_includes_later_same_day() {
        // Window ends at 23:59:59.999 even though "now" is noon
        let ledger = seeded(vec![tx(40, TransactionType::Income, utc(2025, 1, 15, 20, 0, 0))]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Today, &now())
            .await
            .unwrap();
        assert_eq!(snapshot.income_total, dec(40));
    }

    #[tokio::test]
    async fn last7d_divides_by_day_count() {
        // 800 over 7 × 24h → day_count 8 → 100 per day
        let ledger = seeded(vec![
            tx(500, TransactionType::Expense, utc(2025, 1, 10, 8, 0, 0)),
            tx(300, TransactionType::Expense, utc(2025, 1, 14, 8, 0, 0)),
            tx(1000, TransactionType::Income, utc(2025, 1, 12, 8, 0, 0)),
        ]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Last7d, &now())
            .await
            .unwrap();
        assert_eq!(snapshot.income_total, dec(1000));
        assert_eq!(snapshot.expense_total, dec(800));
        assert_eq!(snapshot.daily_average_expense, dec(100));
    }

    #[tokio::test]
    async fn bounds_are_inclusive() {
        let n = now().with_timezone(&Utc);
        let start = n - TimeDelta::days(7);
        let ledger = seeded(vec![
            tx(10, TransactionType::Expense, start),
            tx(20, TransactionType::Expense, n),
            tx(40, TransactionType::Expense, start - TimeDelta::milliseconds(1)),
        ]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Last7d, &now())
            .await
            .unwrap();
        assert_eq!(snapshot.expense_total, dec(30));
    }

    #[tokio::test]
    async fn other_users_are_ignored() {
        let other = UserId::new("user-2");
        let ledger = seeded(vec![
            tx(50, TransactionType::Expense, utc(2025, 1, 15, 8, 0, 0)),
            tx_for(&other, 70, TransactionType::Expense, utc(2025, 1, 15, 8, 0, 0)),
        ]);
        let snapshot = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Today, &now())
            .await
            .unwrap();
        assert_eq!(snapshot.expense_total, dec(50));
    }

    #[tokio::test]
    async fn repeated_computation_is_identical() {
        let ledger = seeded(vec![
            tx(123, TransactionType::Expense, utc(2025, 1, 2, 8, 0, 0)),
            tx(77, TransactionType::Income, utc(2025, 1, 3, 8, 0, 0)),
        ]);
        let engine = MetricsEngine::new();
        let a = engine
            .compute_metrics(&ledger, &user(), RangeSelector::Last30d, &now())
            .await
            .unwrap();
        let b = engine
            .compute_metrics(&ledger, &user(), RangeSelector::Last30d, &now())
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn issues_exactly_two_fetches() {
        let ledger = ScriptedLedger::new(seeded(vec![]));
        MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Last14d, &now())
            .await
            .unwrap();
        assert_eq!(ledger.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn income_failure_fails_whole_snapshot() {
        let ledger = ScriptedLedger::new(seeded(vec![tx(
            10,
            TransactionType::Expense,
            utc(2025, 1, 15, 8, 0, 0),
        )]))
        .failing_fetch(|q| q.transaction_type == Some(TransactionType::Income));
        let err = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Today, &now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MetricsUnavailable(_)));
    }

    #[tokio::test]
    async fn expense_failure_fails_whole_snapshot() {
        let ledger = ScriptedLedger::new(seeded(vec![]))
            .failing_fetch(|q| q.transaction_type == Some(TransactionType::Expense));
        let err = MetricsEngine::new()
            .compute_metrics(&ledger, &user(), RangeSelector::Today, &now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MetricsUnavailable(ref m) if m.contains("expense")));
    }

    #[test]
    fn daily_average_rounding() {
        assert_eq!(daily_average(dec(300), 1), dec(300));
        assert_eq!(daily_average(dec(700), 7), dec(100));
        assert_eq!(daily_average(dec(10), 4), dec(3)); // 2.5 rounds up
        assert_eq!(daily_average(dec(10), 3), dec(3));
        assert_eq!(daily_average(Decimal::new(35, 1), 1), dec(4));
        assert_eq!(daily_average(dec(0), 31), dec(0));
    }

    #[test]
    fn daily_average_zero_days_is_guarded() {
        assert_eq!(daily_average(dec(42), 0), dec(42));
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(sum_amounts(&[]), Decimal::ZERO);
    }
}

// ═══════════════════════════════════════════════════════════════════
// FixedWindowTracker
// ═══════════════════════════════════════════════════════════════════

mod fixed_window_tracker {
    use super::*;

    #[tokio::test]
    async fn sums_expenses_of_last_30_days_only() {
        let ledger = seeded(vec![
            tx(100, TransactionType::Expense, utc(2025, 1, 14, 8, 0, 0)),
            tx(250, TransactionType::Expense, utc(2024, 12, 20, 8, 0, 0)),
            tx(900, TransactionType::Expense, utc(2024, 12, 10, 8, 0, 0)),
            tx(5000, TransactionType::Income, utc(2025, 1, 14, 8, 0, 0)),
        ]);
        let snapshot = FixedWindowTracker::new()
            .compute_trailing(&ledger, &user(), &now())
            .await
            .unwrap();
        assert_eq!(snapshot.trailing_expense_total, dec(350));
        assert_eq!(snapshot.window_days, 30);
    }

    #[tokio::test]
    async fn custom_window_length() {
        let ledger = seeded(vec![
            tx(100, TransactionType::Expense, utc(2025, 1, 14, 8, 0, 0)),
            tx(250, TransactionType::Expense, utc(2025, 1, 5, 8, 0, 0)),
        ]);
        let snapshot = FixedWindowTracker::with_window(7)
            .compute_trailing(&ledger, &user(), &now())
            .await
            .unwrap();
        assert_eq!(snapshot.trailing_expense_total, dec(100));
    }

    #[tokio::test]
    async fn single_fetch() {
        let ledger = ScriptedLedger::new(seeded(vec![]));
        FixedWindowTracker::new()
            .compute_trailing(&ledger, &user(), &now())
            .await
            .unwrap();
        assert_eq!(ledger.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_is_reported() {
        let ledger = ScriptedLedger::new(seeded(vec![])).failing_fetch(|_| true);
        let err = FixedWindowTracker::new()
            .compute_trailing(&ledger, &user(), &now())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FixedWindowUnavailable(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// BalanceLedger
// ═══════════════════════════════════════════════════════════════════

mod balance_ledger {
    use super::*;

    #[tokio::test]
    async fn load_returns_balance_and_newest_five() {
        let txs: Vec<Transaction> = (1..=7)
            .map(|d| tx(d * 10, TransactionType::Income, utc(2025, 1, d as u32, 8, 0, 0)))
            .collect();
        let ledger = seeded(txs);

        let view = BalanceLedger::new().load(&ledger, &user()).await.unwrap();
        assert_eq!(view.balance, dec(280)); // 10 + 20 + ... + 70
        assert_eq!(view.recent_feed.len(), 5);
        let amounts: Vec<Decimal> = view.recent_feed.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec(70), dec(60), dec(50), dec(40), dec(30)]);
    }

    #[tokio::test]
    async fn balance_failure_is_ledger_load_error() {
        let ledger = ScriptedLedger::new(seeded(vec![])).failing_balance();
        let err = BalanceLedger::new().load(&ledger, &user()).await.unwrap_err();
        assert!(matches!(err, CoreError::LedgerLoad(ref m) if m.starts_with("balance")));
    }

    #[tokio::test]
    async fn feed_failure_is_ledger_load_error() {
        let ledger = ScriptedLedger::new(seeded(vec![])).failing_fetch(|_| true);
        let err = BalanceLedger::new().load(&ledger, &user()).await.unwrap_err();
        assert!(matches!(err, CoreError::LedgerLoad(_)));
    }

    #[tokio::test]
    async fn unknown_profile_fails_to_load() {
        let ledger = MemoryLedger::new();
        let err = BalanceLedger::new()
            .load(&ledger, &UserId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::LedgerLoad(_)));
    }

    #[test]
    fn expense_subtracts_and_prepends() {
        let t = tx(50, TransactionType::Expense, utc(2025, 1, 15, 8, 0, 0));
        let view = BalanceLedger::new()
            .apply_optimistic(LedgerView::new(dec(100), vec![]), t.clone());
        assert_eq!(view.balance, dec(50));
        assert_eq!(view.recent_feed, vec![t]);
    }

    #[test]
    fn income_adds() {
        let t = tx(50, TransactionType::Income, utc(2025, 1, 15, 8, 0, 0));
        let view = BalanceLedger::new().apply_optimistic(LedgerView::new(dec(-20), vec![]), t);
        assert_eq!(view.balance, dec(30));
    }

    #[test]
    fn sixth_entry_truncates_feed() {
        let feed: Vec<Transaction> = (1..=5)
            .rev()
            .map(|d| tx(d, TransactionType::Expense, utc(2025, 1, d as u32, 8, 0, 0)))
            .collect();
        let newest = tx(6, TransactionType::Expense, utc(2025, 1, 6, 8, 0, 0));

        let view = BalanceLedger::new()
            .apply_optimistic(LedgerView::new(dec(0), feed.clone()), newest.clone());
        assert_eq!(view.recent_feed.len(), 5);
        assert_eq!(view.recent_feed[0], newest);
        assert_eq!(view.recent_feed[1..], feed[..4]);
    }

    #[test]
    fn custom_feed_limit() {
        let bl = BalanceLedger::with_feed_limit(2);
        let a = tx(1, TransactionType::Income, utc(2025, 1, 1, 8, 0, 0));
        let b = tx(2, TransactionType::Income, utc(2025, 1, 2, 8, 0, 0));
        let c = tx(3, TransactionType::Income, utc(2025, 1, 3, 8, 0, 0));
        let view = bl.apply_optimistic(LedgerView::empty(), a);
        let view = bl.apply_optimistic(view, b.clone());
        let view = bl.apply_optimistic(view, c.clone());
        assert_eq!(view.recent_feed, vec![c, b]);
        assert_eq!(view.balance, dec(6));
    }

    #[test]
    fn zero_feed_limit_is_clamped() {
        assert_eq!(BalanceLedger::with_feed_limit(0).feed_limit(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// TransactionRecorder
// ═══════════════════════════════════════════════════════════════════

mod transaction_recorder {
    use super::*;

    fn new_tx(amount: Decimal, kind: TransactionType) -> NewTransaction {
        NewTransaction::new(user(), amount, kind, "Comida", Some("tacos".into()))
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let stamp = utc(2025, 1, 15, 12, 30, 0);
        let memory = MemoryLedger::with_clock(std::sync::Arc::new(move || stamp));
        memory.create_profile(&user(), None).unwrap();
        memory.set_profile_balance(&user(), dec(1000)).unwrap();

        let recorded = TransactionRecorder::new()
            .record(&memory, &new_tx(dec(200), TransactionType::Expense))
            .await
            .unwrap();

        assert!(!recorded.id.as_str().is_empty());
        assert_eq!(recorded.created_at, stamp);
        assert_eq!(recorded.category, "Comida");
        assert_eq!(recorded.description.as_deref(), Some("tacos"));
        assert_eq!(memory.fetch_profile_balance(&user()).await.unwrap(), dec(800));
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_before_insert() {
        let ledger = ScriptedLedger::new(seeded(vec![]));
        for amount in [dec(0), dec(-5)] {
            let err = TransactionRecorder::new()
                .record(&ledger, &new_tx(amount, TransactionType::Income))
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)));
        }
        assert_eq!(ledger.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn insert_failure_is_record_error_with_single_attempt() {
        let ledger = ScriptedLedger::new(seeded(vec![])).failing_insert();
        let err = TransactionRecorder::new()
            .record(&ledger, &new_tx(dec(10), TransactionType::Expense))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RecordTransaction(_)));
        assert_eq!(ledger.inserts.load(Ordering::SeqCst), 1);
        assert!(ledger.inner.is_empty());
    }

    #[tokio::test]
    async fn retry_after_failure_is_a_new_insert() {
        let memory = seeded(vec![]);
        let recorder = TransactionRecorder::new();
        let new = new_tx(dec(10), TransactionType::Expense);
        let a = recorder.record(&memory, &new).await.unwrap();
        let b = recorder.record(&memory, &new).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(memory.len(), 2);
    }
}
