pub mod datastore;
pub mod errors;
pub mod logging;
pub mod models;
pub mod sequence;
pub mod services;
pub mod session;

use chrono::{DateTime, FixedOffset, Local};
use datastore::traits::LedgerQuery;
use models::{
    ledger::LedgerView,
    metrics::{FixedWindowSnapshot, MetricsSnapshot},
    panel::Panel,
    range::RangeSelector,
    settings::Settings,
    transaction::{NewTransaction, Transaction, TransactionType, UserId},
};
use rust_decimal::Decimal;
use sequence::RequestSequence;
use services::{
    balance_ledger::BalanceLedger, fixed_window_tracker::FixedWindowTracker,
    metrics_engine::MetricsEngine, transaction_recorder::TransactionRecorder,
};
use session::SessionHandle;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use errors::CoreError;

/// Source of "now" for range resolution. Calendar days follow its offset.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Everything a presentation layer needs to render the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    /// Currently selected reporting range
    pub range: RangeSelector,

    /// Balance and recent feed
    pub ledger: Panel<LedgerView>,

    /// Totals for `range`
    pub metrics: Panel<MetricsSnapshot>,

    /// Expenses over the fixed trailing window
    pub trailing: Panel<FixedWindowSnapshot>,

    /// Profile display name, once loaded
    pub display_name: Option<String>,

    /// An insert is in flight
    pub recording: bool,

    /// Error of the last failed insert, cleared by the next attempt
    pub record_error: Option<String>,
}

impl DashboardState {
    fn new(range: RangeSelector) -> Self {
        Self {
            range,
            ledger: Panel::Loading,
            metrics: Panel::Loading,
            trailing: Panel::Loading,
            display_name: None,
            recording: false,
            record_error: None,
        }
    }

    /// Balance to display: loaded, optimistic, or the zero fallback.
    pub fn balance(&self) -> Option<Decimal> {
        self.ledger.value().map(|v| v.balance)
    }
}

/// Per-user entry point of the core library.
///
/// Holds the aggregate state of one signed-in user and keeps it consistent
/// while fetches overlap. Each aggregate has its own request sequence: a
/// fetch only updates the state if no newer fetch of the same aggregate was
/// started after it, so the last *started* request wins.
#[must_use]
pub struct Dashboard {
    ledger: Arc<dyn LedgerQuery>,
    user_id: UserId,
    clock: Clock,
    balance_ledger: BalanceLedger,
    metrics_engine: MetricsEngine,
    fixed_window: FixedWindowTracker,
    recorder: TransactionRecorder,
    state: Mutex<DashboardState>,
    ledger_seq: RequestSequence,
    metrics_seq: RequestSequence,
    trailing_seq: RequestSequence,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("user_id", &self.user_id)
            .field("backend", &self.ledger.name())
            .field("state", &*self.lock_state())
            .finish()
    }
}

impl Dashboard {
    /// Create a dashboard for `user_id`. Nothing is fetched until
    /// [`Dashboard::open`] or one of the refresh methods is called.
    pub fn new(ledger: Arc<dyn LedgerQuery>, user_id: UserId, settings: &Settings) -> Self {
        Self {
            ledger,
            user_id,
            clock: Arc::new(|| Local::now().fixed_offset()),
            balance_ledger: BalanceLedger::with_feed_limit(settings.recent_feed_limit),
            metrics_engine: MetricsEngine::new(),
            fixed_window: FixedWindowTracker::with_window(settings.trailing_window_days),
            recorder: TransactionRecorder::new(),
            state: Mutex::new(DashboardState::new(settings.default_range)),
            ledger_seq: RequestSequence::new(),
            metrics_seq: RequestSequence::new(),
            trailing_seq: RequestSequence::new(),
        }
    }

    /// Create a dashboard for whoever is signed in on `session`.
    pub fn for_session(
        ledger: Arc<dyn LedgerQuery>,
        session: &SessionHandle,
        settings: &Settings,
    ) -> Result<Self, CoreError> {
        let user_id = session.current().ok_or(CoreError::NotSignedIn)?;
        Ok(Self::new(ledger, user_id, settings))
    }

    /// Replace the wall clock (tests, replays).
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn range(&self) -> RangeSelector {
        self.lock_state().range
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.lock_state().clone()
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Initial load: ledger, metrics, trailing window and profile name,
    /// all concurrently. Failures stay inside their own panel.
    pub async fn open(&self) {
        info!(user = %self.user_id, backend = self.ledger.name(), "opening dashboard");
        tokio::join!(self.refresh_all(), self.load_profile_name());
    }

    /// Refresh the three aggregates concurrently and independently.
    pub async fn refresh_all(&self) {
        let _ = tokio::join!(
            self.load_ledger(),
            self.refresh_metrics(),
            self.refresh_trailing(),
        );
    }

    /// Load the authoritative balance and recent feed.
    ///
    /// On failure the panel shows a zero balance and an empty feed together
    /// with the error. Any optimistic value is replaced either way.
    pub async fn load_ledger(&self) -> Result<LedgerView, CoreError> {
        let ticket = self.ledger_seq.issue();
        self.lock_state().ledger = Panel::Loading;

        let result = self
            .balance_ledger
            .load(self.ledger.as_ref(), &self.user_id)
            .await;

        if self.ledger_seq.is_current(ticket) {
            self.lock_state().ledger = match &result {
                Ok(view) => Panel::Ready(view.clone()),
                Err(e) => Panel::Failed {
                    fallback: LedgerView::empty(),
                    message: e.to_string(),
                },
            };
        } else {
            debug!(ticket = ticket.value(), "discarding stale ledger load");
        }
        result
    }

    /// Recompute metrics for the currently selected range.
    ///
    /// On failure the panel shows a zeroed snapshot with the error, never a
    /// previous or partial one.
    pub async fn refresh_metrics(&self) -> Result<MetricsSnapshot, CoreError> {
        let ticket = self.metrics_seq.issue();
        let selector = {
            let mut state = self.lock_state();
            state.metrics = Panel::Loading;
            state.range
        };
        let now = (self.clock)();

        let result = self
            .metrics_engine
            .compute_metrics(self.ledger.as_ref(), &self.user_id, selector, &now)
            .await;

        if self.metrics_seq.is_current(ticket) {
            self.lock_state().metrics = match &result {
                Ok(snapshot) => Panel::Ready(snapshot.clone()),
                Err(e) => Panel::Failed {
                    fallback: MetricsSnapshot::zeroed(selector),
                    message: e.to_string(),
                },
            };
        } else {
            debug!(ticket = ticket.value(), %selector, "discarding stale metrics");
        }
        result
    }

    /// Recompute the fixed trailing-window expense total.
    pub async fn refresh_trailing(&self) -> Result<FixedWindowSnapshot, CoreError> {
        let ticket = self.trailing_seq.issue();
        self.lock_state().trailing = Panel::Loading;
        let now = (self.clock)();

        let result = self
            .fixed_window
            .compute_trailing(self.ledger.as_ref(), &self.user_id, &now)
            .await;

        if self.trailing_seq.is_current(ticket) {
            self.lock_state().trailing = match &result {
                Ok(snapshot) => Panel::Ready(snapshot.clone()),
                Err(e) => Panel::Failed {
                    fallback: FixedWindowSnapshot::zeroed(self.fixed_window.window_days()),
                    message: e.to_string(),
                },
            };
        } else {
            debug!(ticket = ticket.value(), "discarding stale trailing window");
        }
        result
    }

    /// Fetch the profile display name. A failure is logged and otherwise
    /// ignored; the name is decoration only.
    pub async fn load_profile_name(&self) {
        match self.ledger.fetch_profile_name(&self.user_id).await {
            Ok(name) => self.lock_state().display_name = name,
            Err(e) => warn!(user = %self.user_id, error = %e, "could not load profile name"),
        }
    }

    // ── Range selection ─────────────────────────────────────────────

    /// Switch the reporting range and recompute metrics for it. Results of
    /// fetches started for the previous range are discarded.
    pub async fn set_range(&self, selector: RangeSelector) -> Result<MetricsSnapshot, CoreError> {
        {
            let mut state = self.lock_state();
            if state.range != selector {
                debug!(from = %state.range, to = %selector, "range changed");
            }
            state.range = selector;
        }
        self.metrics_seq.invalidate();
        self.refresh_metrics().await
    }

    /// Like [`Dashboard::set_range`] for a raw selector; unrecognized values
    /// fall back to `last30d` instead of failing.
    pub async fn set_range_str(&self, raw: &str) -> Result<MetricsSnapshot, CoreError> {
        let selector = services::range_resolver::RangeResolver::selector_or_default(raw);
        self.set_range(selector).await
    }

    // ── Recording ───────────────────────────────────────────────────

    /// Record a transaction for the dashboard's user.
    ///
    /// 1. Insert (one attempt). On failure nothing local changes and the
    ///    error is kept in `record_error`.
    /// 2. Patch balance and feed optimistically.
    /// 3. Refresh metrics and the trailing window concurrently; their
    ///    failures land in their own panels and do not undo steps 1–2.
    pub async fn record_transaction(
        &self,
        amount: Decimal,
        transaction_type: TransactionType,
        category: &str,
        description: Option<&str>,
    ) -> Result<Transaction, CoreError> {
        let new = NewTransaction::new(
            self.user_id.clone(),
            amount,
            transaction_type,
            category,
            description.map(str::to_string),
        );

        {
            let mut state = self.lock_state();
            state.recording = true;
            state.record_error = None;
        }

        let tx = match self.recorder.record(self.ledger.as_ref(), &new).await {
            Ok(tx) => tx,
            Err(e) => {
                let mut state = self.lock_state();
                state.recording = false;
                state.record_error = Some(e.to_string());
                return Err(e);
            }
        };

        {
            let mut state = self.lock_state();
            let current = std::mem::take(&mut state.ledger);
            state.ledger = match current {
                Panel::Ready(view) => {
                    Panel::Ready(self.balance_ledger.apply_optimistic(view, tx.clone()))
                }
                Panel::Failed { fallback, message } => Panel::Failed {
                    fallback: self.balance_ledger.apply_optimistic(fallback, tx.clone()),
                    message,
                },
                Panel::Loading => Panel::Ready(
                    self.balance_ledger
                        .apply_optimistic(LedgerView::empty(), tx.clone()),
                ),
            };
            state.recording = false;
        }

        let _ = tokio::join!(self.refresh_metrics(), self.refresh_trailing());
        Ok(tx)
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Detach from in-flight work (sign-out, view closed). Fetches already
    /// running complete but their results are dropped.
    pub fn close(&self) {
        self.ledger_seq.invalidate();
        self.metrics_seq.invalidate();
        self.trailing_seq.invalidate();
        info!(user = %self.user_id, "dashboard closed");
    }

    // ── Internal ────────────────────────────────────────────────────

    fn lock_state(&self) -> MutexGuard<'_, DashboardState> {
        // State is only replaced wholesale per field, so a poisoned guard is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
