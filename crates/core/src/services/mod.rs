pub mod balance_ledger;
pub mod fixed_window_tracker;
pub mod metrics_engine;
pub mod range_resolver;
pub mod transaction_recorder;
