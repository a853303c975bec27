pub mod ledger;
pub mod metrics;
pub mod panel;
pub mod range;
pub mod settings;
pub mod transaction;
