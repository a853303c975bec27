use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::ledger::RECENT_FEED_LIMIT;
use super::range::RangeSelector;

/// Default length of the fixed trailing expense window.
pub const TRAILING_WINDOW_DAYS: u32 = 30;

/// Connection details for a PostgREST-compatible datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatastoreSettings {
    /// Project URL, e.g. `https://xyz.supabase.co` (without `/rest/v1`)
    pub base_url: String,

    /// Anonymous or service API key, sent as `apikey` and bearer token
    pub api_key: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Tracker configuration, loaded from JSON by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Range selected when a dashboard opens.
    pub default_range: RangeSelector,

    /// How many transactions the recent feed keeps.
    pub recent_feed_limit: usize,

    /// Length of the fixed trailing expense window, in days.
    pub trailing_window_days: u32,

    /// Remote datastore; `None` means the caller wires its own `LedgerQuery`.
    pub datastore: Option<DatastoreSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_range: RangeSelector::Last30d,
            recent_feed_limit: RECENT_FEED_LIMIT,
            trailing_window_days: TRAILING_WINDOW_DAYS,
            datastore: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.recent_feed_limit == 0 {
            return Err(CoreError::ValidationError(
                "recent_feed_limit must be at least 1".into(),
            ));
        }
        if self.trailing_window_days == 0 {
            return Err(CoreError::ValidationError(
                "trailing_window_days must be at least 1".into(),
            ));
        }
        if let Some(ds) = &self.datastore {
            if ds.base_url.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "datastore.base_url must not be empty".into(),
                ));
            }
            if ds.timeout_secs == 0 {
                return Err(CoreError::ValidationError(
                    "datastore.timeout_secs must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }
}
