use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Reporting window picked by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeSelector {
    /// Local calendar day containing "now"
    Today,
    /// The local calendar day before today
    Yesterday,
    /// Trailing 7 × 24h ending now
    Last7d,
    /// Trailing 14 × 24h ending now
    Last14d,
    /// Trailing 30 × 24h ending now (the default)
    #[default]
    Last30d,
}

impl RangeSelector {
    /// Every selector, in the order a picker lists them.
    pub const ALL: [RangeSelector; 5] = [
        RangeSelector::Last30d,
        RangeSelector::Last14d,
        RangeSelector::Last7d,
        RangeSelector::Yesterday,
        RangeSelector::Today,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeSelector::Today => "today",
            RangeSelector::Yesterday => "yesterday",
            RangeSelector::Last7d => "last7d",
            RangeSelector::Last14d => "last14d",
            RangeSelector::Last30d => "last30d",
        }
    }

    /// Length of the trailing window in days, `None` for calendar-day selectors.
    pub fn trailing_days(&self) -> Option<i64> {
        match self {
            RangeSelector::Today | RangeSelector::Yesterday => None,
            RangeSelector::Last7d => Some(7),
            RangeSelector::Last14d => Some(14),
            RangeSelector::Last30d => Some(30),
        }
    }
}

impl std::fmt::Display for RangeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RangeSelector {
    type Err = CoreError;

    /// Accepts the canonical names plus the short `7d`/`14d`/`30d` forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(RangeSelector::Today),
            "yesterday" => Ok(RangeSelector::Yesterday),
            "last7d" | "7d" => Ok(RangeSelector::Last7d),
            "last14d" | "14d" => Ok(RangeSelector::Last14d),
            "last30d" | "30d" => Ok(RangeSelector::Last30d),
            _ => Err(CoreError::InvalidRange(s.to_string())),
        }
    }
}

/// Concrete bounds for a [`RangeSelector`] evaluated at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    /// Inclusive lower bound
    pub start: DateTime<Utc>,

    /// Inclusive upper bound, never before `start`
    pub end: DateTime<Utc>,

    /// Divisor for daily averages, always >= 1
    pub day_count: u32,
}

impl ResolvedRange {
    /// Whether `instant` falls inside `[start, end]`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}
