use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::range::RangeSelector;

/// Windowed totals for the selected reporting range. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Range these figures were computed for
    pub selector: RangeSelector,

    /// Sum of income amounts inside the window
    pub income_total: Decimal,

    /// Sum of expense amounts inside the window
    pub expense_total: Decimal,

    /// `expense_total / day_count`, rounded to a whole unit
    pub daily_average_expense: Decimal,
}

impl MetricsSnapshot {
    /// The `{0, 0, 0}` snapshot shown while loading or after a failure.
    pub fn zeroed(selector: RangeSelector) -> Self {
        Self {
            selector,
            income_total: Decimal::ZERO,
            expense_total: Decimal::ZERO,
            daily_average_expense: Decimal::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.income_total.is_zero()
            && self.expense_total.is_zero()
            && self.daily_average_expense.is_zero()
    }
}

/// Expense total over the fixed trailing window, independent of the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedWindowSnapshot {
    pub trailing_expense_total: Decimal,

    /// Window length the total was computed over (30 unless configured)
    pub window_days: u32,
}

impl FixedWindowSnapshot {
    pub fn zeroed(window_days: u32) -> Self {
        Self {
            trailing_expense_total: Decimal::ZERO,
            window_days,
        }
    }
}
