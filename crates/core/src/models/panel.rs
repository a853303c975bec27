use serde::{Deserialize, Serialize};

/// Display state of one independently refreshed aggregate.
///
/// A failed refresh never leaves the panel undefined: it carries a safe
/// fallback value (zeroed snapshot, empty feed) next to the error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Panel<T> {
    /// A fetch is in flight and nothing has been shown yet for it
    Loading,
    /// The most recent fetch succeeded
    Ready(T),
    /// The most recent fetch failed
    Failed { fallback: T, message: String },
}

impl<T> Panel<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Panel::Ready(_))
    }

    /// The value to display: the loaded one, or the fallback after a failure.
    pub fn value(&self) -> Option<&T> {
        match self {
            Panel::Loading => None,
            Panel::Ready(v) => Some(v),
            Panel::Failed { fallback, .. } => Some(fallback),
        }
    }

    /// Error message to display, if the last fetch failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Panel::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel::Loading
    }
}
