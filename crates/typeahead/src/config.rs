//! Construction-time configuration for a typeahead control.

use std::time::Duration;

/// Quiet period after the last keystroke before candidates are fetched.
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(300);

/// Behavioral switches for a [`Typeahead`](crate::Typeahead).
///
/// # Fields
/// - `require_exact_match`: only text equal to a candidate label is accepted
///   as the bound value. Turning this off means typed text itself becomes the
///   value, which is only meaningful for string-like model types.
/// - `debounce_interval`: trailing-edge debounce applied to fetches.
/// - `notify_unresolved`: fire the change callback even when a keystroke
///   matched nothing and left the value untouched. Enabled by default to keep
///   hosts that count change events per keystroke working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeaheadConfig {
    pub require_exact_match: bool,
    pub debounce_interval: Duration,
    pub notify_unresolved: bool,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            require_exact_match: true,
            debounce_interval: DEFAULT_DEBOUNCE_INTERVAL,
            notify_unresolved: true,
        }
    }
}

impl TypeaheadConfig {
    pub fn with_debounce_interval(mut self, debounce_interval: Duration) -> Self {
        self.debounce_interval = debounce_interval;
        self
    }

    pub fn with_require_exact_match(mut self, require_exact_match: bool) -> Self {
        self.require_exact_match = require_exact_match;
        self
    }

    pub fn with_notify_unresolved(mut self, notify_unresolved: bool) -> Self {
        self.notify_unresolved = notify_unresolved;
        self
    }
}
