//! Guard for logging raw survey answers.
//!
//! Answers can identify respondents, so they only reach the logs once the
//! binary has opted in with [`set_log_data`].

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder logged instead of a raw answer.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// `value` when answer logging is enabled, otherwise [`REDACTED_VALUE`].
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_redacted_until_enabled() {
        set_log_data(false);
        assert_eq!(redact_value("Yes"), REDACTED_VALUE);
        set_log_data(true);
        assert_eq!(redact_value("Yes"), "Yes");
        set_log_data(false);
    }
}
