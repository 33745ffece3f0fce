use chrono::{DateTime, Utc};
use serde::Serialize;
use sprintboard_core::BoardError;

/// The most recent user-visible failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSignal {
    pub message: String,
    pub kind: &'static str,
    pub at: DateTime<Utc>,
}

impl ErrorSignal {
    pub fn from_error(error: &BoardError) -> Self {
        Self {
            message: error.to_string(),
            kind: error.kind(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_from_error() {
        let signal = ErrorSignal::from_error(&BoardError::PartialBulkFailure {
            failed: 1,
            attempted: 3,
        });
        assert_eq!(signal.kind, "partial_bulk_failure");
        assert_eq!(signal.message, "1 of 3 operations failed");
    }
}
