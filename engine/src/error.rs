//! Error types for the nightsync engine.
//!
//! Reconciliation itself is total over in-memory data; errors only arise when
//! constructing values from caller-provided parameters.

use crate::Timestamp;
use thiserror::Error;

/// All possible errors from the nightsync engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid interval: start {start} is after end {end}")]
    InvalidInterval { start: Timestamp, end: Timestamp },

    #[error("propagation delay must not be negative, got {0}")]
    NegativePropagationDelay(chrono::Duration),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn error_display() {
        let start = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        let end = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let err = Error::InvalidInterval { start, end };
        assert_eq!(
            err.to_string(),
            "invalid interval: start 2023-11-14 22:15:00 UTC is after end 2023-11-14 22:13:20 UTC"
        );

        let err = Error::NegativePropagationDelay(chrono::Duration::seconds(-5));
        assert!(err.to_string().starts_with("propagation delay must not be negative"));
    }
}
