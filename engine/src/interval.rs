//! Closed date intervals used for clamping and reconciliation windows.

use crate::{error::Result, Error, Timestamp};
use chrono::{DateTime, Utc};

/// A closed interval `[start, end]` of timestamps.
///
/// Invariant: `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateInterval {
    start: Timestamp,
    end: Timestamp,
}

impl DateInterval {
    /// Create an interval, rejecting one whose start is after its end.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// An interval containing a single instant.
    pub fn instant(at: Timestamp) -> Self {
        Self { start: at, end: at }
    }

    /// An interval from `start` with no upper bound.
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            start,
            end: DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether the interval extends to the end of representable time.
    pub fn is_unbounded(&self) -> bool {
        self.end == DateTime::<Utc>::MAX_UTC
    }

    /// Same start, no upper bound.
    pub fn extended_to_future(self) -> Self {
        Self::starting_at(self.start)
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }
}
