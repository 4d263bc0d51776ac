//! Operation completions - a record paired with when its write succeeded.

use crate::{RecordId, Timestamp, TimestampedRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which journal an operation completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Upload,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Upload => "upload",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A record whose write was observed to succeed at `operation_date`.
///
/// Sorts and clamps by the wrapped record's event date, not by the
/// operation date; the operation date only drives pruning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationCompletion<R> {
    /// The record as known locally when the write completed
    pub record: R,
    /// Local wall-clock time the write was confirmed
    pub operation_date: Timestamp,
}

impl<R> OperationCompletion<R> {
    pub fn new(record: R, operation_date: Timestamp) -> Self {
        Self {
            record,
            operation_date,
        }
    }

    pub fn into_record(self) -> R {
        self.record
    }

    /// Whether the write completed strictly before `cutoff`.
    pub fn completed_before(&self, cutoff: Timestamp) -> bool {
        self.operation_date < cutoff
    }
}

impl<R: TimestampedRecord> TimestampedRecord for OperationCompletion<R> {
    fn id(&self) -> &RecordId {
        self.record.id()
    }

    fn event_date(&self) -> Timestamp {
        self.record.event_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Reading {
        id: RecordId,
        at: Timestamp,
    }

    impl TimestampedRecord for Reading {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn event_date(&self) -> Timestamp {
            self.at
        }
    }

    #[test]
    fn delegates_to_record() {
        let event = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let completed = Utc.timestamp_opt(1_700_000_600, 0).unwrap();
        let completion = OperationCompletion::new(
            Reading {
                id: "r-1".into(),
                at: event,
            },
            completed,
        );

        assert_eq!(completion.id(), "r-1");
        assert_eq!(completion.event_date(), event);
        assert_eq!(completion.operation_date, completed);
    }

    #[test]
    fn completed_before_is_strict() {
        let completed = Utc.timestamp_opt(1_700_000_600, 0).unwrap();
        let completion = OperationCompletion::new(
            Reading {
                id: "r-1".into(),
                at: completed,
            },
            completed,
        );
        assert!(!completion.completed_before(completed));
        assert!(completion.completed_before(completed + chrono::Duration::seconds(1)));
    }

    #[test]
    fn kind_display() {
        assert_eq!(OperationKind::Upload.to_string(), "upload");
        assert_eq!(OperationKind::Delete.to_string(), "delete");
    }
}
