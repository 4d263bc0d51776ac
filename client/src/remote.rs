//! Collaborator traits for the remote record service.
//!
//! The session never speaks HTTP itself. Hosts implement these traits over
//! whatever transport they use; the session only sees the results.

use crate::error::RemoteError;
use async_trait::async_trait;
use nightsync_engine::{DateInterval, Timestamp};

/// What to fetch for one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Event-date range to fetch; `None` fetches the most recent records
    pub interval: Option<DateInterval>,
    /// Maximum number of records to return
    pub count: usize,
}

impl FetchRequest {
    /// The `count` most recent records.
    pub fn latest(count: usize) -> Self {
        Self {
            interval: None,
            count,
        }
    }

    /// Up to `count` records inside `interval`.
    pub fn within(interval: DateInterval, count: usize) -> Self {
        Self {
            interval: Some(interval),
            count,
        }
    }

    /// Up to `count` records from `start` up to now.
    pub fn since(start: Timestamp, count: usize) -> Self {
        Self::within(DateInterval::starting_at(start), count)
    }

    /// Whether the request reaches up to "now" rather than a bounded window.
    pub fn is_open_ended(&self) -> bool {
        self.interval.map_or(true, |interval| interval.is_unbounded())
    }
}

/// Reads batches of one record kind from the remote service.
#[async_trait]
pub trait RecordFetcher<R>: Send + Sync {
    /// Fetch a batch sorted newest event date first.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<R>, RemoteError>;
}

/// Writes records of one record kind to the remote service.
///
/// Each call returns the records the service reports as affected.
#[async_trait]
pub trait RecordWriter<R>: Send + Sync {
    async fn upload(&self, records: Vec<R>) -> Result<Vec<R>, RemoteError>;

    async fn update(&self, records: Vec<R>) -> Result<Vec<R>, RemoteError>;

    async fn delete(&self, records: Vec<R>) -> Result<Vec<R>, RemoteError>;
}
