//! # Nightsync Engine
//!
//! Reconciles locally performed writes with snapshots fetched from a remote,
//! eventually-consistent record service.
//!
//! The remote service is read by polling. Its read path lags its write path,
//! so a batch fetched right after a local write may be missing the new
//! record, still hold the old version of an updated one, or still hold a
//! deleted one. This crate journals recent write completions and merges them
//! into every fetched batch until the server has had time to catch up.
//!
//! ## Design Principles
//!
//! - **No IO**: Fetching and writing belong to the host; the engine only sees
//!   their results
//! - **Total**: Reconciliation never fails; absence is a no-op
//! - **Injectable time**: Every "now" comes from a [`Clock`]
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! Anything implementing [`TimestampedRecord`]: an opaque identifier plus the
//! date the record logically occurred. [`GlucoseEntry`], [`Treatment`],
//! [`ProfileSet`] and [`DeviceStatus`] are provided.
//!
//! ### Ordered Record Set
//!
//! [`OrderedRecordSet`] keeps records newest first and extracts the records
//! inside a [`DateInterval`] with binary searches.
//!
//! ### Operation Journal
//!
//! [`OperationJournal`] holds [`OperationCompletion`]s for uploads, updates,
//! and deletes. Completions older than the propagation delay are pruned.
//!
//! ### Reconciler
//!
//! [`Reconciler`] guards one journal with a mutex and merges it into fetched
//! batches. See the [`reconcile`] module for the algorithm.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use nightsync_engine::{GlucoseEntry, ManualClock, Reconciler};
//! use std::sync::Arc;
//!
//! let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
//! let clock = Arc::new(ManualClock::new(now));
//! let reconciler = Reconciler::new().with_clock(clock.clone());
//!
//! // A reading was uploaded; the server does not serve it yet.
//! let uploaded = GlucoseEntry::sensor("c", now - Duration::minutes(10), 120.0);
//! reconciler.record_upload(vec![uploaded]);
//!
//! let fetched = vec![
//!     GlucoseEntry::sensor("b", now - Duration::minutes(5), 118.0),
//!     GlucoseEntry::sensor("a", now - Duration::minutes(15), 121.0),
//! ];
//! let view = reconciler.reconcile(fetched, false);
//!
//! let ids: Vec<_> = view.iter().map(|e| e.id.as_str()).collect();
//! assert_eq!(ids, vec!["b", "c", "a"]);
//! ```

pub mod clock;
pub mod completion;
pub mod error;
pub mod interval;
pub mod journal;
pub mod model;
pub mod reconcile;
pub mod record;
pub mod sorted;

// Re-export main types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use completion::{OperationCompletion, OperationKind};
pub use error::Error;
pub use interval::DateInterval;
pub use journal::OperationJournal;
pub use model::{
    DeviceStatus, DeviceStatusReport, EntryType, GlucoseEntry, KindedRecord, ProfileSet,
    Treatment,
};
pub use reconcile::{
    default_propagation_delay, merge_journal, Reconciler, DEFAULT_PROPAGATION_DELAY_SECS,
};
pub use record::{RecordKind, TimestampedRecord};
pub use sorted::{newest_first, Comparator, OrderedRecordSet};

/// Type aliases for clarity
pub type RecordId = String;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
