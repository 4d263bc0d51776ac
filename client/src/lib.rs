//! Nightsync Client - session layer over the nightsync reconciliation engine.
//!
//! A [`SyncSession`] owns one [`RecordChannel`] per record kind. Each channel
//! forwards writes to a host-provided remote service, journals what the
//! service confirms, and reconciles every fetched batch so the caller sees
//! its own recent writes even while the service's read path lags behind.
//!
//! Hosts implement [`RecordFetcher`] and [`RecordWriter`] over their own
//! transport; the session performs no IO of its own.

pub mod channel;
pub mod config;
pub mod error;
pub mod remote;
pub mod session;
pub mod telemetry;

pub use channel::RecordChannel;
pub use config::{ConfigError, SyncConfig, DEFAULT_PAGE_SIZE};
pub use error::{RemoteCall, RemoteError, Result, SyncError};
pub use remote::{FetchRequest, RecordFetcher, RecordWriter};
pub use session::{LatestRecords, RecordService, RemoteService, SyncSession};
pub use telemetry::init_tracing;
