//! Unified error handling for the sync session.

use crate::config::ConfigError;
use nightsync_engine::{OperationKind, RecordKind};

/// Error reported by a remote collaborator, passed upstream untouched.
pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
    Fetch,
    Write(OperationKind),
}

impl std::fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteCall::Fetch => f.write_str("fetch"),
            RemoteCall::Write(kind) => write!(f, "{kind}"),
        }
    }
}

/// Session error type.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Remote {call} of {kind} failed: {source}")]
    Remote {
        kind: RecordKind,
        call: RemoteCall,
        #[source]
        source: RemoteError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] nightsync_engine::Error),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SyncError>;
