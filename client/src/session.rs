//! Sync session - one journal per record kind, owned for a login's lifetime.

use crate::channel::RecordChannel;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::remote::{RecordFetcher, RecordWriter};
use nightsync_engine::{
    Clock, DeviceStatus, GlucoseEntry, ProfileSet, RecordKind, SystemClock, Treatment,
};
use std::sync::Arc;

/// A service able to fetch and write one record kind.
pub trait RecordService<R>: RecordFetcher<R> + RecordWriter<R> {}

impl<S, R> RecordService<R> for S where S: RecordFetcher<R> + RecordWriter<R> {}

/// A service covering every record kind the session mirrors.
pub trait RemoteService:
    RecordService<GlucoseEntry>
    + RecordService<Treatment>
    + RecordService<ProfileSet>
    + RecordService<DeviceStatus>
    + 'static
{
}

impl<S> RemoteService for S where
    S: RecordService<GlucoseEntry>
        + RecordService<Treatment>
        + RecordService<ProfileSet>
        + RecordService<DeviceStatus>
        + 'static
{
}

/// The most recent reconciled page of every record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestRecords {
    pub entries: Vec<GlucoseEntry>,
    pub treatments: Vec<Treatment>,
    pub profiles: Vec<ProfileSet>,
    pub device_statuses: Vec<DeviceStatus>,
}

/// Mirrors every record kind of one remote service for one login.
///
/// Each kind has its own journal, so writes to different kinds never
/// contend. Journals live exactly as long as the session.
#[derive(Debug)]
pub struct SyncSession {
    config: SyncConfig,
    pub entries: RecordChannel<GlucoseEntry>,
    pub treatments: RecordChannel<Treatment>,
    pub profiles: RecordChannel<ProfileSet>,
    pub device_statuses: RecordChannel<DeviceStatus>,
}

impl SyncSession {
    /// Open a session against `service` using the system clock.
    pub fn open<S: RemoteService>(config: SyncConfig, service: Arc<S>) -> Result<Self> {
        Self::with_clock(config, service, Arc::new(SystemClock))
    }

    /// Open a session with an injected clock.
    pub fn with_clock<S: RemoteService>(
        config: SyncConfig,
        service: Arc<S>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let session = Self {
            entries: channel(&config, &clock, &service)?,
            treatments: channel(&config, &clock, &service)?,
            profiles: channel(&config, &clock, &service)?,
            device_statuses: channel(&config, &clock, &service)?,
            config,
        };

        tracing::info!(
            propagation_delay_secs = session.config.propagation_delay.num_seconds(),
            page_size = session.config.page_size,
            "Sync session opened"
        );

        Ok(session)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Fetch and reconcile the latest page of every kind concurrently.
    pub async fn refresh_latest(&self) -> Result<LatestRecords> {
        let (entries, treatments, profiles, device_statuses) = tokio::try_join!(
            self.entries.fetch_latest(),
            self.treatments.fetch_latest(),
            self.profiles.fetch_latest(),
            self.device_statuses.fetch_latest(),
        )?;

        Ok(LatestRecords {
            entries,
            treatments,
            profiles,
            device_statuses,
        })
    }

    /// Number of journaled completions per kind.
    pub fn pending_counts(&self) -> Vec<(RecordKind, usize)> {
        vec![
            (RecordKind::GlucoseEntry, journaled(&self.entries)),
            (RecordKind::Treatment, journaled(&self.treatments)),
            (RecordKind::Profile, journaled(&self.profiles)),
            (RecordKind::DeviceStatus, journaled(&self.device_statuses)),
        ]
    }

    /// Forget every journaled operation, e.g. on a full resync.
    pub fn clear(&self) {
        self.entries.clear();
        self.treatments.clear();
        self.profiles.clear();
        self.device_statuses.clear();
        tracing::info!("Sync session journals cleared");
    }

    /// End the session, discarding its journals.
    pub fn close(self) {
        self.clear();
        tracing::info!("Sync session closed");
    }
}

fn channel<R, S>(
    config: &SyncConfig,
    clock: &Arc<dyn Clock>,
    service: &Arc<S>,
) -> Result<RecordChannel<R>>
where
    R: nightsync_engine::KindedRecord + Clone + Send + Sync + 'static,
    S: RecordService<R> + 'static,
{
    let fetcher: Arc<dyn RecordFetcher<R>> = service.clone();
    let writer: Arc<dyn RecordWriter<R>> = service.clone();
    RecordChannel::new(config, Arc::clone(clock), fetcher, writer)
}

fn journaled<R>(channel: &RecordChannel<R>) -> usize
where
    R: nightsync_engine::KindedRecord + Clone + Send + Sync + 'static,
{
    let reconciler = channel.reconciler();
    reconciler.recently_uploaded().len()
        + reconciler.recently_updated().len()
        + reconciler.recently_deleted().len()
}
