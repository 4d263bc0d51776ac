//! One record kind's wiring between the remote service and its journal.

use crate::config::SyncConfig;
use crate::error::{RemoteCall, Result, SyncError};
use crate::remote::{FetchRequest, RecordFetcher, RecordWriter};
use nightsync_engine::{Clock, KindedRecord, OperationKind, Reconciler, RecordKind};
use std::sync::Arc;

/// Fetches and writes one record kind, keeping its journal current.
///
/// Writes are journaled only after the remote service confirms them, and
/// every fetched batch is reconciled before it is returned.
pub struct RecordChannel<R> {
    reconciler: Reconciler<R>,
    fetcher: Arc<dyn RecordFetcher<R>>,
    writer: Arc<dyn RecordWriter<R>>,
    page_size: usize,
    insert_all_newer_uploads: bool,
}

impl<R> RecordChannel<R>
where
    R: KindedRecord + Clone + Send + Sync + 'static,
{
    /// Create a channel with its own journal.
    pub fn new(
        config: &SyncConfig,
        clock: Arc<dyn Clock>,
        fetcher: Arc<dyn RecordFetcher<R>>,
        writer: Arc<dyn RecordWriter<R>>,
    ) -> Result<Self> {
        let reconciler = Reconciler::new()
            .with_clock(clock)
            .with_propagation_delay(config.propagation_delay)?;

        Ok(Self {
            reconciler,
            fetcher,
            writer,
            page_size: config.page_size,
            insert_all_newer_uploads: config.insert_all_newer_uploads,
        })
    }

    pub fn kind(&self) -> RecordKind {
        R::KIND
    }

    /// The journal guard, for diagnostics.
    pub fn reconciler(&self) -> &Reconciler<R> {
        &self.reconciler
    }

    /// Upload new records; journals what the service confirms.
    pub async fn upload(&self, records: Vec<R>) -> Result<Vec<R>> {
        self.write(OperationKind::Upload, records).await
    }

    /// Update existing records; journals what the service confirms.
    pub async fn update(&self, records: Vec<R>) -> Result<Vec<R>> {
        self.write(OperationKind::Update, records).await
    }

    /// Delete records; journals what the service confirms.
    pub async fn delete(&self, records: Vec<R>) -> Result<Vec<R>> {
        self.write(OperationKind::Delete, records).await
    }

    async fn write(&self, operation: OperationKind, records: Vec<R>) -> Result<Vec<R>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let requested = records.len();
        let outcome = match operation {
            OperationKind::Upload => self.writer.upload(records).await,
            OperationKind::Update => self.writer.update(records).await,
            OperationKind::Delete => self.writer.delete(records).await,
        };
        let affected = outcome.map_err(|source| {
            tracing::warn!(kind = %R::KIND, %operation, error = %source, "Remote write failed");
            SyncError::Remote {
                kind: R::KIND,
                call: RemoteCall::Write(operation),
                source,
            }
        })?;

        let journaled = affected.clone();
        match operation {
            OperationKind::Upload => self.reconciler.record_upload(journaled),
            OperationKind::Update => self.reconciler.record_update(journaled),
            OperationKind::Delete => self.reconciler.record_delete(journaled),
        }

        tracing::debug!(
            kind = %R::KIND,
            %operation,
            requested,
            affected = affected.len(),
            "Remote write completed"
        );

        Ok(affected)
    }

    /// Fetch a batch and return its reconciled view.
    ///
    /// Open-ended requests also surface journaled uploads newer than the
    /// batch when the session is configured to, since the caller is showing
    /// everything up to now.
    pub async fn fetch(&self, request: FetchRequest) -> Result<Vec<R>> {
        let insert_all_newer_uploads = self.insert_all_newer_uploads && request.is_open_ended();
        self.fetch_with(request, insert_all_newer_uploads).await
    }

    /// Fetch the most recent page.
    pub async fn fetch_latest(&self) -> Result<Vec<R>> {
        self.fetch(FetchRequest::latest(self.page_size)).await
    }

    /// Fetch a batch with an explicit newer-uploads policy.
    pub async fn fetch_with(
        &self,
        request: FetchRequest,
        insert_all_newer_uploads: bool,
    ) -> Result<Vec<R>> {
        let fetched = self.fetcher.fetch(&request).await.map_err(|source| {
            tracing::warn!(kind = %R::KIND, error = %source, "Remote fetch failed");
            SyncError::Remote {
                kind: R::KIND,
                call: RemoteCall::Fetch,
                source,
            }
        })?;

        Ok(self.reconciler.reconcile(fetched, insert_all_newer_uploads))
    }

    /// Forget every journaled operation for this kind.
    pub fn clear(&self) {
        self.reconciler.clear();
    }
}

impl<R> std::fmt::Debug for RecordChannel<R>
where
    R: KindedRecord,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordChannel")
            .field("kind", &R::KIND)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
