//! Reconciliation of journaled local writes with freshly fetched batches.
//!
//! The remote service's read path lags its write path by up to the
//! propagation delay. A batch fetched shortly after a local write may not
//! contain the written record yet, or may still contain a stale or deleted
//! copy. Reconciliation corrects the batch using the journal.
//!
//! # Algorithm
//!
//! Given a fetched batch `F` (newest first) the corrected view `V` starts as
//! `F`, then:
//!
//! 1. If `F` is empty, `V` is every journaled upload that was not deleted
//!    afterwards, each shown as its latest journaled update if it has one.
//! 2. The relevant window is `[F.oldest, F.newest]`, or `[F.oldest, +inf)`
//!    when newer uploads should be surfaced too.
//! 3. Uploads in the window whose id is absent from `V` are inserted.
//! 4. Every id in the update journal is removed from `V`, then the most
//!    recent update of each id is inserted if it falls in the window.
//! 5. Deletes in the window remove their ids from `V`.
//!
//! Uploads go before updates before deletes, so an upload followed by an
//! update shows the update and an upload followed by a delete disappears.

use crate::{
    error::Result, Clock, Error, OperationCompletion, OperationJournal, OrderedRecordSet,
    RecordId, SystemClock, Timestamp, TimestampedRecord,
};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// How long, in seconds, the remote read path may lag behind its write path.
pub const DEFAULT_PROPAGATION_DELAY_SECS: i64 = 300;

/// The default propagation delay window.
pub fn default_propagation_delay() -> Duration {
    Duration::seconds(DEFAULT_PROPAGATION_DELAY_SECS)
}

/// Merge journal state into a fetched batch.
///
/// Journal entries older than the batch are left alone: a previous fetch
/// already covered them and they age out through pruning.
pub fn merge_journal<R>(
    fetched: OrderedRecordSet<R>,
    journal: &OperationJournal<R>,
    insert_all_newer_uploads: bool,
) -> OrderedRecordSet<R>
where
    R: TimestampedRecord + Clone,
{
    let Some(span) = fetched.spanned_interval() else {
        return uploads_only(fetched, journal);
    };
    let window = if insert_all_newer_uploads {
        span.extended_to_future()
    } else {
        span
    };

    let mut view = fetched;

    let mut present: HashSet<RecordId> = view.iter().map(|r| r.id().clone()).collect();
    for completion in journal.uploaded().clamped(&window) {
        if present.insert(completion.id().clone()) {
            view.insert(completion.record.clone());
        }
    }

    // An update may have moved the record's event date, so the stale copy
    // has to be found by id anywhere in the view.
    let updated_ids: HashSet<RecordId> =
        journal.updated().iter().map(|c| c.id().clone()).collect();
    view.remove_ids(&updated_ids);
    let updates = latest_per_id(journal.updated().as_slice())
        .filter(|c| window.contains(c.event_date()));
    view.insert_all(updates.map(|c| c.record.clone()));

    let deleted_ids: HashSet<RecordId> = journal
        .deleted()
        .clamped(&window)
        .iter()
        .map(|c| c.id().clone())
        .collect();
    view.remove_ids(&deleted_ids);

    view
}

/// View of an empty batch: the journaled uploads, with later updates and
/// deletes of those same records applied.
fn uploads_only<R>(
    mut view: OrderedRecordSet<R>,
    journal: &OperationJournal<R>,
) -> OrderedRecordSet<R>
where
    R: TimestampedRecord + Clone,
{
    let latest_updates: HashMap<&RecordId, &R> = latest_per_id(journal.updated().as_slice())
        .map(|c| (c.id(), &c.record))
        .collect();
    let deleted_ids: HashSet<&RecordId> = journal.deleted().iter().map(|c| c.id()).collect();

    let uploads = journal
        .uploaded()
        .iter()
        .filter(|c| !deleted_ids.contains(c.id()))
        .map(|c| latest_updates.get(c.id()).copied().unwrap_or(&c.record).clone());
    view.insert_all(uploads);
    view
}

/// The most recently completed entry per id, in the order of `completions`.
///
/// Ties on the operation date go to the entry later in set order.
fn latest_per_id<R: TimestampedRecord>(
    completions: &[OperationCompletion<R>],
) -> impl Iterator<Item = &OperationCompletion<R>> {
    let mut latest: HashMap<&RecordId, usize> = HashMap::new();
    for (index, completion) in completions.iter().enumerate() {
        let newer = latest.get(completion.id()).map_or(true, |&current| {
            completion.operation_date >= completions[current].operation_date
        });
        if newer {
            latest.insert(completion.id(), index);
        }
    }
    completions
        .iter()
        .enumerate()
        .filter(move |(index, completion)| latest.get(completion.id()) == Some(index))
        .map(|(_, completion)| completion)
}

/// Guards one record kind's journal and reconciles fetched batches with it.
///
/// Every mutation and every merge runs under a single mutex, held for the
/// whole multi-step operation and never across IO. Use one reconciler per
/// record kind.
pub struct Reconciler<R> {
    journal: Mutex<OperationJournal<R>>,
    clock: Arc<dyn Clock>,
    propagation_delay: Duration,
}

impl<R> Reconciler<R>
where
    R: TimestampedRecord + Clone,
{
    /// Create a reconciler using the system clock and the default delay.
    pub fn new() -> Self {
        Self {
            journal: Mutex::new(OperationJournal::new()),
            clock: Arc::new(SystemClock),
            propagation_delay: default_propagation_delay(),
        }
    }

    /// Use a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a different propagation delay window.
    pub fn with_propagation_delay(mut self, delay: Duration) -> Result<Self> {
        if delay < Duration::zero() {
            return Err(Error::NegativePropagationDelay(delay));
        }
        self.propagation_delay = delay;
        Ok(self)
    }

    pub fn propagation_delay(&self) -> Duration {
        self.propagation_delay
    }

    /// Journal records whose upload just succeeded.
    pub fn record_upload(&self, objects: impl IntoIterator<Item = R>) {
        let now = self.clock.now();
        let added = self.journal.lock().record_upload(objects, now);
        tracing::debug!(kind = "upload", added, "Journaled operation completions");
    }

    /// Journal records whose update just succeeded.
    pub fn record_update(&self, objects: impl IntoIterator<Item = R>) {
        let now = self.clock.now();
        let added = self.journal.lock().record_update(objects, now);
        tracing::debug!(kind = "update", added, "Journaled operation completions");
    }

    /// Journal records whose deletion just succeeded.
    pub fn record_delete(&self, objects: impl IntoIterator<Item = R>) {
        let now = self.clock.now();
        let added = self.journal.lock().record_delete(objects, now);
        tracing::debug!(kind = "delete", added, "Journaled operation completions");
    }

    /// Produce the corrected view of a freshly fetched batch.
    ///
    /// `fetched` should be sorted newest first; an unsorted batch is
    /// re-sorted. Under one lock this prunes completions older than the
    /// propagation delay, evicts uploads the server has caught up with, and
    /// merges what is left of the journal.
    pub fn reconcile(&self, fetched: Vec<R>, insert_all_newer_uploads: bool) -> Vec<R> {
        let fetched_count = fetched.len();
        let mut batch = OrderedRecordSet::new();
        if !batch.is_ordered(&fetched) {
            tracing::warn!(
                fetched = fetched_count,
                "Fetched batch not sorted newest first, re-sorting"
            );
        }
        batch.assign(fetched);

        let mut journal = self.journal.lock();
        let pruned = journal.prune_older_than(self.cutoff());
        let evicted = journal.synchronize_with_fetched(&batch);
        let view = merge_journal(batch, &journal, insert_all_newer_uploads);
        drop(journal);

        tracing::debug!(
            fetched = fetched_count,
            view = view.len(),
            evicted,
            pruned,
            "Reconciled fetched batch"
        );

        view.into_vec()
    }

    fn cutoff(&self) -> Timestamp {
        self.clock
            .now()
            .checked_sub_signed(self.propagation_delay)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Drop completions whose operation date precedes `cutoff`.
    pub fn prune_older_than(&self, cutoff: Timestamp) -> usize {
        self.journal.lock().prune_older_than(cutoff)
    }

    /// Drop completions older than the propagation delay window.
    pub fn prune_expired(&self) -> usize {
        let cutoff = self.cutoff();
        self.prune_older_than(cutoff)
    }

    /// Forget every journaled operation.
    pub fn clear(&self) {
        self.journal.lock().clear();
        tracing::debug!("Cleared operation journal");
    }

    /// Journaled uploads, newest event date first.
    pub fn recently_uploaded(&self) -> Vec<OperationCompletion<R>> {
        self.journal.lock().uploaded().as_slice().to_vec()
    }

    /// Journaled updates, newest event date first.
    pub fn recently_updated(&self) -> Vec<OperationCompletion<R>> {
        self.journal.lock().updated().as_slice().to_vec()
    }

    /// Journaled deletes, newest event date first.
    pub fn recently_deleted(&self) -> Vec<OperationCompletion<R>> {
        self.journal.lock().deleted().as_slice().to_vec()
    }
}

impl<R> Default for Reconciler<R>
where
    R: TimestampedRecord + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for Reconciler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("propagation_delay", &self.propagation_delay)
            .finish_non_exhaustive()
    }
}
