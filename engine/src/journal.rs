//! Operation Journal - recent upload, update, and delete completions.
//!
//! The journal is plain data with `&mut self` mutation. Shared access goes
//! through [`Reconciler`](crate::Reconciler), which guards one journal with a
//! single mutex.

use crate::{
    OperationCompletion, OperationKind, OrderedRecordSet, RecordId, Timestamp, TimestampedRecord,
};
use std::collections::HashSet;

type CompletionSet<R> = OrderedRecordSet<OperationCompletion<R>>;

/// Three ordered sets of operation completions, one per operation kind.
///
/// Each set is ordered by the wrapped record's event date, newest first.
#[derive(Debug, Clone)]
pub struct OperationJournal<R> {
    uploaded: CompletionSet<R>,
    updated: CompletionSet<R>,
    deleted: CompletionSet<R>,
}

impl<R: TimestampedRecord> OperationJournal<R> {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self {
            uploaded: OrderedRecordSet::new(),
            updated: OrderedRecordSet::new(),
            deleted: OrderedRecordSet::new(),
        }
    }

    fn set_mut(&mut self, kind: OperationKind) -> &mut CompletionSet<R> {
        match kind {
            OperationKind::Upload => &mut self.uploaded,
            OperationKind::Update => &mut self.updated,
            OperationKind::Delete => &mut self.deleted,
        }
    }

    /// Completions of one kind, newest event date first.
    pub fn completions(&self, kind: OperationKind) -> &CompletionSet<R> {
        match kind {
            OperationKind::Upload => &self.uploaded,
            OperationKind::Update => &self.updated,
            OperationKind::Delete => &self.deleted,
        }
    }

    pub fn uploaded(&self) -> &CompletionSet<R> {
        &self.uploaded
    }

    pub fn updated(&self) -> &CompletionSet<R> {
        &self.updated
    }

    pub fn deleted(&self) -> &CompletionSet<R> {
        &self.deleted
    }

    /// Journal one completion per object, all stamped `operation_date`.
    ///
    /// Returns the number of completions added.
    pub fn record(
        &mut self,
        kind: OperationKind,
        objects: impl IntoIterator<Item = R>,
        operation_date: Timestamp,
    ) -> usize {
        let set = self.set_mut(kind);
        let before = set.len();
        set.insert_all(
            objects
                .into_iter()
                .map(|record| OperationCompletion::new(record, operation_date)),
        );
        set.len() - before
    }

    pub fn record_upload(
        &mut self,
        objects: impl IntoIterator<Item = R>,
        operation_date: Timestamp,
    ) -> usize {
        self.record(OperationKind::Upload, objects, operation_date)
    }

    pub fn record_update(
        &mut self,
        objects: impl IntoIterator<Item = R>,
        operation_date: Timestamp,
    ) -> usize {
        self.record(OperationKind::Update, objects, operation_date)
    }

    pub fn record_delete(
        &mut self,
        objects: impl IntoIterator<Item = R>,
        operation_date: Timestamp,
    ) -> usize {
        self.record(OperationKind::Delete, objects, operation_date)
    }

    /// Drop every completion whose operation date precedes `cutoff`.
    ///
    /// Returns the number of completions removed across all three sets.
    pub fn prune_older_than(&mut self, cutoff: Timestamp) -> usize {
        let keep = |c: &OperationCompletion<R>| !c.completed_before(cutoff);
        self.uploaded.retain(keep) + self.updated.retain(keep) + self.deleted.retain(keep)
    }

    /// Empty all three sets.
    pub fn clear(&mut self) {
        self.uploaded.clear();
        self.updated.clear();
        self.deleted.clear();
    }

    /// Evict uploads the server has caught up with.
    ///
    /// Only the part of `fetched` inside the upload journal's spanned
    /// interval is inspected. Returns the number of uploads evicted.
    pub fn synchronize_with_fetched(&mut self, fetched: &OrderedRecordSet<R>) -> usize {
        let Some(span) = self.uploaded.spanned_interval() else {
            return 0;
        };
        let seen: HashSet<RecordId> = fetched
            .clamped(&span)
            .iter()
            .map(|record| record.id().clone())
            .collect();
        self.uploaded.remove_ids(&seen)
    }

    /// Total completions across all three sets.
    pub fn len(&self) -> usize {
        self.uploaded.len() + self.updated.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: TimestampedRecord> Default for OperationJournal<R> {
    fn default() -> Self {
        Self::new()
    }
}
