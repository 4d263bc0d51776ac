//! Ordered Record Set - a collection kept sorted by event date.
//!
//! The set is a `Vec` kept in comparator order at all times, so insertion is
//! a binary search plus a shift and interval extraction ("clamping") is two
//! binary searches. The default order is most recent event date first.
//!
//! Custom comparators must refine that order (e.g. to break ties between
//! records sharing an event date); clamping and interval queries rely on
//! dates being non-increasing from head to tail.

use crate::{DateInterval, RecordId, TimestampedRecord};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// Comparator defining the set order. `Ordering::Less` means "comes first".
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Default order: most recent event date first.
pub fn newest_first<T: TimestampedRecord>(a: &T, b: &T) -> Ordering {
    b.event_date().cmp(&a.event_date())
}

/// A sequence kept sorted by a comparator.
///
/// Duplicate identifiers are allowed; deduplication is the reconciler's job.
#[derive(Clone)]
pub struct OrderedRecordSet<T> {
    elements: Vec<T>,
    compare: Comparator<T>,
}

impl<T: TimestampedRecord> OrderedRecordSet<T> {
    /// Create an empty set ordered newest first.
    pub fn new() -> Self {
        Self::with_comparator(newest_first::<T>)
    }

    /// Build a set from elements in any order.
    ///
    /// The sort is stable, so elements already in order keep their relative
    /// position.
    pub fn from_unsorted(elements: Vec<T>) -> Self {
        let mut set = Self::new();
        set.assign(elements);
        set
    }
}

impl<T> OrderedRecordSet<T> {
    /// Create an empty set with a custom comparator.
    pub fn with_comparator(compare: Comparator<T>) -> Self {
        Self {
            elements: Vec::new(),
            compare,
        }
    }

    /// Replace the contents with `elements`, sorting them.
    pub fn assign(&mut self, mut elements: Vec<T>) {
        elements.sort_by(self.compare);
        self.elements = elements;
    }

    /// Whether `elements` already satisfies this set's comparator.
    pub fn is_ordered(&self, elements: &[T]) -> bool {
        elements
            .windows(2)
            .all(|pair| (self.compare)(&pair[0], &pair[1]) != Ordering::Greater)
    }

    /// Insert an element at the position preserving order.
    ///
    /// Equal elements keep insertion order. Returns the index used.
    pub fn insert(&mut self, element: T) -> usize {
        let compare = self.compare;
        let index = self
            .elements
            .partition_point(|existing| compare(existing, &element) != Ordering::Greater);
        self.elements.insert(index, element);
        index
    }

    /// Insert every element from an iterator.
    pub fn insert_all(&mut self, elements: impl IntoIterator<Item = T>) {
        for element in elements {
            self.insert(element);
        }
    }

    /// Keep only elements matching the predicate.
    ///
    /// Returns the number of elements removed.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.elements.len();
        self.elements.retain(keep);
        before - self.elements.len()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    /// First element in set order (the newest by default).
    pub fn newest(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Last element in set order (the oldest by default).
    pub fn oldest(&self) -> Option<&T> {
        self.elements.last()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }
}

impl<T: TimestampedRecord> OrderedRecordSet<T> {
    /// Index range of the elements whose event date lies in `interval`.
    fn clamped_range(&self, interval: &DateInterval) -> Range<usize> {
        let head = self
            .elements
            .partition_point(|e| e.event_date() > interval.end());
        let tail = head
            + self.elements[head..].partition_point(|e| e.event_date() >= interval.start());
        head..tail
    }

    /// Elements whose event date lies in the inclusive `interval`, in order.
    pub fn clamped(&self, interval: &DateInterval) -> &[T] {
        &self.elements[self.clamped_range(interval)]
    }

    /// `[oldest.date, newest.date]`, or `None` when empty.
    pub fn spanned_interval(&self) -> Option<DateInterval> {
        match (self.elements.last(), self.elements.first()) {
            (Some(oldest), Some(newest)) => {
                DateInterval::new(oldest.event_date(), newest.event_date()).ok()
            }
            _ => None,
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id() == id)
    }

    /// Remove every element whose identifier is in `ids`.
    ///
    /// Returns the number of elements removed.
    pub fn remove_ids(&mut self, ids: &HashSet<RecordId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.retain(|e| !ids.contains(e.id()))
    }
}

impl<T: TimestampedRecord + PartialEq> OrderedRecordSet<T> {
    /// Remove the first element equal to `element`.
    ///
    /// Absence is not an error. Returns whether an element was removed.
    pub fn remove(&mut self, element: &T) -> bool {
        let range = self.clamped_range(&DateInterval::instant(element.event_date()));
        let found = self.elements[range.clone()]
            .iter()
            .position(|e| e == element);
        match found {
            Some(offset) => {
                self.elements.remove(range.start + offset);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, element: &T) -> bool {
        self.clamped(&DateInterval::instant(element.event_date()))
            .iter()
            .any(|e| e == element)
    }
}

impl<T: TimestampedRecord> Default for OrderedRecordSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedRecordSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.elements.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for OrderedRecordSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<T> Extend<T> for OrderedRecordSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.insert_all(iter);
    }
}

impl<T> IntoIterator for OrderedRecordSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedRecordSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Timestamp;
    use chrono::{TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: RecordId,
        at: Timestamp,
        value: u32,
    }

    impl TimestampedRecord for Item {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn event_date(&self) -> Timestamp {
            self.at
        }
    }

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn item(id: &str, secs: i64) -> Item {
        Item {
            id: id.into(),
            at: at(secs),
            value: 0,
        }
    }

    fn ids(set: &[Item]) -> Vec<&str> {
        set.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn insert_keeps_newest_first() {
        let mut set = OrderedRecordSet::new();
        set.insert(item("a", 8));
        set.insert(item("b", 10));
        set.insert(item("c", 9));
        set.insert(item("d", 1));

        assert_eq!(ids(set.as_slice()), vec!["b", "c", "a", "d"]);
        assert_eq!(set.newest().unwrap().id, "b");
        assert_eq!(set.oldest().unwrap().id, "d");
    }

    #[test]
    fn insert_equal_dates_after_existing() {
        let mut set = OrderedRecordSet::new();
        set.insert(item("first", 5));
        let index = set.insert(item("second", 5));
        assert_eq!(index, 1);
        assert_eq!(ids(set.as_slice()), vec!["first", "second"]);
    }

    #[test]
    fn duplicates_are_inserted_not_merged() {
        let mut set = OrderedRecordSet::new();
        set.insert(item("a", 5));
        set.insert(item("a", 5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_unsorted_sorts() {
        let set = OrderedRecordSet::from_unsorted(vec![item("a", 1), item("b", 3), item("c", 2)]);
        assert_eq!(ids(set.as_slice()), vec!["b", "c", "a"]);
        assert!(set.is_ordered(set.as_slice()));
        assert!(!set.is_ordered(&[item("x", 1), item("y", 2)]));
    }

    #[test]
    fn remove_by_value() {
        let mut set = OrderedRecordSet::new();
        set.insert_all(vec![item("a", 1), item("b", 2), item("c", 2)]);

        let mut changed = item("c", 2);
        changed.value = 7;
        assert!(!set.remove(&changed), "value mismatch must not remove");

        assert!(set.remove(&item("c", 2)));
        assert!(!set.remove(&item("c", 2)), "second removal is a no-op");
        assert_eq!(ids(set.as_slice()), vec!["b", "a"]);
    }

    #[test]
    fn remove_from_empty_is_noop() {
        let mut set: OrderedRecordSet<Item> = OrderedRecordSet::new();
        assert!(!set.remove(&item("a", 1)));
        assert!(set.is_empty());
    }

    #[test]
    fn clamped_is_inclusive_and_ordered() {
        let mut set = OrderedRecordSet::new();
        for (id, secs) in [("a", 1), ("b", 3), ("c", 5), ("d", 7), ("e", 9)] {
            set.insert(item(id, secs));
        }

        let interval = DateInterval::new(at(3), at(7)).unwrap();
        assert_eq!(ids(set.clamped(&interval)), vec!["d", "c", "b"]);

        let interval = DateInterval::new(at(10), at(20)).unwrap();
        assert!(set.clamped(&interval).is_empty());

        let interval = DateInterval::starting_at(at(6));
        assert_eq!(ids(set.clamped(&interval)), vec!["e", "d"]);
    }

    #[test]
    fn spanned_interval() {
        let mut set: OrderedRecordSet<Item> = OrderedRecordSet::new();
        assert_eq!(set.spanned_interval(), None);

        set.insert(item("a", 4));
        assert_eq!(set.spanned_interval(), Some(DateInterval::instant(at(4))));

        set.insert(item("b", 9));
        set.insert(item("c", 2));
        let span = set.spanned_interval().unwrap();
        assert_eq!(span.start(), at(2));
        assert_eq!(span.end(), at(9));
    }

    #[test]
    fn remove_ids_and_contains() {
        let mut set = OrderedRecordSet::new();
        set.insert_all(vec![item("a", 1), item("b", 2), item("a", 3)]);
        assert!(set.contains_id("a"));
        assert!(set.contains(&item("b", 2)));

        let ids_to_remove: HashSet<RecordId> = ["a".to_string()].into_iter().collect();
        assert_eq!(set.remove_ids(&ids_to_remove), 2);
        assert!(!set.contains_id("a"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn custom_comparator_breaks_ties() {
        fn newest_then_id(a: &Item, b: &Item) -> Ordering {
            newest_first(a, b).then_with(|| a.id.cmp(&b.id))
        }

        let mut set = OrderedRecordSet::with_comparator(newest_then_id);
        set.insert(item("z", 5));
        set.insert(item("a", 5));
        set.insert(item("m", 6));
        assert_eq!(ids(set.as_slice()), vec!["m", "a", "z"]);
    }
}
