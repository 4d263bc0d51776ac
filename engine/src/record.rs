//! The record capability the reconciler operates on.

use crate::{RecordId, Timestamp};
use std::fmt;

/// An identifiable value that logically occurred at a point in time.
///
/// The identifier is opaque and only ever compared for equality. The event
/// date is when the record happened, not when it was observed or written.
pub trait TimestampedRecord {
    /// Stable identifier of the record.
    fn id(&self) -> &RecordId;

    /// When the record logically occurred.
    fn event_date(&self) -> Timestamp;
}

impl<T: TimestampedRecord + ?Sized> TimestampedRecord for &T {
    fn id(&self) -> &RecordId {
        (**self).id()
    }

    fn event_date(&self) -> Timestamp {
        (**self).event_date()
    }
}

/// The kinds of records mirrored from the remote service.
///
/// Each kind gets its own journal so they never contend with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    GlucoseEntry,
    Treatment,
    Profile,
    DeviceStatus,
}

impl RecordKind {
    /// All record kinds, in a stable order.
    pub const ALL: [RecordKind; 4] = [
        RecordKind::GlucoseEntry,
        RecordKind::Treatment,
        RecordKind::Profile,
        RecordKind::DeviceStatus,
    ];

    /// Name of the remote collection holding this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::GlucoseEntry => "entries",
            RecordKind::Treatment => "treatments",
            RecordKind::Profile => "profile",
            RecordKind::DeviceStatus => "devicestatus",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}
