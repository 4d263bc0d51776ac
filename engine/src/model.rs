//! Domain records mirrored from the remote service.
//!
//! Only the identifier and event-date fields are mapped precisely; the rest
//! of each record is carried through as received. Glucose values stay in
//! mg/dL.

use crate::{RecordId, RecordKind, Timestamp, TimestampedRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of glucose entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Sensor glucose value
    Sgv,
    /// Meter (fingerstick) blood glucose
    Mbg,
    /// Sensor calibration
    Cal,
}

/// A glucose reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseEntry {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: Timestamp,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sgv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mbg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl GlucoseEntry {
    /// A sensor glucose value in mg/dL.
    pub fn sensor(id: impl Into<RecordId>, date: Timestamp, mg_dl: f64) -> Self {
        Self {
            id: id.into(),
            date,
            entry_type: EntryType::Sgv,
            sgv: Some(mg_dl),
            mbg: None,
            direction: None,
            device: None,
        }
    }
}

impl TimestampedRecord for GlucoseEntry {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn event_date(&self) -> Timestamp {
        self.date
    }
}

/// A care event: bolus, carbs, temp basal, note, and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "created_at")]
    pub created_at: Timestamp,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insulin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entered_by: Option<String>,
}

impl Treatment {
    pub fn new(
        id: impl Into<RecordId>,
        created_at: Timestamp,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            event_type: event_type.into(),
            insulin: None,
            carbs: None,
            notes: None,
            entered_by: None,
        }
    }
}

impl TimestampedRecord for Treatment {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn event_date(&self) -> Timestamp {
        self.created_at
    }
}

/// A set of therapy profiles effective from `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSet {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub start_date: Timestamp,
    pub default_profile: String,
    /// Named profiles, kept as received.
    #[serde(default)]
    pub store: BTreeMap<String, serde_json::Value>,
}

impl TimestampedRecord for ProfileSet {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn event_date(&self) -> Timestamp {
        self.start_date
    }
}

/// Controller-specific status payload of a device status record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatusReport {
    Loop(serde_json::Value),
    #[serde(rename = "openaps")]
    OpenAps(serde_json::Value),
}

/// A status report uploaded by a closed-loop controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub created_at: Timestamp,
    pub device: String,
    #[serde(flatten)]
    pub report: DeviceStatusReport,
}

impl TimestampedRecord for DeviceStatus {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn event_date(&self) -> Timestamp {
        self.created_at
    }
}

/// Associates a record type with the kind of remote collection holding it.
pub trait KindedRecord: TimestampedRecord {
    const KIND: RecordKind;
}

impl KindedRecord for GlucoseEntry {
    const KIND: RecordKind = RecordKind::GlucoseEntry;
}

impl KindedRecord for Treatment {
    const KIND: RecordKind = RecordKind::Treatment;
}

impl KindedRecord for ProfileSet {
    const KIND: RecordKind = RecordKind::Profile;
}

impl KindedRecord for DeviceStatus {
    const KIND: RecordKind = RecordKind::DeviceStatus;
}
