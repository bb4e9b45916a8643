//! # Device Record Table
//!
//! Keeps the latest Config, State and DeviceInfo record per battery pack.
//! Entries are created on the first record for an unseen device id and are
//! never removed. An optional [`RecordSink`] is notified after every update,
//! which is where publishing integrations plug in.
//!
//! The table is owned by the pipeline; other readers take a
//! [`DeviceTable::snapshot`] instead of sharing the live value.

use crate::record::{ConfigRecord, DeviceInfoRecord, Record, StateRecord};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Receives every record accepted by the table.
pub trait RecordSink {
    fn publish(&mut self, device_id: u8, record: &Record);
}

/// Logs each record as a single JSON line at `info` level.
#[derive(Debug, Default)]
pub struct JsonLogSink;

impl RecordSink for JsonLogSink {
    fn publish(&mut self, device_id: u8, record: &Record) {
        match serde_json::to_string(record) {
            Ok(json) => info!("device {device_id}: {json}"),
            Err(e) => debug!("device {device_id}: record not serialisable: {e}"),
        }
    }
}

/// Latest records of one pack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceEntry {
    pub config: Option<ConfigRecord>,
    pub state: Option<StateRecord>,
    pub info: Option<DeviceInfoRecord>,
    pub first_seen: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl DeviceEntry {
    fn new(now: DateTime<Utc>) -> Self {
        DeviceEntry {
            config: None,
            state: None,
            info: None,
            first_seen: now,
            last_updated: now,
        }
    }

    fn replace(&mut self, record: Record, now: DateTime<Utc>) {
        match record {
            Record::Config(config) => self.config = Some(config),
            Record::State(state) => self.state = Some(state),
            Record::DeviceInfo(info) => self.info = Some(info),
        }
        self.last_updated = now;
    }
}

/// Device id to [`DeviceEntry`] mapping.
#[derive(Default)]
pub struct DeviceTable {
    entries: BTreeMap<u8, DeviceEntry>,
    sink: Option<Box<dyn RecordSink + Send>>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table that forwards every accepted record to `sink`.
    pub fn with_sink(sink: Box<dyn RecordSink + Send>) -> Self {
        DeviceTable {
            entries: BTreeMap::new(),
            sink: Some(sink),
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn RecordSink + Send>) {
        self.sink = Some(sink);
    }

    /// Stores `record` in the slot of its kind for `device_id`.
    pub fn upsert(&mut self, device_id: u8, record: Record) {
        let now = Utc::now();
        let entry = self.entries.entry(device_id).or_insert_with(|| {
            info!("New pack: device {device_id}");
            DeviceEntry::new(now)
        });

        if let Some(sink) = self.sink.as_mut() {
            entry.replace(record.clone(), now);
            sink.publish(device_id, &record);
        } else {
            entry.replace(record, now);
        }
    }

    pub fn get(&self, device_id: u8) -> Option<&DeviceEntry> {
        self.entries.get(&device_id)
    }

    pub fn contains(&self, device_id: u8) -> bool {
        self.entries.contains_key(&device_id)
    }

    pub fn device_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy of every entry, ordered by device id.
    pub fn snapshot(&self) -> BTreeMap<u8, DeviceEntry> {
        self.entries.clone()
    }
}

impl fmt::Debug for DeviceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceTable")
            .field("entries", &self.entries)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
