//! Sync events and the aggregator that folds them into a report.
//!
//! Device workers never touch shared counters. They send [`SyncEvent`]s over
//! an mpsc channel and a single aggregator task owns the [`SyncReport`].

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::PunchClass;

/// Something that happened while syncing a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A device returned its punch list.
    Fetched {
        /// The device polled.
        device_id: String,
        /// How many punches it returned.
        count: usize,
    },
    /// A punch was stored.
    Inserted {
        /// The device the punch came from.
        device_id: String,
        /// When the punch was recorded.
        timestamp: NaiveDateTime,
        /// Its real-time label, if any.
        classification: Option<PunchClass>,
    },
    /// A punch was already stored and was skipped.
    Duplicate {
        /// The device the punch came from.
        device_id: String,
        /// When the punch was recorded.
        timestamp: NaiveDateTime,
    },
    /// A single punch could not be stored.
    PunchFailed {
        /// The device the punch came from.
        device_id: String,
        /// The puncher's DNI.
        dni: String,
        /// Why it failed.
        reason: String,
    },
    /// A device could not be fetched after every attempt.
    DeviceFailed {
        /// The device polled.
        device_id: String,
        /// The last error seen.
        reason: String,
    },
}

/// Counters kept per device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStats {
    /// Punches returned by the device.
    pub fetched: usize,
    /// Punches handled (inserted, duplicate or failed).
    pub processed: usize,
    /// Punches stored.
    pub inserted: usize,
    /// Punches skipped as already stored.
    pub duplicates: usize,
    /// Punches that could not be stored.
    pub errors: usize,
    /// Timestamp of the most recent punch seen, stored or duplicate.
    pub last_punch: Option<NaiveDateTime>,
}

impl DeviceStats {
    fn observe(&mut self, timestamp: NaiveDateTime) {
        if self.last_punch.is_none_or(|last| timestamp > last) {
            self.last_punch = Some(timestamp);
        }
    }
}

/// The outcome of one sync run across every device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Punches returned by all devices.
    pub fetched: usize,
    /// Punches stored.
    pub inserted: usize,
    /// Punches skipped as already stored.
    pub duplicates: usize,
    /// Punches that could not be stored.
    pub errors: usize,
    /// Stored punches per real-time label.
    pub by_class: BTreeMap<PunchClass, usize>,
    /// Stored punches that got no label.
    pub unclassified: usize,
    /// Counters per device.
    pub devices: BTreeMap<String, DeviceStats>,
    /// Devices that exhausted their retries, with the last error.
    pub failed_devices: BTreeMap<String, String>,
}

impl SyncReport {
    /// Folds one event into the counters.
    pub fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Fetched { device_id, count } => {
                self.fetched += count;
                self.devices.entry(device_id).or_default().fetched += count;
            }
            SyncEvent::Inserted {
                device_id,
                timestamp,
                classification,
            } => {
                self.inserted += 1;
                match classification {
                    Some(class) => *self.by_class.entry(class).or_default() += 1,
                    None => self.unclassified += 1,
                }

                let stats = self.devices.entry(device_id).or_default();
                stats.processed += 1;
                stats.inserted += 1;
                stats.observe(timestamp);
            }
            SyncEvent::Duplicate {
                device_id,
                timestamp,
            } => {
                self.duplicates += 1;
                let stats = self.devices.entry(device_id).or_default();
                stats.processed += 1;
                stats.duplicates += 1;
                stats.observe(timestamp);
            }
            SyncEvent::PunchFailed { device_id, .. } => {
                self.errors += 1;
                let stats = self.devices.entry(device_id).or_default();
                stats.processed += 1;
                stats.errors += 1;
            }
            SyncEvent::DeviceFailed { device_id, reason } => {
                self.devices.entry(device_id.clone()).or_default();
                self.failed_devices.insert(device_id, reason);
            }
        }
    }

    /// Number of devices that were fetched successfully.
    pub fn devices_succeeded(&self) -> usize {
        self.devices.len() - self.failed_devices.len()
    }
}

/// Receives events until every sender is dropped, then returns the report.
pub async fn aggregate(mut events: mpsc::Receiver<SyncEvent>) -> SyncReport {
    let mut report = SyncReport::default();
    while let Some(event) = events.recv().await {
        report.apply(event);
    }
    report
}
