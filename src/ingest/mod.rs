//! Device ingest.
//!
//! Polls time clocks through a [`DeviceSource`], drops punches that were
//! already stored or fall at or before the device's last synced punch, labels
//! new ones with the real-time classifier and writes them to a
//! [`PunchLedger`].
//!
//! Devices are polled by a bounded worker pool: one task per device, at most
//! `max_workers` running at once. Each fetch is retried `max_retries` times
//! with a fixed pause. Workers report through [`SyncEvent`]s to a single
//! aggregator that owns the [`SyncReport`].

mod context;
mod events;

use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{DeviceConfig, SyncConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PunchClass, PunchKind};
use crate::store::{IngestedPunch, PunchLedger};

pub use context::{PunchContext, classify_in_context};
pub use events::{DeviceStats, SyncEvent, SyncReport, aggregate};

const EVENT_BUFFER: usize = 256;

/// A punch as reported by a device, before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    /// The user id enrolled on the device.
    pub user_id: String,
    /// When the punch was recorded.
    pub timestamp: NaiveDateTime,
}

/// A connection to time clocks.
///
/// Implementations speak the device protocol; this crate only drives them.
pub trait DeviceSource: Send + Sync {
    /// Fetches every punch currently held by the device.
    fn fetch_punches(
        &self,
        device: &DeviceConfig,
    ) -> impl Future<Output = EngineResult<Vec<RawPunch>>> + Send;
}

/// Polls every device and stores the new punches.
///
/// A device that keeps failing is reported in
/// [`SyncReport::failed_devices`] and does not affect the others.
pub async fn sync_devices<D, L>(
    source: Arc<D>,
    ledger: Arc<L>,
    config: &SyncConfig,
    devices: &[DeviceConfig],
) -> SyncReport
where
    D: DeviceSource + 'static,
    L: PunchLedger + 'static,
{
    info!(
        devices = devices.len(),
        max_workers = config.max_workers,
        "Starting device sync"
    );

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let aggregator = tokio::spawn(aggregate(rx));

    let permits = Arc::new(Semaphore::new(config.max_workers.max(1)));
    let mut workers = JoinSet::new();

    for device in devices {
        let source = Arc::clone(&source);
        let ledger = Arc::clone(&ledger);
        let permits = Arc::clone(&permits);
        let events = tx.clone();
        let device = device.clone();
        let config = config.clone();

        workers.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            sync_device(source.as_ref(), ledger.as_ref(), &config, &device, &events).await;
        });
    }
    drop(tx);

    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            error!(error = %err, "Device worker panicked");
        }
    }

    let report = match aggregator.await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "Sync aggregator stopped unexpectedly");
            SyncReport::default()
        }
    };

    info!(
        fetched = report.fetched,
        inserted = report.inserted,
        duplicates = report.duplicates,
        errors = report.errors,
        failed_devices = report.failed_devices.len(),
        "Device sync completed"
    );
    report
}

async fn sync_device<D, L>(
    source: &D,
    ledger: &L,
    config: &SyncConfig,
    device: &DeviceConfig,
    events: &mpsc::Sender<SyncEvent>,
) where
    D: DeviceSource,
    L: PunchLedger,
{
    let punches = match fetch_with_retry(source, config, device).await {
        Ok(punches) => punches,
        Err(err) => {
            error!(device_id = %device.id, error = %err, "Device sync failed");
            send(
                events,
                SyncEvent::DeviceFailed {
                    device_id: device.id.clone(),
                    reason: err.to_string(),
                },
            )
            .await;
            return;
        }
    };

    info!(device_id = %device.id, punches = punches.len(), "Fetched punches");
    send(
        events,
        SyncEvent::Fetched {
            device_id: device.id.clone(),
            count: punches.len(),
        },
    )
    .await;

    let cutoff = match ledger.last_synced(&device.id) {
        Ok(cutoff) => cutoff,
        Err(err) => {
            warn!(
                device_id = %device.id,
                error = %err,
                "Could not read last synced punch, checking punches one by one"
            );
            None
        }
    };
    if let Some(cutoff) = cutoff {
        debug!(device_id = %device.id, cutoff = %cutoff, "Skipping punches up to last sync");
    }

    for raw in punches {
        let event = store_punch(ledger, device, cutoff, raw);
        send(events, event).await;
    }
}

/// Fetches from a device, retrying with a fixed pause.
async fn fetch_with_retry<D: DeviceSource>(
    source: &D,
    config: &SyncConfig,
    device: &DeviceConfig,
) -> EngineResult<Vec<RawPunch>> {
    let attempts = config.max_retries.max(1);

    for attempt in 1..=attempts {
        debug!(
            device_id = %device.id,
            ip = %device.ip,
            port = device.port,
            attempt,
            "Connecting to device"
        );

        let fetch = source.fetch_punches(device);
        let outcome = match tokio::time::timeout(config.timeout(), fetch).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::DeviceFetch {
                device_id: device.id.clone(),
                message: format!("timed out after {}s", config.timeout_secs),
            }),
        };

        match outcome {
            Ok(punches) => return Ok(punches),
            Err(err) => {
                warn!(
                    device_id = %device.id,
                    attempt,
                    max_retries = attempts,
                    error = %err,
                    "Device fetch failed"
                );
                if attempt < attempts {
                    tokio::time::sleep(config.retry_delay()).await;
                }
            }
        }
    }

    Err(EngineError::DeviceUnreachable {
        device_id: device.id.clone(),
        attempts,
    })
}

fn store_punch<L: PunchLedger>(
    ledger: &L,
    device: &DeviceConfig,
    cutoff: Option<NaiveDateTime>,
    raw: RawPunch,
) -> SyncEvent {
    let dni = Employee::normalize_dni(&raw.user_id);

    match try_store_punch(ledger, device, cutoff, &dni, raw.timestamp) {
        Ok(Some(classification)) => SyncEvent::Inserted {
            device_id: device.id.clone(),
            timestamp: raw.timestamp,
            classification,
        },
        Ok(None) => {
            debug!(
                device_id = %device.id,
                dni = %dni,
                timestamp = %raw.timestamp,
                "Duplicate punch skipped"
            );
            SyncEvent::Duplicate {
                device_id: device.id.clone(),
                timestamp: raw.timestamp,
            }
        }
        Err(err) => {
            error!(device_id = %device.id, dni = %dni, error = %err, "Failed to store punch");
            SyncEvent::PunchFailed {
                device_id: device.id.clone(),
                dni,
                reason: err.to_string(),
            }
        }
    }
}

/// Returns `None` for duplicates, or the label of the stored punch.
///
/// A punch at or before the device's last synced timestamp counts as a
/// duplicate without a lookup.
fn try_store_punch<L: PunchLedger>(
    ledger: &L,
    device: &DeviceConfig,
    cutoff: Option<NaiveDateTime>,
    dni: &str,
    timestamp: NaiveDateTime,
) -> EngineResult<Option<Option<PunchClass>>> {
    if cutoff.is_some_and(|cutoff| timestamp <= cutoff)
        || ledger.punch_exists(dni, timestamp, &device.id)?
    {
        return Ok(None);
    }

    let context = classify_in_context(ledger, dni, timestamp)?;
    let punch = IngestedPunch {
        dni: dni.to_string(),
        employee_id: context.employee_id,
        timestamp,
        device_id: device.id.clone(),
        kind: context
            .classification
            .map(PunchKind::from)
            .unwrap_or_default(),
        classification: context.classification,
    };
    ledger.insert_punch(&punch)?;

    Ok(Some(context.classification))
}

async fn send(events: &mpsc::Sender<SyncEvent>, event: SyncEvent) {
    if events.send(event).await.is_err() {
        warn!("Sync aggregator is gone, event dropped");
    }
}
