//! Configuration types for attendance resolution and device ingest.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::LeaveKind;

/// Default TCP port time clocks listen on.
pub const DEFAULT_DEVICE_PORT: u16 = 4370;

/// Leave-type codes that map onto the closed set of leave kinds.
///
/// Any code not listed here is treated as other paid leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCodes {
    /// Code of vacation grants.
    pub vacation: String,
    /// Code of unpaid assignment-scoped leave.
    pub unpaid_by_assignment: String,
    /// Code of nursing-time grants.
    pub nursing: String,
}

impl Default for LeaveCodes {
    fn default() -> Self {
        Self {
            vacation: "VACACIONES".to_string(),
            unpaid_by_assignment: "LSG".to_string(),
            nursing: "LACTANCIA".to_string(),
        }
    }
}

impl LeaveCodes {
    /// Maps a leave-type code onto a [`LeaveKind`].
    ///
    /// Unpaid assignment-scoped leave must name its governing assignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::config::LeaveCodes;
    /// use attendance_engine::models::LeaveKind;
    ///
    /// let codes = LeaveCodes::default();
    /// assert_eq!(codes.kind_for(1, "VACACIONES", None).unwrap(), LeaveKind::Vacation);
    /// assert_eq!(
    ///     codes.kind_for(2, "LSG", Some(7)).unwrap(),
    ///     LeaveKind::UnpaidLeaveByAssignment { governing_assignment_id: 7 }
    /// );
    /// assert!(codes.kind_for(3, "LSG", None).is_err());
    /// ```
    pub fn kind_for(
        &self,
        grant_id: u64,
        type_code: &str,
        governing_assignment_id: Option<u64>,
    ) -> EngineResult<LeaveKind> {
        let code = type_code.trim();
        if code.is_empty() {
            return Err(EngineError::InvalidLeave {
                grant_id,
                message: "leave type code is empty".to_string(),
            });
        }

        if code == self.vacation {
            Ok(LeaveKind::Vacation)
        } else if code == self.nursing {
            Ok(LeaveKind::NursingTime)
        } else if code == self.unpaid_by_assignment {
            governing_assignment_id
                .map(|id| LeaveKind::UnpaidLeaveByAssignment {
                    governing_assignment_id: id,
                })
                .ok_or_else(|| EngineError::InvalidLeave {
                    grant_id,
                    message: format!("{} leave requires a governing assignment", code),
                })
        } else {
            Ok(LeaveKind::OtherPaidLeave {
                type_code: code.to_string(),
            })
        }
    }
}

/// Settings for the device polling worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Maximum number of devices polled at the same time.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Attempts per device before it is reported as failed.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Fixed pause between attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Connection timeout handed to device sources, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_workers() -> usize {
    4
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SyncConfig {
    /// The pause between attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The connection timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A time clock to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Identifier stored with every punch fetched from the device.
    pub id: String,
    /// Network address of the device.
    pub ip: String,
    /// TCP port of the device.
    #[serde(default = "default_device_port")]
    pub port: u16,
}

fn default_device_port() -> u16 {
    DEFAULT_DEVICE_PORT
}

/// The engine.yaml file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineFile {
    /// Leave-type code mapping.
    #[serde(default)]
    pub leave_codes: LeaveCodes,
    /// Device polling settings.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// The devices.yaml file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesFile {
    /// Devices to poll.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    leave_codes: LeaveCodes,
    sync: SyncConfig,
    devices: Vec<DeviceConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(leave_codes: LeaveCodes, sync: SyncConfig, devices: Vec<DeviceConfig>) -> Self {
        Self {
            leave_codes,
            sync,
            devices,
        }
    }

    /// Returns the leave-type code mapping.
    pub fn leave_codes(&self) -> &LeaveCodes {
        &self.leave_codes
    }

    /// Returns the device polling settings.
    pub fn sync(&self) -> &SyncConfig {
        &self.sync
    }

    /// Returns the configured devices.
    pub fn devices(&self) -> &[DeviceConfig] {
        &self.devices
    }
}
