//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{DeviceConfig, DevicesFile, EngineConfig, EngineFile, LeaveCodes, SyncConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml   # Leave-type codes and sync settings
/// └── devices.yaml  # Time clocks to poll
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// println!("Polling {} devices", loader.devices().len());
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - A value is unusable (no workers, no attempts, blank or clashing
    ///   leave codes, duplicate device ids)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let engine = Self::load_yaml::<EngineFile>(&path.join("engine.yaml"))?;
        let devices = Self::load_yaml::<DevicesFile>(&path.join("devices.yaml"))?;

        Self::from_parts(engine.leave_codes, engine.sync, devices.devices)
    }

    /// Builds a validated configuration from already-parsed parts.
    pub fn from_parts(
        leave_codes: LeaveCodes,
        sync: SyncConfig,
        devices: Vec<DeviceConfig>,
    ) -> EngineResult<Self> {
        Self::validate_leave_codes(&leave_codes)?;
        Self::validate_sync(&sync)?;
        Self::validate_devices(&devices)?;

        Ok(Self {
            config: EngineConfig::new(leave_codes, sync, devices),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_leave_codes(codes: &LeaveCodes) -> EngineResult<()> {
        let fields = [
            ("leave_codes.vacation", &codes.vacation),
            ("leave_codes.unpaid_by_assignment", &codes.unpaid_by_assignment),
            ("leave_codes.nursing", &codes.nursing),
        ];

        let mut seen = HashSet::new();
        for (field, code) in fields {
            if code.trim().is_empty() {
                return Err(invalid(field, "must not be blank"));
            }
            if !seen.insert(code.trim()) {
                return Err(invalid(field, format!("code '{}' is used twice", code)));
            }
        }
        Ok(())
    }

    fn validate_sync(sync: &SyncConfig) -> EngineResult<()> {
        if sync.max_workers == 0 {
            return Err(invalid("sync.max_workers", "must be at least 1"));
        }
        if sync.max_retries == 0 {
            return Err(invalid("sync.max_retries", "must be at least 1"));
        }
        Ok(())
    }

    fn validate_devices(devices: &[DeviceConfig]) -> EngineResult<()> {
        let mut ids = HashSet::new();
        for device in devices {
            if device.id.trim().is_empty() {
                return Err(invalid("devices.id", "must not be blank"));
            }
            if !ids.insert(device.id.as_str()) {
                return Err(invalid(
                    "devices.id",
                    format!("duplicate device id '{}'", device.id),
                ));
            }
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the leave-type code mapping.
    pub fn leave_codes(&self) -> &LeaveCodes {
        self.config.leave_codes()
    }

    /// Returns the device polling settings.
    pub fn sync(&self) -> &SyncConfig {
        self.config.sync()
    }

    /// Returns the configured devices.
    pub fn devices(&self) -> &[DeviceConfig] {
        self.config.devices()
    }
}

fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.into(),
    }
}
