//! Configuration loading and management for the attendance engine.
//!
//! This module loads the leave-type code mapping, the device polling
//! settings and the list of time clocks from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Vacation code: {}", config.leave_codes().vacation);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DEFAULT_DEVICE_PORT, DeviceConfig, DevicesFile, EngineConfig, EngineFile, LeaveCodes,
    SyncConfig,
};
