//! Error types for the Attendance Resolution Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur outside the pure resolution core:
//! configuration loading, store access, batch sweeps and device ingest.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Attendance Resolution Engine.
///
/// The resolution core itself is infallible; every fallible operation around
/// it (configuration, persistence, device polling) returns this error type.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration field '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// No calendar entry exists for the requested date.
    #[error("No calendar day configured for {date}")]
    CalendarDayMissing {
        /// The date without a calendar entry.
        date: NaiveDate,
    },

    /// A date range was given with its start after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// The requested start date.
        start: NaiveDate,
        /// The requested end date.
        end: NaiveDate,
    },

    /// A leave grant could not be interpreted.
    #[error("Invalid leave grant {grant_id}: {message}")]
    InvalidLeave {
        /// The identifier of the rejected grant.
        grant_id: u64,
        /// A description of the problem.
        message: String,
    },

    /// The backing store failed to read or write.
    #[error("Store error: {message}")]
    Store {
        /// A description of the store failure.
        message: String,
    },

    /// A device could not be reached after all retry attempts.
    #[error("Device '{device_id}' unreachable after {attempts} attempts")]
    DeviceUnreachable {
        /// The device identifier.
        device_id: String,
        /// How many connection attempts were made.
        attempts: u32,
    },

    /// A single fetch from a device failed.
    #[error("Fetch from device '{device_id}' failed: {message}")]
    DeviceFetch {
        /// The device identifier.
        device_id: String,
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
