//! Employee model.
//!
//! This module defines the Employee struct used to map time-clock user ids
//! onto the people whose attendance is resolved.

use serde::{Deserialize, Serialize};

/// Width time clocks pad national identity numbers to.
pub const DNI_WIDTH: usize = 8;

/// Represents an employee whose punches are resolved into daily records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: u64,
    /// National identity number, also the user id enrolled on time clocks.
    pub dni: String,
    /// The employee's display name.
    #[serde(default)]
    pub full_name: String,
}

impl Employee {
    /// Normalizes a raw time-clock user id into a DNI.
    ///
    /// Devices drop leading zeros from numeric ids, so short ids are
    /// left-padded with zeros to [`DNI_WIDTH`] characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::models::Employee;
    ///
    /// assert_eq!(Employee::normalize_dni("4512783"), "04512783");
    /// assert_eq!(Employee::normalize_dni(" 40123456 "), "40123456");
    /// ```
    pub fn normalize_dni(raw: &str) -> String {
        format!("{:0>width$}", raw.trim(), width = DNI_WIDTH)
    }
}
