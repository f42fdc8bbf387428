//! Calculation logic for the attendance engine.
//!
//! This module contains the resolution rules: nursing schedule adjustment,
//! leave precedence, real-time punch classification, lateness, overtime and
//! worked time, outcome code derivation, and the daily record synthesis that
//! combines them.

mod clock;
mod daily_attendance;
mod lateness;
mod leave_resolution;
mod outcome_code;
mod overtime;
mod punch_classification;
mod schedule_adjustment;

pub use clock::{elapsed_minutes, shift_minutes, signed_minutes};
pub use daily_attendance::{AttendanceInput, calculate_daily_attendance};
pub use lateness::{LatenessResult, calculate_lateness};
pub use leave_resolution::{LeaveOverride, LeaveResolution, resolve_leave};
pub use outcome_code::{OutcomeDerivation, derive_outcome};
pub use overtime::{OvertimeResult, WorkedTimeResult, calculate_overtime, calculate_worked_time};
pub use punch_classification::{PunchClassification, classify_punch};
pub use schedule_adjustment::{AdjustedSchedule, adjust_schedule};
