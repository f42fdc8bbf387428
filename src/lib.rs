//! Attendance Resolution Engine
//!
//! This crate turns raw biometric time-clock punches into one authoritative
//! daily attendance record per job assignment. It applies nursing-time
//! schedule adjustments, leave precedence, tolerance-based lateness,
//! overtime and worked time, and derives the day's outcome code with an
//! audit trail explaining every step.
//!
//! Around the pure resolution core the crate provides a storage seam, a
//! batch driver for date ranges, device ingest with a bounded worker pool,
//! and an HTTP API.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod store;
