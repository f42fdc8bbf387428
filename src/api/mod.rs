//! HTTP API module for the attendance engine.
//!
//! This module provides the REST endpoints for resolving a single day from
//! a posted snapshot and for classifying a punch in real time.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ClassifyRequest, LeaveRequest, PunchRequest, ResolveRequest};
pub use response::{ApiError, ApiErrorResponse, ClassifyResponse};
pub use state::AppState;
