//! HTTP API module for the supplement engine.
//!
//! This module provides the REST endpoint that turns timesheet events into
//! payroll lines under the server's agreement settings.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalculationRequest, EventRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
