//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints that drive a payroll period through
//! its lifecycle, plus a stateless THR calculator.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ActorRequest, AddAdditionRequest, CreatePeriodRequest, RequestOverrideRequest,
    ResolveOverrideRequest, ThrAdditionRequest, ThrBulkRequest, ThrCalculationRequest,
};
pub use response::{ApiError, ApiErrorResponse, PeriodSnapshot};
pub use state::AppState;
