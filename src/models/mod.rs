//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod actor;
mod attendance;
mod audit;
mod compensation;
mod deduction_rule;
mod employee;
mod override_request;
mod payroll;
mod period;
mod tenure;

pub use actor::{Actor, Role};
pub use attendance::{
    AttendanceDecision, AttendanceStatus, Classification, DayOutcome, DeductionType, Holiday,
    LeaveRecord, LeaveType, RawAttendance, TimeCorrection,
};
pub use audit::{AuditStep, AuditTrace};
pub use compensation::EmployeeCompensation;
pub use deduction_rule::{DeductionBasis, PayrollDeductionRule};
pub use employee::{Employee, EmployeeStatus, EmployeeType};
pub use override_request::{
    AttendanceOverride, OverrideRequest, OverrideResolution, OverrideStatus,
};
pub use payroll::{
    AdditionCode, PayrollAddition, PayrollBatch, PayrollRow, PayrollRowAddition,
    PayrollRowDeduction, RuleSnapshot,
};
pub use period::{Company, PayrollPeriod, PayrollState};
pub use tenure::EmployeeTenure;
