//! Lifecycle operations on payroll periods.
//!
//! Each operation takes the store mutably, checks the period against the
//! [`PeriodStateMachine`] and applies its changes inside one
//! [`PayrollStore::transaction`](crate::store::PayrollStore::transaction).

mod additions;
mod decisions;
mod finalization;
mod overrides;
mod payroll_run;
mod periods;
mod state_machine;

pub use additions::{
    NewAddition, ThrAddition, ThrBulkError, ThrBulkSummary, ThrOptions, add_payroll_addition,
    create_thr_addition, create_thr_additions_bulk, preview_thr,
};
pub use decisions::{GenerationSummary, classify_day, generate_decisions};
pub use finalization::{FinalizationOutput, finalize_period};
pub use overrides::{OverrideOutcome, request_override, resolve_override};
pub use payroll_run::{FailurePolicy, PayrollRunOutput, RunFailure, SkippedEmployee, run_payroll};
pub use periods::{create_period, submit_for_review};
pub use state_machine::{
    ActionRule, CompanyAction, CompanyRule, PeriodAction, PeriodFacts, PeriodStateMachine,
    Precondition, require_role,
};
