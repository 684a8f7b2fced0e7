//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions: working-day counting,
//! base salary proration, deduction rules, withholding tax, the per-employee
//! pay chain that combines them, and THR.

mod deduction;
mod employee_pay;
mod money;
mod proration;
mod tax;
mod thr;
mod working_days;

pub use deduction::{DeductionResult, apply_deduction_rule, deduction_basis_amount};
pub use employee_pay::{EmployeePay, EmployeePayInput, calculate_employee_pay};
pub use money::{CURRENCY_SCALE, checked_ratio, checked_sum, round_currency, round_to};
pub use proration::{ProrationResult, prorate_base_salary};
pub use tax::{TaxResult, calculate_withholding, tax_category};
pub use thr::{ThrBatchEntry, ThrInput, ThrMethod, ThrResult, calculate_thr, calculate_thr_batch};
pub use working_days::{WorkingDaysResult, count_working_days};
