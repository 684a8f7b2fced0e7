//! The payroll run executed by finalize.
//!
//! Two failure modes stay distinct: missing period or company context aborts
//! the whole run, while an employee without active compensation is skipped.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::calculation::{EmployeePayInput, calculate_employee_pay, checked_sum};
use crate::config::TaxConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollBatch, PayrollRow};
use crate::store::PayrollStore;

/// What a run does when it meets a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run and roll back the enclosing transaction.
    Abort,
    /// Leave the employee out and continue.
    Skip,
}

/// Failures a run can meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunFailure {
    /// The batch refers to a period that does not exist.
    MissingPeriodContext,
    /// The period refers to a company that does not exist.
    MissingCompanyContext,
    /// The employee has no active compensation.
    MissingCompensation,
}

impl RunFailure {
    /// The policy applied to this failure.
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Self::MissingPeriodContext | Self::MissingCompanyContext => FailurePolicy::Abort,
            Self::MissingCompensation => FailurePolicy::Skip,
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::MissingPeriodContext => "PayrollBatch must have a valid PayrollPeriod",
            Self::MissingCompanyContext => "PayrollPeriod must be associated with a Company",
            Self::MissingCompensation => "Employee has no active compensation",
        }
    }

    fn into_error(self) -> EngineError {
        EngineError::MissingContext {
            message: self.message().to_string(),
        }
    }
}

/// An employee left out of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEmployee {
    /// The employee.
    pub employee_id: String,
    /// Why the employee was left out.
    pub reason: RunFailure,
}

/// Rows produced by a run, not yet persisted.
#[derive(Debug, Clone, Default)]
pub struct PayrollRunOutput {
    /// One row per computed employee.
    pub rows: Vec<PayrollRow>,
    /// Employees that were skipped.
    pub skipped: Vec<SkippedEmployee>,
}

impl PayrollRunOutput {
    /// Sum of the rows' net amounts.
    ///
    /// # Errors
    ///
    /// `CalculationError` if the total overflows.
    pub fn total_net(&self) -> EngineResult<Decimal> {
        checked_sum(self.rows.iter().map(|r| r.net_amount))
            .ok_or_else(|| EngineError::overflow("batch total"))
    }
}

/// Computes one row per ACTIVE employee of the batch's company.
///
/// Deduction rules are those active on `as_of`.
///
/// # Errors
///
/// - `MissingContext` if the batch's period or the period's company is missing
/// - Tax table errors from the per-employee calculation
pub fn run_payroll(
    store: &PayrollStore,
    batch: &PayrollBatch,
    tax: &TaxConfig,
    as_of: NaiveDate,
) -> EngineResult<PayrollRunOutput> {
    let period = store
        .periods
        .get(&batch.period_id)
        .ok_or_else(|| RunFailure::MissingPeriodContext.into_error())?;
    let company = store
        .company(&period.company_id)
        .map_err(|_| RunFailure::MissingCompanyContext.into_error())?;

    let deduction_rules = store.active_deduction_rules(&company.id, as_of);
    let mut output = PayrollRunOutput::default();

    for employee in store
        .company_employees(&company.id)
        .filter(|e| e.is_active())
    {
        let Some(compensation) = store.active_compensation(&employee.id) else {
            let failure = RunFailure::MissingCompensation;
            if failure.policy() == FailurePolicy::Abort {
                return Err(failure.into_error());
            }
            warn!(
                employee_id = %employee.id,
                period_id = %period.id,
                "Skipping employee without active compensation"
            );
            output.skipped.push(SkippedEmployee {
                employee_id: employee.id.clone(),
                reason: failure,
            });
            continue;
        };

        let additions = store.additions_for(period.id, &employee.id);
        let input = EmployeePayInput {
            employee,
            compensation,
            period_start: period.period_start,
            period_end: period.period_end,
            payable_days: store.payable_days(period.id, &employee.id),
            additions: &additions,
            deduction_rules: &deduction_rules,
        };
        let pay = calculate_employee_pay(&input, tax)?;

        debug!(
            employee_id = %employee.id,
            gross = %pay.gross_amount,
            net = %pay.net_amount,
            "Employee pay calculated"
        );
        output.rows.push(PayrollRow {
            id: Uuid::new_v4(),
            batch_id: batch.id,
            employee_id: employee.id.clone(),
            gross_amount: pay.gross_amount,
            deduction_amount: pay.deduction_amount,
            tax_amount: pay.tax_amount,
            net_amount: pay.net_amount,
            deductions: pay.deductions,
            additions: pay.additions,
            audit_trace: pay.audit_trace,
        });
    }

    Ok(output)
}
