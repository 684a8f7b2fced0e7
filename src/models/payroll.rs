//! Payroll output models.
//!
//! A finalized period produces one [`PayrollBatch`] with one [`PayrollRow`] per
//! computed employee. Rows carry their deduction and addition line items and the
//! audit trace that explains them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditTrace, DeductionBasis, PayrollDeductionRule};

/// Kind of a one-off payroll addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdditionCode {
    /// Statutory holiday allowance.
    Thr,
    /// Discretionary bonus.
    Bonus,
    /// Performance incentive.
    Incentive,
    /// Overtime pay.
    Overtime,
    /// Manual correction.
    Adjustment,
}

impl AdditionCode {
    /// Returns the string representation of the code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Thr => "THR",
            Self::Bonus => "BONUS",
            Self::Incentive => "INCENTIVE",
            Self::Overtime => "OVERTIME",
            Self::Adjustment => "ADJUSTMENT",
        }
    }
}

/// An admin-entered one-off amount for one employee in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollAddition {
    /// Unique identifier for the addition.
    pub id: Uuid,
    /// The period the addition is paid in.
    pub period_id: Uuid,
    /// The employee receiving the addition.
    pub employee_id: String,
    /// Kind of addition.
    pub code: AdditionCode,
    /// Amount added to gross.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
    /// Who created the addition.
    pub created_by: String,
    /// When the addition was created.
    pub created_at: DateTime<Utc>,
}

/// The immutable output of one finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBatch {
    /// Unique identifier for the batch.
    pub id: Uuid,
    /// The company paid by the batch.
    pub company_id: String,
    /// The finalized period.
    pub period_id: Uuid,
    /// Sum of all row net amounts.
    pub total_amount: Decimal,
    /// Who finalized the period.
    pub finalized_by: String,
    /// When the period was finalized.
    pub finalized_at: DateTime<Utc>,
}

/// Copy of a deduction rule's fields at the time a row was computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    /// Rule identifier.
    pub rule_id: Uuid,
    /// Rule name.
    pub name: String,
    /// Basis the rates were applied to.
    pub basis: DeductionBasis,
    /// Employee rate in percent.
    pub employee_rate: Decimal,
    /// Employer rate in percent.
    pub employer_rate: Decimal,
    /// Salary cap, if any.
    pub salary_cap: Option<Decimal>,
    /// First day the rule applied.
    pub effective_from: NaiveDate,
    /// Last day the rule applied.
    pub effective_to: Option<NaiveDate>,
}

impl From<&PayrollDeductionRule> for RuleSnapshot {
    fn from(rule: &PayrollDeductionRule) -> Self {
        Self {
            rule_id: rule.id,
            name: rule.name.clone(),
            basis: rule.basis,
            employee_rate: rule.employee_rate,
            employer_rate: rule.employer_rate,
            salary_cap: rule.salary_cap,
            effective_from: rule.effective_from,
            effective_to: rule.effective_to,
        }
    }
}

/// One applied deduction rule on a payroll row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRowDeduction {
    /// Rule code.
    pub code: String,
    /// Salary figure the rates were applied to.
    pub basis_amount: Decimal,
    /// Amount withheld from the employee.
    pub employee_amount: Decimal,
    /// Amount contributed by the employer.
    pub employer_amount: Decimal,
    /// The rule as it was when the row was computed.
    pub rule_snapshot: RuleSnapshot,
}

/// One addition paid on a payroll row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRowAddition {
    /// The source addition.
    pub addition_id: Uuid,
    /// Kind of addition.
    pub code: AdditionCode,
    /// Amount added to gross.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
}

/// One employee's computed pay within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    /// Unique identifier for the row.
    pub id: Uuid,
    /// The owning batch.
    pub batch_id: Uuid,
    /// The paid employee.
    pub employee_id: String,
    /// Prorated base plus allowances plus additions.
    pub gross_amount: Decimal,
    /// Sum of employee deduction amounts.
    pub deduction_amount: Decimal,
    /// Withholding tax.
    pub tax_amount: Decimal,
    /// Amount paid out.
    pub net_amount: Decimal,
    /// Applied deduction rules.
    pub deductions: Vec<PayrollRowDeduction>,
    /// Paid additions.
    pub additions: Vec<PayrollRowAddition>,
    /// How the amounts were derived.
    pub audit_trace: AuditTrace,
}
