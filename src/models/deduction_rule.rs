//! Company deduction rules (social security style contributions).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The salary figure a deduction rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionBasis {
    /// The unprorated base salary.
    BaseSalary,
    /// The base salary, capped at the rule's `salary_cap`.
    CappedSalary,
    /// The computed gross amount.
    GrossSalary,
}

impl DeductionBasis {
    /// Returns the string representation of the basis.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BaseSalary => "BASE_SALARY",
            Self::CappedSalary => "CAPPED_SALARY",
            Self::GrossSalary => "GROSS_SALARY",
        }
    }
}

/// A company-scoped, time-bounded deduction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollDeductionRule {
    /// Unique identifier for the rule.
    pub id: Uuid,
    /// The owning company.
    pub company_id: String,
    /// Short code, e.g. `JHT`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Salary figure the rates apply to.
    pub basis: DeductionBasis,
    /// Percentage withheld from the employee.
    pub employee_rate: Decimal,
    /// Percentage contributed by the employer.
    pub employer_rate: Decimal,
    /// Cap for [`DeductionBasis::CappedSalary`].
    #[serde(default)]
    pub salary_cap: Option<Decimal>,
    /// First day the rule applies.
    pub effective_from: NaiveDate,
    /// Last day the rule applies; open-ended when unset.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl PayrollDeductionRule {
    /// Returns true if the rule applies on the given date.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| date <= to)
    }
}
