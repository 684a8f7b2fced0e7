//! Employee model.
//!
//! This module contains the [`Employee`] type and the [`EmployeeType`]
//! used to pick the THR formula.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::EngineError;

/// Whether the employee is on the payroll roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Computed in payroll runs.
    Active,
    /// Excluded from payroll runs.
    Inactive,
}

/// Employment arrangement, which determines how THR is computed.
///
/// # Example
///
/// ```
/// use payroll_engine::models::EmployeeType;
///
/// let employee_type: EmployeeType = "daily".parse().unwrap();
/// assert_eq!(employee_type, EmployeeType::Daily);
/// assert!("intern".parse::<EmployeeType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    /// Permanent employment.
    Permanent,
    /// Fixed-term contract.
    Contract,
    /// Paid per day worked.
    Daily,
    /// Freelance engagement.
    Freelance,
}

impl EmployeeType {
    /// Returns the string representation of the employee type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Contract => "contract",
            Self::Daily => "daily",
            Self::Freelance => "freelance",
        }
    }
}

impl std::fmt::Display for EmployeeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permanent" => Ok(Self::Permanent),
            "contract" => Ok(Self::Contract),
            "daily" => Ok(Self::Daily),
            "freelance" => Ok(Self::Freelance),
            other => Err(EngineError::invalid_input(
                "employee_type",
                format!("unknown employee type '{}'", other),
            )),
        }
    }
}

/// Represents an employee of a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// The employing company.
    pub company_id: String,
    /// Full name.
    pub name: String,
    /// Roster status.
    pub status: EmployeeStatus,
    /// First day of employment.
    pub join_date: NaiveDate,
    /// Last day of employment, if the employee has resigned.
    #[serde(default)]
    pub resign_date: Option<NaiveDate>,
    /// Taxpayer status such as `TK/0` or `K/1`.
    #[serde(default)]
    pub tax_status: Option<String>,
    /// Employment arrangement, if recorded.
    #[serde(default)]
    pub employee_type: Option<EmployeeType>,
}

impl Employee {
    /// Returns true if the employee is computed in payroll runs.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}
