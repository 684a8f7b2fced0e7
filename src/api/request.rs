//! Request types for the payroll API.
//!
//! Every mutating request carries the acting user explicitly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::ThrInput;
use crate::error::EngineResult;
use crate::models::{Actor, AdditionCode, Classification, EmployeeType, OverrideResolution};
use crate::workflow::{NewAddition, ThrOptions};

/// Body of requests that only need the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    /// The acting user.
    pub actor: Actor,
}

/// Body of `POST /periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// The acting user.
    pub actor: Actor,
    /// The company the period belongs to.
    pub company_id: String,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
}

/// Body of `POST /periods/:id/additions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAdditionRequest {
    /// The acting user.
    pub actor: Actor,
    /// The employee receiving the amount.
    pub employee_id: String,
    /// Kind of addition.
    pub code: AdditionCode,
    /// Amount added to gross.
    pub amount: Decimal,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

impl From<AddAdditionRequest> for NewAddition {
    fn from(req: AddAdditionRequest) -> Self {
        NewAddition {
            employee_id: req.employee_id,
            code: req.code,
            amount: req.amount,
            description: req.description,
        }
    }
}

/// Body of `POST /periods/:id/thr` and `POST /periods/:id/thr/preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrAdditionRequest {
    /// The acting user.
    pub actor: Actor,
    /// The employee THR is computed for.
    pub employee_id: String,
    /// Overrides the employee's recorded type.
    #[serde(default)]
    pub employee_type: Option<EmployeeType>,
    /// Overrides the configured working days per year.
    #[serde(default)]
    pub working_days_in_year: Option<u32>,
}

impl ThrAdditionRequest {
    /// The THR options carried by the request.
    pub fn options(&self) -> ThrOptions {
        ThrOptions {
            employee_type: self.employee_type,
            working_days_in_year: self.working_days_in_year,
        }
    }
}

/// Body of `POST /periods/:id/thr/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrBulkRequest {
    /// The acting user.
    pub actor: Actor,
    /// Type applied to every employee instead of the recorded one.
    #[serde(default)]
    pub employee_type: Option<EmployeeType>,
    /// Overrides the configured working days per year.
    #[serde(default)]
    pub working_days_in_year: Option<u32>,
}

impl ThrBulkRequest {
    /// The THR options carried by the request.
    pub fn options(&self) -> ThrOptions {
        ThrOptions {
            employee_type: self.employee_type,
            working_days_in_year: self.working_days_in_year,
        }
    }
}

/// Body of `POST /overrides`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOverrideRequest {
    /// The acting user.
    pub actor: Actor,
    /// The decision to change.
    pub decision_id: Uuid,
    /// The classification to apply.
    pub proposed_classification: Classification,
    /// Why the change is needed.
    pub reason: String,
}

/// Body of `POST /overrides/:id/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveOverrideRequest {
    /// The acting user.
    pub actor: Actor,
    /// Approve or reject.
    pub resolution: OverrideResolution,
    /// Reviewer's note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Body of `POST /thr/calculate`.
///
/// The employee type is free text so unknown types surface as validation
/// errors rather than JSON errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrCalculationRequest {
    /// First day of employment.
    pub join_date: NaiveDate,
    /// Resignation date, if any.
    #[serde(default)]
    pub resign_date: Option<NaiveDate>,
    /// Date THR is computed for.
    pub calculation_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// `permanent`, `contract`, `daily` or `freelance`.
    pub employee_type: String,
    /// Overrides the configured working days per year.
    #[serde(default)]
    pub working_days_in_year: Option<u32>,
}

impl ThrCalculationRequest {
    /// Converts the request into a calculation input.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the employee type is unknown.
    pub fn into_input(self) -> EngineResult<ThrInput> {
        Ok(ThrInput {
            join_date: self.join_date,
            resign_date: self.resign_date,
            calculation_date: self.calculation_date,
            base_salary: self.base_salary,
            employee_type: self.employee_type.parse()?,
            working_days_in_year: self.working_days_in_year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::Role;

    #[test]
    fn test_deserialize_resolve_request() {
        let json = r#"{
            "actor": {"id": "owner_001", "role": "owner", "company_id": "acme"},
            "resolution": "approve"
        }"#;
        let request: ResolveOverrideRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.actor.role, Role::Owner);
        assert_eq!(request.resolution, OverrideResolution::Approve);
        assert!(request.note.is_none());
    }

    #[test]
    fn test_deserialize_addition_with_string_amount() {
        let json = r#"{
            "actor": {"id": "hr_001", "role": "hr", "company_id": "acme"},
            "employee_id": "emp_001",
            "code": "BONUS",
            "amount": "750000.00"
        }"#;
        let request: AddAdditionRequest = serde_json::from_str(json).unwrap();
        let addition: NewAddition = request.into();

        assert_eq!(addition.code, AdditionCode::Bonus);
        assert_eq!(addition.amount, Decimal::new(75_000_000, 2));
        assert_eq!(addition.description, "");
    }

    #[test]
    fn test_unknown_employee_type_is_invalid_input() {
        let json = r#"{
            "join_date": "2024-01-01",
            "calculation_date": "2024-07-01",
            "base_salary": "5000000",
            "employee_type": "intern"
        }"#;
        let request: ThrCalculationRequest = serde_json::from_str(json).unwrap();

        match request.into_input() {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "employee_type"),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_thr_request_carries_options() {
        let json = r#"{
            "actor": {"id": "hr_001", "role": "hr", "company_id": "acme"},
            "employee_id": "emp_001",
            "employee_type": "contract"
        }"#;
        let request: ThrAdditionRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.actor.role, Role::Hr);
        assert_eq!(request.options().employee_type, Some(EmployeeType::Contract));
        assert!(request.options().working_days_in_year.is_none());
    }

    #[test]
    fn test_thr_request_requires_actor() {
        let json = r#"{"employee_id": "emp_001"}"#;
        let error = serde_json::from_str::<ThrAdditionRequest>(json).unwrap_err();
        assert!(error.to_string().contains("missing field `actor`"));
    }
}
