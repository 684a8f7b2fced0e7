//! In-memory system of record.
//!
//! [`PayrollStore`] holds the upstream inputs (roster, compensation, rules,
//! attendance) and everything the engine produces. Lifecycle operations mutate
//! it through [`PayrollStore::transaction`], which applies the operation to a
//! working copy and commits only on success, so a failed operation leaves no
//! partial writes behind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceDecision, AttendanceOverride, Company, Employee, EmployeeCompensation, Holiday,
    LeaveRecord, OverrideRequest, PayrollAddition, PayrollBatch, PayrollDeductionRule,
    PayrollPeriod, PayrollRow, RawAttendance, TimeCorrection,
};
use crate::workflow::PeriodFacts;

/// The complete payroll data set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollStore {
    /// Companies.
    pub companies: Vec<Company>,
    /// Employee roster.
    pub employees: Vec<Employee>,
    /// Compensation history.
    pub compensations: Vec<EmployeeCompensation>,
    /// Deduction rules.
    pub deduction_rules: Vec<PayrollDeductionRule>,
    /// Raw clock-in/clock-out records.
    pub raw_attendance: Vec<RawAttendance>,
    /// Approved leave days.
    pub leave_records: Vec<LeaveRecord>,
    /// Company holidays.
    pub holidays: Vec<Holiday>,
    /// Approved time corrections.
    pub time_corrections: Vec<TimeCorrection>,
    /// One-off payroll additions.
    pub additions: Vec<PayrollAddition>,
    /// Payroll periods by id.
    pub periods: BTreeMap<Uuid, PayrollPeriod>,
    /// Attendance decisions by id.
    pub decisions: BTreeMap<Uuid, AttendanceDecision>,
    /// Override requests by id.
    pub override_requests: BTreeMap<Uuid, OverrideRequest>,
    /// Append-only override audit rows.
    pub overrides: Vec<AttendanceOverride>,
    /// Finalized batches.
    pub batches: Vec<PayrollBatch>,
    /// Rows of finalized batches.
    pub rows: Vec<PayrollRow>,
}

impl PayrollStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a store snapshot from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_json::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Runs `operation` against a working copy and commits it only on success.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::error::EngineError;
    /// use payroll_engine::models::Company;
    /// use payroll_engine::store::PayrollStore;
    ///
    /// let mut store = PayrollStore::new();
    /// let result: Result<(), _> = store.transaction(|tx| {
    ///     tx.companies.push(Company { id: "acme".into(), name: "Acme".into() });
    ///     Err(EngineError::rule_violation("abort"))
    /// });
    ///
    /// assert!(result.is_err());
    /// assert!(store.companies.is_empty());
    /// ```
    pub fn transaction<T, F>(&mut self, operation: F) -> EngineResult<T>
    where
        F: FnOnce(&mut PayrollStore) -> EngineResult<T>,
    {
        let mut working = self.clone();
        let output = operation(&mut working)?;
        *self = working;
        Ok(output)
    }

    /// Looks up a company.
    pub fn company(&self, id: &str) -> EngineResult<&Company> {
        self.companies
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Company",
                id: id.to_string(),
            })
    }

    /// Looks up an employee.
    pub fn employee(&self, id: &str) -> EngineResult<&Employee> {
        self.employees
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Employee",
                id: id.to_string(),
            })
    }

    /// Employees of a company, in roster order.
    pub fn company_employees<'a>(
        &'a self,
        company_id: &'a str,
    ) -> impl Iterator<Item = &'a Employee> + 'a {
        self.employees
            .iter()
            .filter(move |e| e.company_id == company_id)
    }

    /// Looks up a period.
    pub fn period(&self, id: Uuid) -> EngineResult<&PayrollPeriod> {
        self.periods.get(&id).ok_or_else(|| period_not_found(id))
    }

    /// Looks up a period for mutation.
    pub fn period_mut(&mut self, id: Uuid) -> EngineResult<&mut PayrollPeriod> {
        self.periods.get_mut(&id).ok_or_else(|| period_not_found(id))
    }

    /// Looks up a decision.
    pub fn decision(&self, id: Uuid) -> EngineResult<&AttendanceDecision> {
        self.decisions.get(&id).ok_or_else(|| EngineError::NotFound {
            entity: "Attendance decision",
            id: id.to_string(),
        })
    }

    /// Looks up an override request.
    pub fn override_request(&self, id: Uuid) -> EngineResult<&OverrideRequest> {
        self.override_requests
            .get(&id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Override request",
                id: id.to_string(),
            })
    }

    /// Decisions belonging to a period.
    pub fn period_decisions(
        &self,
        period_id: Uuid,
    ) -> impl Iterator<Item = &AttendanceDecision> + '_ {
        self.decisions
            .values()
            .filter(move |d| d.period_id == period_id)
    }

    /// Number of payable decisions for an employee within a period.
    pub fn payable_days(&self, period_id: Uuid, employee_id: &str) -> u32 {
        self.period_decisions(period_id)
            .filter(|d| d.employee_id == employee_id && d.payable)
            .count() as u32
    }

    /// Returns true if an approved override was ever applied to the decision.
    pub fn has_override(&self, decision_id: Uuid) -> bool {
        self.overrides.iter().any(|o| o.decision_id == decision_id)
    }

    /// Override requests whose decision belongs to the period and that are
    /// still pending, or were given a status without a review timestamp.
    pub fn unresolved_override_count(&self, period_id: Uuid) -> usize {
        self.override_requests
            .values()
            .filter(|request| request.is_unresolved())
            .filter(|request| {
                self.decisions
                    .get(&request.decision_id)
                    .is_some_and(|d| d.period_id == period_id)
            })
            .count()
    }

    /// Facts about a period that gate its lifecycle transitions.
    pub fn period_facts(&self, period_id: Uuid) -> PeriodFacts {
        PeriodFacts {
            decision_count: self.period_decisions(period_id).count(),
            unresolved_overrides: self.unresolved_override_count(period_id),
        }
    }

    /// The active compensation of an employee.
    ///
    /// Active means `effective_to` is unset; among several, the latest
    /// `effective_from` wins.
    pub fn active_compensation(&self, employee_id: &str) -> Option<&EmployeeCompensation> {
        self.compensations
            .iter()
            .filter(|c| c.employee_id == employee_id && c.is_active())
            .max_by_key(|c| c.effective_from)
    }

    /// Deduction rules of a company that apply on `as_of`.
    pub fn active_deduction_rules(
        &self,
        company_id: &str,
        as_of: NaiveDate,
    ) -> Vec<PayrollDeductionRule> {
        self.deduction_rules
            .iter()
            .filter(|r| r.company_id == company_id && r.is_active_on(as_of))
            .cloned()
            .collect()
    }

    /// Additions for an employee in a period.
    pub fn additions_for(&self, period_id: Uuid, employee_id: &str) -> Vec<PayrollAddition> {
        self.additions
            .iter()
            .filter(|a| a.period_id == period_id && a.employee_id == employee_id)
            .cloned()
            .collect()
    }

    /// The batch of a finalized period.
    pub fn batch_for_period(&self, period_id: Uuid) -> Option<&PayrollBatch> {
        self.batches.iter().find(|b| b.period_id == period_id)
    }

    /// Rows of a batch.
    pub fn rows_for_batch(&self, batch_id: Uuid) -> impl Iterator<Item = &PayrollRow> + '_ {
        self.rows.iter().filter(move |r| r.batch_id == batch_id)
    }
}

fn period_not_found(id: Uuid) -> EngineError {
    EngineError::NotFound {
        entity: "Payroll period",
        id: id.to_string(),
    }
}
