//! Payroll additions: ad-hoc amounts and THR.
//!
//! THR additions are computed with [`calculate_thr`] as of the period's last
//! day from the employee's active compensation. At most one THR addition exists
//! per employee and period.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{ThrInput, ThrResult, calculate_thr, calculate_thr_batch};
use crate::config::ThrSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AdditionCode, Employee, EmployeeType, PayrollAddition, PayrollPeriod,
};
use crate::store::PayrollStore;

use super::state_machine::{CompanyAction, PeriodAction, PeriodStateMachine};

/// An addition to record, as entered by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddition {
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

/// Per-call THR options.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ThrOptions {
    /// Overrides the employee's recorded type.
    #[serde(default)]
    pub employee_type: Option<EmployeeType>,
    /// Overrides the configured working days per year.
    #[serde(default)]
    pub working_days_in_year: Option<u32>,
}

/// A THR addition together with the calculation behind it.
#[derive(Debug, Clone, Serialize)]
pub struct ThrAddition {
    /// The persisted addition.
    pub addition: PayrollAddition,
    /// The calculation result.
    pub calculation: ThrResult,
}

/// An employee the bulk THR run could not create an addition for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThrBulkError {
    /// The employee.
    pub employee_id: String,
    /// Why no addition was created.
    pub message: String,
}

/// Summary of a bulk THR run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ThrBulkSummary {
    /// Additions created.
    pub created: Vec<PayrollAddition>,
    /// Employees that already had a THR addition.
    pub skipped_existing: usize,
    /// Employees that failed.
    pub errors: Vec<ThrBulkError>,
}

/// Records an ad-hoc addition for an employee of the period's company.
///
/// # Errors
///
/// - `NotFound` if the period or employee does not exist
/// - `InvalidState` unless the period is DRAFT or REVIEW
/// - `Unauthorized` unless the actor is hr or owner of the period's company
/// - `InvalidInput` if the amount is not positive or the employee belongs to
///   another company
/// - `DomainRuleViolation` for a THR addition, which only
///   [`create_thr_addition`] may record
pub fn add_payroll_addition(
    store: &mut PayrollStore,
    actor: &Actor,
    period_id: Uuid,
    new: NewAddition,
    now: DateTime<Utc>,
) -> EngineResult<PayrollAddition> {
    store.transaction(|tx| {
        let period = tx.period(period_id)?;
        PeriodStateMachine::evaluate(
            PeriodAction::AddAddition,
            period,
            actor,
            &tx.period_facts(period_id),
        )?;
        employee_of(tx, period, &new.employee_id)?;

        if new.code == AdditionCode::Thr {
            return Err(EngineError::rule_violation(
                "THR additions are calculated from tenure; create them through the THR endpoint",
            ));
        }
        if new.amount <= Decimal::ZERO {
            return Err(EngineError::invalid_input("amount", "must be positive"));
        }

        let addition = PayrollAddition {
            id: Uuid::new_v4(),
            period_id,
            employee_id: new.employee_id,
            code: new.code,
            amount: new.amount,
            description: new.description,
            created_by: actor.id.clone(),
            created_at: now,
        };
        tx.additions.push(addition.clone());

        info!(
            period_id = %period_id,
            employee_id = %addition.employee_id,
            code = addition.code.as_str(),
            amount = %addition.amount,
            "Payroll addition created"
        );
        Ok(addition)
    })
}

/// Calculates THR for an employee of a period without persisting anything.
///
/// # Errors
///
/// - `NotFound` if the period or employee does not exist
/// - `Unauthorized` unless the actor is hr or owner of the period's company
/// - `InvalidInput` if the employee belongs to another company or the
///   calculation rejects its input
/// - `DomainRuleViolation` if the employee has no active compensation
pub fn preview_thr(
    store: &PayrollStore,
    settings: &ThrSettings,
    actor: &Actor,
    period_id: Uuid,
    employee_id: &str,
    options: ThrOptions,
) -> EngineResult<ThrResult> {
    let period = store.period(period_id)?;
    PeriodStateMachine::authorize(CompanyAction::PreviewThr, actor, &period.company_id)?;
    employee_thr(store, settings, period, employee_id, options)
}

fn employee_thr(
    store: &PayrollStore,
    settings: &ThrSettings,
    period: &PayrollPeriod,
    employee_id: &str,
    options: ThrOptions,
) -> EngineResult<ThrResult> {
    let employee = employee_of(store, period, employee_id)?;
    let input = thr_input(store, settings, period, employee, options)?;
    calculate_thr(&input, settings)
}

/// Calculates THR for an employee and records it as a THR addition.
///
/// # Errors
///
/// - `InvalidState` if the period is FINALIZED
/// - `Unauthorized` unless the actor is hr or owner of the period's company
/// - `DomainRuleViolation` if a THR addition already exists, the employee has
///   no active compensation, or the employee is not eligible
pub fn create_thr_addition(
    store: &mut PayrollStore,
    settings: &ThrSettings,
    actor: &Actor,
    period_id: Uuid,
    employee_id: &str,
    options: ThrOptions,
    now: DateTime<Utc>,
) -> EngineResult<ThrAddition> {
    store.transaction(|tx| {
        let period = tx.period(period_id)?;
        PeriodStateMachine::evaluate(
            PeriodAction::CreateThrAddition,
            period,
            actor,
            &tx.period_facts(period_id),
        )?;

        if has_thr(tx, period_id, employee_id) {
            return Err(EngineError::rule_violation(
                "THR already exists for this employee in this period",
            ));
        }

        let calculation = employee_thr(tx, settings, period, employee_id, options)?;
        let addition = thr_addition(tx, actor, period_id, employee_id, &calculation, now)?;
        Ok(ThrAddition {
            addition,
            calculation,
        })
    })
}

/// Creates THR additions for every ACTIVE employee of the period's company.
///
/// Employees that already have THR are counted and skipped. A failing employee
/// is recorded in the summary and does not stop the others.
///
/// # Errors
///
/// Only the period-level checks fail the call: `NotFound`, `InvalidState` and
/// `Unauthorized`.
pub fn create_thr_additions_bulk(
    store: &mut PayrollStore,
    settings: &ThrSettings,
    actor: &Actor,
    period_id: Uuid,
    options: ThrOptions,
    now: DateTime<Utc>,
) -> EngineResult<ThrBulkSummary> {
    store.transaction(|tx| {
        let period = tx.period(period_id)?.clone();
        PeriodStateMachine::evaluate(
            PeriodAction::CreateThrAddition,
            &period,
            actor,
            &tx.period_facts(period_id),
        )?;

        let mut summary = ThrBulkSummary::default();
        let mut inputs = Vec::new();
        for employee in tx
            .company_employees(&period.company_id)
            .filter(|e| e.is_active())
        {
            if has_thr(tx, period_id, &employee.id) {
                summary.skipped_existing += 1;
                continue;
            }
            match thr_input(tx, settings, &period, employee, options) {
                Ok(input) => inputs.push((employee.id.clone(), input)),
                Err(e) => summary.errors.push(ThrBulkError {
                    employee_id: employee.id.clone(),
                    message: e.to_string(),
                }),
            }
        }

        let entries = calculate_thr_batch(
            inputs.iter().map(|(id, input)| (id.as_str(), input.clone())),
            settings,
        );
        for entry in entries {
            let created = entry
                .outcome
                .map_err(|message| EngineError::InvalidInput {
                    field: "thr".to_string(),
                    message,
                })
                .and_then(|result| {
                    thr_addition(tx, actor, period_id, &entry.employee_id, &result, now)
                });
            match created {
                Ok(addition) => summary.created.push(addition),
                Err(e) => summary.errors.push(ThrBulkError {
                    employee_id: entry.employee_id,
                    message: e.to_string(),
                }),
            }
        }

        if !summary.errors.is_empty() {
            warn!(
                period_id = %period_id,
                errors = summary.errors.len(),
                "Bulk THR finished with errors"
            );
        }
        info!(
            period_id = %period_id,
            created = summary.created.len(),
            skipped_existing = summary.skipped_existing,
            errors = summary.errors.len(),
            "Bulk THR additions created"
        );
        Ok(summary)
    })
}

fn has_thr(store: &PayrollStore, period_id: Uuid, employee_id: &str) -> bool {
    store.additions.iter().any(|a| {
        a.period_id == period_id && a.employee_id == employee_id && a.code == AdditionCode::Thr
    })
}

fn employee_of<'a>(
    store: &'a PayrollStore,
    period: &PayrollPeriod,
    employee_id: &str,
) -> EngineResult<&'a Employee> {
    let employee = store.employee(employee_id)?;
    if employee.company_id != period.company_id {
        return Err(EngineError::invalid_input(
            "employee_id",
            format!("{} does not belong to company {}", employee_id, period.company_id),
        ));
    }
    Ok(employee)
}

fn thr_input(
    store: &PayrollStore,
    settings: &ThrSettings,
    period: &PayrollPeriod,
    employee: &Employee,
    options: ThrOptions,
) -> EngineResult<ThrInput> {
    let compensation = store
        .active_compensation(&employee.id)
        .ok_or_else(|| EngineError::rule_violation("Employee has no active compensation"))?;

    Ok(ThrInput {
        join_date: employee.join_date,
        resign_date: employee.resign_date,
        calculation_date: period.period_end,
        base_salary: compensation.base_salary,
        employee_type: options
            .employee_type
            .or(employee.employee_type)
            .unwrap_or(settings.default_employee_type),
        working_days_in_year: options.working_days_in_year,
    })
}

fn thr_addition(
    store: &mut PayrollStore,
    actor: &Actor,
    period_id: Uuid,
    employee_id: &str,
    result: &ThrResult,
    now: DateTime<Utc>,
) -> EngineResult<PayrollAddition> {
    if !result.eligible {
        return Err(EngineError::rule_violation(format!(
            "Employee is not eligible for THR: {}",
            result.note
        )));
    }

    let addition = PayrollAddition {
        id: Uuid::new_v4(),
        period_id,
        employee_id: employee_id.to_string(),
        code: AdditionCode::Thr,
        amount: result.amount,
        description: result.note.clone(),
        created_by: actor.id.clone(),
        created_at: now,
    };
    store.additions.push(addition.clone());

    info!(
        period_id = %period_id,
        employee_id = %employee_id,
        amount = %addition.amount,
        method = ?result.calculation_method,
        "THR addition created"
    );
    Ok(addition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::ThrMethod;
    use crate::models::{
        Company, EmployeeCompensation, EmployeeStatus, PayrollState, Role,
    };
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hr() -> Actor {
        Actor {
            id: "hr_001".to_string(),
            role: Role::Hr,
            company_id: "acme".to_string(),
        }
    }

    fn add_employee(store: &mut PayrollStore, id: &str, join: NaiveDate, base: Option<&str>) {
        store.employees.push(Employee {
            id: id.to_string(),
            company_id: "acme".to_string(),
            name: id.to_string(),
            status: EmployeeStatus::Active,
            join_date: join,
            resign_date: None,
            tax_status: None,
            employee_type: None,
        });
        if let Some(base) = base {
            store.compensations.push(EmployeeCompensation {
                id: Uuid::new_v4(),
                employee_id: id.to_string(),
                base_salary: dec(base),
                allowances: BTreeMap::new(),
                effective_from: join,
                effective_to: None,
            });
        }
    }

    /// Period ending 2024-07-01 with an employee who joined on 2024-01-01.
    fn create_test_store() -> (PayrollStore, Uuid) {
        let mut store = PayrollStore::new();
        store.companies.push(Company {
            id: "acme".to_string(),
            name: "Acme".to_string(),
        });
        add_employee(&mut store, "emp_001", date(2024, 1, 1), Some("5000000"));
        let period = PayrollPeriod::new("acme", date(2024, 6, 2), date(2024, 7, 1), "2024.1").unwrap();
        let id = period.id;
        store.periods.insert(id, period);
        (store, id)
    }

    fn bonus(employee_id: &str, amount: &str) -> NewAddition {
        NewAddition {
            employee_id: employee_id.to_string(),
            code: AdditionCode::Bonus,
            amount: dec(amount),
            description: "Quarterly bonus".to_string(),
        }
    }

    #[test]
    fn test_add_payroll_addition() {
        let (mut store, period_id) = create_test_store();
        let addition =
            add_payroll_addition(&mut store, &hr(), period_id, bonus("emp_001", "750000"), Utc::now())
                .unwrap();

        assert_eq!(addition.code, AdditionCode::Bonus);
        assert_eq!(addition.created_by, "hr_001");
        assert_eq!(store.additions_for(period_id, "emp_001").len(), 1);
    }

    #[test]
    fn test_addition_amount_must_be_positive() {
        let (mut store, period_id) = create_test_store();
        let result =
            add_payroll_addition(&mut store, &hr(), period_id, bonus("emp_001", "0"), Utc::now());
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
        assert!(store.additions.is_empty());
    }

    #[test]
    fn test_addition_in_finalized_period_is_invalid_state() {
        let (mut store, period_id) = create_test_store();
        store.period_mut(period_id).unwrap().state = PayrollState::Finalized;

        let result =
            add_payroll_addition(&mut store, &hr(), period_id, bonus("emp_001", "1"), Utc::now());
        assert!(matches!(result, Err(EngineError::InvalidState { .. })));
    }

    #[test]
    fn test_thr_cannot_be_added_as_an_ad_hoc_amount() {
        let (mut store, period_id) = create_test_store();
        let thr = NewAddition {
            code: AdditionCode::Thr,
            ..bonus("emp_001", "999999999")
        };

        let result = add_payroll_addition(&mut store, &hr(), period_id, thr, Utc::now());

        assert!(matches!(result, Err(EngineError::DomainRuleViolation { .. })));
        assert!(store.additions.is_empty());

        create_thr_addition(
            &mut store,
            &ThrSettings::default(),
            &hr(),
            period_id,
            "emp_001",
            ThrOptions::default(),
            Utc::now(),
        )
        .unwrap();
        let thr_rows = store
            .additions
            .iter()
            .filter(|a| a.code == AdditionCode::Thr)
            .count();
        assert_eq!(thr_rows, 1);
    }

    #[test]
    fn test_preview_thr_requires_actor_of_the_company() {
        let (store, period_id) = create_test_store();
        let outsider = Actor {
            company_id: "globex".to_string(),
            ..hr()
        };
        let employee = Actor {
            role: Role::Employee,
            ..hr()
        };

        for actor in [outsider, employee] {
            let result = preview_thr(
                &store,
                &ThrSettings::default(),
                &actor,
                period_id,
                "emp_001",
                ThrOptions::default(),
            );
            assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
        }
    }

    #[test]
    fn test_preview_thr_for_six_months() {
        let (store, period_id) = create_test_store();
        let result = preview_thr(
            &store,
            &ThrSettings::default(),
            &hr(),
            period_id,
            "emp_001",
            ThrOptions::default(),
        )
        .unwrap();

        assert_eq!(result.amount, dec("2500000"));
        assert_eq!(result.calculation_method, ThrMethod::PermanentProrated);
        assert!(store.additions.is_empty());
    }

    #[test]
    fn test_create_thr_addition_once_per_period() {
        let (mut store, period_id) = create_test_store();
        let settings = ThrSettings::default();
        let created = create_thr_addition(
            &mut store,
            &settings,
            &hr(),
            period_id,
            "emp_001",
            ThrOptions::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(created.addition.code, AdditionCode::Thr);
        assert_eq!(created.addition.amount, dec("2500000"));
        assert_eq!(created.addition.description, created.calculation.note);

        let again = create_thr_addition(
            &mut store,
            &settings,
            &hr(),
            period_id,
            "emp_001",
            ThrOptions::default(),
            Utc::now(),
        );
        match again {
            Err(EngineError::DomainRuleViolation { message }) => {
                assert_eq!(message, "THR already exists for this employee in this period");
            }
            other => panic!("expected DomainRuleViolation, got {:?}", other),
        }
        assert_eq!(store.additions.len(), 1);
    }

    #[test]
    fn test_ineligible_employee_gets_no_thr() {
        let (mut store, period_id) = create_test_store();
        add_employee(&mut store, "emp_new", date(2024, 6, 20), Some("5000000"));

        let result = create_thr_addition(
            &mut store,
            &ThrSettings::default(),
            &hr(),
            period_id,
            "emp_new",
            ThrOptions::default(),
            Utc::now(),
        );

        match result {
            Err(EngineError::DomainRuleViolation { message }) => {
                assert!(message.starts_with("Employee is not eligible for THR: "));
            }
            other => panic!("expected DomainRuleViolation, got {:?}", other),
        }
        assert!(store.additions.is_empty());
    }

    #[test]
    fn test_option_type_overrides_employee_type() {
        let (store, period_id) = create_test_store();
        let options = ThrOptions {
            employee_type: Some(EmployeeType::Daily),
            working_days_in_year: None,
        };
        let result =
            preview_thr(&store, &ThrSettings::default(), &hr(), period_id, "emp_001", options)
                .unwrap();
        assert_eq!(result.calculation_method, ThrMethod::DailyProrated);
    }

    #[test]
    fn test_bulk_thr_collects_skips_and_errors() {
        let (mut store, period_id) = create_test_store();
        add_employee(&mut store, "emp_002", date(2023, 1, 1), Some("6000000"));
        add_employee(&mut store, "emp_003", date(2023, 1, 1), None);
        add_employee(&mut store, "emp_004", date(2024, 6, 20), Some("5000000"));
        let settings = ThrSettings::default();
        create_thr_addition(
            &mut store,
            &settings,
            &hr(),
            period_id,
            "emp_001",
            ThrOptions::default(),
            Utc::now(),
        )
        .unwrap();

        let summary = create_thr_additions_bulk(
            &mut store,
            &settings,
            &hr(),
            period_id,
            ThrOptions::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(summary.created.len(), 1);
        assert_eq!(summary.created[0].employee_id, "emp_002");
        assert_eq!(summary.created[0].amount, dec("6000000"));
        let failed: Vec<_> = summary.errors.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(failed, vec!["emp_003", "emp_004"]);
        assert_eq!(store.additions.len(), 2);
    }

    #[test]
    fn test_bulk_thr_rejects_employee_role() {
        let (mut store, period_id) = create_test_store();
        let actor = Actor {
            role: Role::Employee,
            ..hr()
        };
        let result = create_thr_additions_bulk(
            &mut store,
            &ThrSettings::default(),
            &actor,
            period_id,
            ThrOptions::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }
}
