//! Finalization of a reviewed period.
//!
//! One transaction covers the whole sequence: lifecycle checks, the
//! unresolved-override check, batch creation, the payroll run, the batch total
//! and the move to FINALIZED. Any error leaves the store untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::TaxConfig;
use crate::error::EngineResult;
use crate::models::{Actor, PayrollBatch, PayrollPeriod, PayrollRow};
use crate::store::PayrollStore;

use super::payroll_run::{SkippedEmployee, run_payroll};
use super::state_machine::{PeriodAction, PeriodStateMachine};

/// Everything a finalize produced.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizationOutput {
    /// The finalized period.
    pub period: PayrollPeriod,
    /// The batch, with its total set.
    pub batch: PayrollBatch,
    /// One row per computed employee.
    pub rows: Vec<PayrollRow>,
    /// Employees left out for lack of compensation.
    pub skipped: Vec<SkippedEmployee>,
}

/// Finalizes a REVIEW period.
///
/// The unresolved-override count is read inside the same transaction that
/// writes the batch, so an approval racing with finalize is ordered strictly
/// before or after it by the store lock.
///
/// # Errors
///
/// - `NotFound` if the period does not exist
/// - `InvalidState` unless the period is REVIEW
/// - `Unauthorized` unless the actor is owner of the period's company
/// - `DomainRuleViolation` if override requests are unresolved
/// - `MissingContext` if the run cannot resolve its period or company
pub fn finalize_period(
    store: &mut PayrollStore,
    tax: &TaxConfig,
    actor: &Actor,
    period_id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<FinalizationOutput> {
    store.transaction(|tx| {
        let period = tx.period(period_id)?.clone();
        let next = PeriodStateMachine::evaluate(
            PeriodAction::Finalize,
            &period,
            actor,
            &tx.period_facts(period_id),
        )?;

        let mut batch = PayrollBatch {
            id: Uuid::new_v4(),
            company_id: period.company_id.clone(),
            period_id,
            total_amount: Decimal::ZERO,
            finalized_by: actor.id.clone(),
            finalized_at: now,
        };
        tx.batches.push(batch.clone());

        let run = run_payroll(tx, &batch, tax, now.date_naive())?;
        batch.total_amount = run.total_net()?;
        if let Some(stored) = tx.batches.iter_mut().find(|b| b.id == batch.id) {
            stored.total_amount = batch.total_amount;
        }
        tx.rows.extend(run.rows.iter().cloned());

        let finalized = tx.period_mut(period_id)?;
        if let Some(state) = next {
            finalized.state = state;
        }
        finalized.finalized_by = Some(actor.id.clone());
        finalized.finalized_at = Some(now);
        let period = finalized.clone();

        info!(
            period_id = %period_id,
            batch_id = %batch.id,
            rows = run.rows.len(),
            skipped = run.skipped.len(),
            total = %batch.total_amount,
            actor = %actor.id,
            "Payroll period finalized"
        );
        Ok(FinalizationOutput {
            period,
            batch,
            rows: run.rows,
            skipped: run.skipped,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TaxBracket, TaxCategory};
    use crate::error::EngineError;
    use crate::models::{
        AttendanceDecision, Classification, Company, DeductionBasis, DeductionType, Employee,
        EmployeeCompensation, EmployeeStatus, OverrideRequest, OverrideStatus,
        PayrollDeductionRule, PayrollState, Role,
    };
    use chrono::NaiveDate;
    use std::collections::{BTreeMap, HashMap};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn owner() -> Actor {
        Actor {
            id: "owner_001".to_string(),
            role: Role::Owner,
            company_id: "acme".to_string(),
        }
    }

    fn tax() -> TaxConfig {
        TaxConfig {
            default_status: "TK/0".to_string(),
            status_categories: HashMap::new(),
            default_category: TaxCategory::A,
            brackets: BTreeMap::from([(
                TaxCategory::A,
                vec![TaxBracket {
                    up_to: None,
                    rate: dec("1"),
                }],
            )]),
            reduces_net: false,
        }
    }

    /// One employee, period Mon 2024-06-03 .. Fri 2024-06-07 in REVIEW with
    /// four payable days out of five, a 10,000,000 base and a 2% BPJS-style rule.
    fn create_test_store() -> (PayrollStore, Uuid) {
        let mut store = PayrollStore::new();
        store.companies.push(Company {
            id: "acme".to_string(),
            name: "Acme".to_string(),
        });
        store.employees.push(Employee {
            id: "emp_001".to_string(),
            company_id: "acme".to_string(),
            name: "Siti".to_string(),
            status: EmployeeStatus::Active,
            join_date: date(2023, 1, 1),
            resign_date: None,
            tax_status: Some("TK/0".to_string()),
            employee_type: None,
        });
        store.compensations.push(EmployeeCompensation {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            base_salary: dec("10000000"),
            allowances: BTreeMap::new(),
            effective_from: date(2023, 1, 1),
            effective_to: None,
        });
        store.deduction_rules.push(PayrollDeductionRule {
            id: Uuid::new_v4(),
            company_id: "acme".to_string(),
            code: "JHT".to_string(),
            name: "Old-age savings".to_string(),
            basis: DeductionBasis::BaseSalary,
            employee_rate: dec("2"),
            employer_rate: dec("3.7"),
            salary_cap: None,
            effective_from: date(2020, 1, 1),
            effective_to: None,
        });

        let mut period = PayrollPeriod::new("acme", date(2024, 6, 3), date(2024, 6, 7), "2024.1").unwrap();
        period.state = PayrollState::Review;
        let period_id = period.id;
        for (offset, classification) in [
            Classification::Attend,
            Classification::Attend,
            Classification::Absent,
            Classification::PaidLeave,
            Classification::Attend,
        ]
        .into_iter()
        .enumerate()
        {
            let outcome = classification.outcome();
            let decision = AttendanceDecision {
                id: Uuid::new_v4(),
                period_id,
                employee_id: "emp_001".to_string(),
                date: date(2024, 6, 3 + offset as u32),
                classification,
                payable: outcome.payable,
                deduction_type: outcome.deduction_type,
                rule_version: "2024.1".to_string(),
                decided_at: Utc::now(),
            };
            store.decisions.insert(decision.id, decision);
        }
        store.periods.insert(period_id, period);
        (store, period_id)
    }

    #[test]
    fn test_finalize_creates_batch_rows_and_freezes_period() {
        let (mut store, period_id) = create_test_store();
        let now = Utc::now();

        let output = finalize_period(&mut store, &tax(), &owner(), period_id, now).unwrap();

        assert_eq!(output.rows.len(), 1);
        let row = &output.rows[0];
        assert_eq!(row.gross_amount, dec("8000000"));
        assert_eq!(row.deduction_amount, dec("200000"));
        assert_eq!(row.tax_amount, dec("80000"));
        assert_eq!(row.net_amount, dec("7800000"));
        assert_eq!(row.deductions[0].employer_amount, dec("370000"));
        assert_eq!(output.batch.total_amount, dec("7800000"));

        let period = store.period(period_id).unwrap();
        assert_eq!(period.state, PayrollState::Finalized);
        assert_eq!(period.finalized_by.as_deref(), Some("owner_001"));
        assert_eq!(period.finalized_at, Some(now));
        assert_eq!(store.batches.len(), 1);
        assert_eq!(store.batches[0].total_amount, dec("7800000"));
        assert_eq!(store.rows_for_batch(output.batch.id).count(), 1);
    }

    #[test]
    fn test_pending_override_blocks_finalize_and_writes_nothing() {
        let (mut store, period_id) = create_test_store();
        let decision_id = *store.decisions.keys().next().unwrap();
        let request = OverrideRequest {
            id: Uuid::new_v4(),
            decision_id,
            old_classification: Classification::Attend,
            proposed_classification: Classification::PaidSick,
            reason: "Clinic visit".to_string(),
            requested_by: "hr_001".to_string(),
            requested_at: Utc::now(),
            status: OverrideStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
        };
        store.override_requests.insert(request.id, request);

        let result = finalize_period(&mut store, &tax(), &owner(), period_id, Utc::now());

        match result {
            Err(EngineError::DomainRuleViolation { message }) => assert_eq!(
                message,
                "Cannot finalize payroll. There are 1 pending override request(s) that must be resolved first."
            ),
            other => panic!("expected DomainRuleViolation, got {:?}", other),
        }
        assert!(store.batches.is_empty());
        assert!(store.rows.is_empty());
        assert_eq!(store.period(period_id).unwrap().state, PayrollState::Review);
    }

    #[test]
    fn test_missing_company_rolls_back_batch() {
        let (mut store, period_id) = create_test_store();
        store.companies.clear();

        let result = finalize_period(&mut store, &tax(), &owner(), period_id, Utc::now());

        assert!(matches!(result, Err(EngineError::MissingContext { .. })));
        assert!(store.batches.is_empty());
        assert_eq!(store.period(period_id).unwrap().state, PayrollState::Review);
    }

    #[test]
    fn test_overflowing_salary_rolls_back_batch() {
        let (mut store, period_id) = create_test_store();
        store.compensations[0].base_salary = Decimal::MAX;

        let result = finalize_period(&mut store, &tax(), &owner(), period_id, Utc::now());

        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
        assert!(store.batches.is_empty());
        assert!(store.rows.is_empty());
        assert_eq!(store.period(period_id).unwrap().state, PayrollState::Review);
    }

    #[test]
    fn test_finalize_twice_is_invalid_state() {
        let (mut store, period_id) = create_test_store();
        finalize_period(&mut store, &tax(), &owner(), period_id, Utc::now()).unwrap();

        let result = finalize_period(&mut store, &tax(), &owner(), period_id, Utc::now());

        assert!(matches!(
            result,
            Err(EngineError::InvalidState {
                current: PayrollState::Finalized,
                ..
            })
        ));
        assert_eq!(store.batches.len(), 1);
    }

    #[test]
    fn test_hr_cannot_finalize() {
        let (mut store, period_id) = create_test_store();
        let hr = Actor {
            role: Role::Hr,
            ..owner()
        };
        let result = finalize_period(&mut store, &tax(), &hr, period_id, Utc::now());
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_deduction_type_of_absent_day_is_full() {
        let (store, period_id) = create_test_store();
        let absent = store
            .period_decisions(period_id)
            .find(|d| d.classification == Classification::Absent)
            .unwrap();
        assert_eq!(absent.deduction_type, DeductionType::Full);
        assert_eq!(store.payable_days(period_id, "emp_001"), 4);
    }
}
