//! Period creation and submission for review.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{Actor, PayrollPeriod};
use crate::store::PayrollStore;

use super::state_machine::{CompanyAction, PeriodAction, PeriodStateMachine};

/// Opens a new DRAFT period for the actor's company.
///
/// # Errors
///
/// - `Unauthorized` unless the actor is hr or owner of `company_id`
/// - `NotFound` if the company does not exist
/// - `InvalidInput` if the period ends before it starts
pub fn create_period(
    store: &mut PayrollStore,
    actor: &Actor,
    company_id: &str,
    period_start: NaiveDate,
    period_end: NaiveDate,
    rule_version: &str,
) -> EngineResult<PayrollPeriod> {
    PeriodStateMachine::authorize(CompanyAction::CreatePeriod, actor, company_id)?;

    store.transaction(|tx| {
        tx.company(company_id)?;
        let period = PayrollPeriod::new(company_id, period_start, period_end, rule_version)?;
        tx.periods.insert(period.id, period.clone());

        info!(
            period_id = %period.id,
            company_id = %company_id,
            period_start = %period_start,
            period_end = %period_end,
            "Payroll period created"
        );
        Ok(period)
    })
}

/// Moves a DRAFT period to REVIEW and stamps `reviewed_at`.
///
/// # Errors
///
/// - `InvalidState` unless the period is DRAFT
/// - `Unauthorized` unless the actor is hr or owner of the period's company
/// - `DomainRuleViolation` if no decisions have been generated
pub fn submit_for_review(
    store: &mut PayrollStore,
    actor: &Actor,
    period_id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<PayrollPeriod> {
    store.transaction(|tx| {
        let facts = tx.period_facts(period_id);
        let period = tx.period_mut(period_id)?;
        let next = PeriodStateMachine::evaluate(PeriodAction::SubmitForReview, period, actor, &facts)?;

        if let Some(state) = next {
            period.state = state;
        }
        period.reviewed_at = Some(now);

        info!(
            period_id = %period_id,
            actor = %actor.id,
            decisions = facts.decision_count,
            "Payroll period submitted for review"
        );
        Ok(period.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{
        AttendanceDecision, Classification, Company, DeductionType, PayrollState, Role,
    };

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

    fn create_test_store() -> PayrollStore {
        let mut store = PayrollStore::new();
        store.companies.push(Company {
            id: "acme".to_string(),
            name: "Acme".to_string(),
        });
        store
    }

    #[test]
    fn test_create_period_starts_in_draft() {
        let mut store = create_test_store();
        let period =
            create_period(&mut store, &hr(), "acme", date(2024, 6, 1), date(2024, 6, 30), "2024.1")
                .unwrap();

        assert_eq!(period.state, PayrollState::Draft);
        assert_eq!(period.rule_version, "2024.1");
        assert!(store.periods.contains_key(&period.id));
    }

    #[test]
    fn test_create_period_for_unknown_company_is_not_found() {
        let mut store = create_test_store();
        let actor = Actor {
            company_id: "globex".to_string(),
            ..hr()
        };
        let result =
            create_period(&mut store, &actor, "globex", date(2024, 6, 1), date(2024, 6, 30), "v1");

        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert!(store.periods.is_empty());
    }

    #[test]
    fn test_employee_cannot_create_period() {
        let mut store = create_test_store();
        let actor = Actor {
            role: Role::Employee,
            ..hr()
        };
        let result =
            create_period(&mut store, &actor, "acme", date(2024, 6, 1), date(2024, 6, 30), "v1");
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_owner_of_another_company_cannot_create_period() {
        let mut store = create_test_store();
        let actor = Actor {
            role: Role::Owner,
            company_id: "globex".to_string(),
            ..hr()
        };
        let result =
            create_period(&mut store, &actor, "acme", date(2024, 6, 1), date(2024, 6, 30), "v1");

        match result {
            Err(EngineError::Unauthorized { action, .. }) => {
                assert_eq!(action, "create payroll period for another company")
            }
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
        assert!(store.periods.is_empty());
    }

    #[test]
    fn test_submit_for_review_stamps_reviewed_at() {
        let mut store = create_test_store();
        let period =
            create_period(&mut store, &hr(), "acme", date(2024, 6, 1), date(2024, 6, 30), "v1")
                .unwrap();
        let decision = AttendanceDecision {
            id: Uuid::new_v4(),
            period_id: period.id,
            employee_id: "emp_001".to_string(),
            date: date(2024, 6, 3),
            classification: Classification::Attend,
            payable: true,
            deduction_type: DeductionType::None,
            rule_version: "v1".to_string(),
            decided_at: Utc::now(),
        };
        store.decisions.insert(decision.id, decision);

        let now = Utc::now();
        let reviewed = submit_for_review(&mut store, &hr(), period.id, now).unwrap();

        assert_eq!(reviewed.state, PayrollState::Review);
        assert_eq!(reviewed.reviewed_at, Some(now));
        assert_eq!(store.period(period.id).unwrap().state, PayrollState::Review);
    }

    #[test]
    fn test_submit_without_decisions_leaves_period_in_draft() {
        let mut store = create_test_store();
        let period =
            create_period(&mut store, &hr(), "acme", date(2024, 6, 1), date(2024, 6, 30), "v1")
                .unwrap();

        let result = submit_for_review(&mut store, &hr(), period.id, Utc::now());

        assert!(matches!(result, Err(EngineError::DomainRuleViolation { .. })));
        let stored = store.period(period.id).unwrap();
        assert_eq!(stored.state, PayrollState::Draft);
        assert!(stored.reviewed_at.is_none());
    }
}
