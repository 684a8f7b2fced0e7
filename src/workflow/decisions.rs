//! Attendance decision generation.
//!
//! Classifies every (employee, date) of a DRAFT period. Precedence is fixed:
//! leave, then holiday, then attendance. A day with a clock-in (raw or
//! corrected) is ATTEND; anything else is ABSENT.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{
    Actor, AttendanceDecision, AttendanceStatus, Classification, Holiday, LeaveRecord,
    RawAttendance, TimeCorrection,
};
use crate::store::PayrollStore;

use super::state_machine::{PeriodAction, PeriodStateMachine};

/// Counts reported after generating decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// The period decisions were generated for.
    pub period_id: Uuid,
    /// Employees classified.
    pub employees: usize,
    /// Decisions created.
    pub created: usize,
    /// Existing decisions rewritten.
    pub updated: usize,
    /// Decisions kept because an approved override was applied to them.
    ///
    /// Overrides are approved only in REVIEW and generation runs only in
    /// DRAFT, and a period never moves back to DRAFT. Through the workflow
    /// this is therefore always zero; it is non-zero only for a store seeded
    /// with override rows on a DRAFT period.
    pub preserved_overrides: usize,
    /// Raw attendance rows moved to LOCKED.
    pub locked_attendance: usize,
}

/// Classifies one employee-day.
///
/// # Examples
///
/// ```
/// use payroll_engine::models::{Classification, Holiday};
/// use payroll_engine::workflow::classify_day;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     company_id: "acme".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(),
///     name: "Eid al-Adha".to_string(),
///     is_paid: true,
/// };
/// assert_eq!(classify_day(None, Some(&holiday), None, None), Classification::HolidayPaid);
/// assert_eq!(classify_day(None, None, None, None), Classification::Absent);
/// ```
pub fn classify_day(
    leave: Option<&LeaveRecord>,
    holiday: Option<&Holiday>,
    attendance: Option<&RawAttendance>,
    correction: Option<&TimeCorrection>,
) -> Classification {
    if let Some(leave) = leave {
        return leave.leave_type.classification();
    }

    if let Some(holiday) = holiday {
        return if holiday.is_paid {
            Classification::HolidayPaid
        } else {
            Classification::HolidayUnpaid
        };
    }

    let clock_in = correction
        .and_then(|c| c.corrected_clock_in)
        .or_else(|| attendance.and_then(|a| a.clock_in));

    match clock_in {
        Some(_) => Classification::Attend,
        None => Classification::Absent,
    }
}

/// Generates (or regenerates) the decisions of a DRAFT period and locks the
/// company's raw attendance inside the period.
///
/// Decisions are upserted by (employee, date). A decision that an approved
/// override was applied to is never overwritten, although the lifecycle
/// keeps approvals and generation in different states (see
/// [`GenerationSummary::preserved_overrides`]).
///
/// # Errors
///
/// - `NotFound` if the period does not exist
/// - `InvalidState` unless the period is DRAFT
/// - `Unauthorized` unless the actor is hr or owner of the period's company
pub fn generate_decisions(
    store: &mut PayrollStore,
    actor: &Actor,
    period_id: Uuid,
    now: DateTime<Utc>,
) -> EngineResult<GenerationSummary> {
    store.transaction(|tx| {
        let period = tx.period(period_id)?.clone();
        PeriodStateMachine::evaluate(
            PeriodAction::GenerateDecisions,
            &period,
            actor,
            &tx.period_facts(period_id),
        )?;

        let company_id = period.company_id.as_str();
        let dates: Vec<NaiveDate> = period.dates().collect();

        let leaves: HashMap<(&str, NaiveDate), &LeaveRecord> = tx
            .leave_records
            .iter()
            .filter(|l| period.contains_date(l.date))
            .map(|l| ((l.employee_id.as_str(), l.date), l))
            .collect();
        let holidays: HashMap<NaiveDate, &Holiday> = tx
            .holidays
            .iter()
            .filter(|h| h.company_id == company_id && period.contains_date(h.date))
            .map(|h| (h.date, h))
            .collect();
        let attendance: HashMap<(&str, NaiveDate), &RawAttendance> = tx
            .raw_attendance
            .iter()
            .filter(|a| period.contains_date(a.date))
            .map(|a| ((a.employee_id.as_str(), a.date), a))
            .collect();
        let corrections: HashMap<(&str, NaiveDate), &TimeCorrection> = tx
            .time_corrections
            .iter()
            .filter(|c| period.contains_date(c.date))
            .map(|c| ((c.employee_id.as_str(), c.date), c))
            .collect();

        let mut classified = Vec::new();
        let mut employees = 0;
        for employee in tx.company_employees(company_id) {
            employees += 1;
            for date in &dates {
                let key = (employee.id.as_str(), *date);
                let classification = classify_day(
                    leaves.get(&key).copied(),
                    holidays.get(date).copied(),
                    attendance.get(&key).copied(),
                    corrections.get(&key).copied(),
                );
                if classification == Classification::Absent {
                    debug!(employee_id = %employee.id, date = %date, "Absence detected");
                }
                classified.push((employee.id.clone(), *date, classification));
            }
        }

        let existing: HashMap<(String, NaiveDate), Uuid> = tx
            .period_decisions(period_id)
            .map(|d| ((d.employee_id.clone(), d.date), d.id))
            .collect();

        let mut summary = GenerationSummary {
            period_id,
            employees,
            created: 0,
            updated: 0,
            preserved_overrides: 0,
            locked_attendance: 0,
        };

        for (employee_id, date, classification) in classified {
            match existing.get(&(employee_id.clone(), date)) {
                Some(decision_id) if tx.has_override(*decision_id) => {
                    summary.preserved_overrides += 1;
                }
                Some(decision_id) => {
                    if let Some(decision) = tx.decisions.get_mut(decision_id) {
                        decision.apply_classification(classification, now);
                        decision.rule_version = period.rule_version.clone();
                        summary.updated += 1;
                    }
                }
                None => {
                    let outcome = classification.outcome();
                    let decision = AttendanceDecision {
                        id: Uuid::new_v4(),
                        period_id,
                        employee_id,
                        date,
                        classification,
                        payable: outcome.payable,
                        deduction_type: outcome.deduction_type,
                        rule_version: period.rule_version.clone(),
                        decided_at: now,
                    };
                    tx.decisions.insert(decision.id, decision);
                    summary.created += 1;
                }
            }
        }

        for record in tx.raw_attendance.iter_mut().filter(|a| {
            a.company_id == period.company_id
                && period.contains_date(a.date)
                && matches!(a.status, AttendanceStatus::Pending | AttendanceStatus::Approved)
        }) {
            record.status = AttendanceStatus::Locked;
            summary.locked_attendance += 1;
        }

        info!(
            period_id = %period_id,
            actor = %actor.id,
            employees = summary.employees,
            created = summary.created,
            updated = summary.updated,
            preserved_overrides = summary.preserved_overrides,
            locked_attendance = summary.locked_attendance,
            "Attendance decisions generated"
        );
        Ok(summary)
    })
}
