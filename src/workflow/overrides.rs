//! Override requests and their resolution.
//!
//! An hr or owner user proposes a new classification for one decision; an owner
//! approves or rejects it while the period is in REVIEW. Approval rewrites the
//! decision and appends exactly one [`AttendanceOverride`] row. Rejection leaves
//! the decision untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AttendanceOverride, Classification, OverrideRequest, OverrideResolution,
    OverrideStatus,
};
use crate::store::PayrollStore;

use super::state_machine::{PeriodAction, PeriodStateMachine};

/// The result of resolving an override request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideOutcome {
    /// The request after resolution.
    pub request: OverrideRequest,
    /// The audit row written on approval.
    pub applied: Option<AttendanceOverride>,
}

/// Records a PENDING request to change a decision's classification.
///
/// # Errors
///
/// - `NotFound` if the decision or its period does not exist
/// - `InvalidInput` if `reason` is blank
/// - `InvalidState` unless the period is DRAFT or REVIEW
/// - `Unauthorized` unless the actor is hr or owner of the period's company
pub fn request_override(
    store: &mut PayrollStore,
    actor: &Actor,
    decision_id: Uuid,
    proposed: Classification,
    reason: &str,
    now: DateTime<Utc>,
) -> EngineResult<OverrideRequest> {
    store.transaction(|tx| {
        let decision = tx.decision(decision_id)?.clone();
        let period = tx.period(decision.period_id)?;
        PeriodStateMachine::evaluate(
            PeriodAction::RequestOverride,
            period,
            actor,
            &tx.period_facts(decision.period_id),
        )?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(EngineError::invalid_input("reason", "must not be empty"));
        }

        let request = OverrideRequest {
            id: Uuid::new_v4(),
            decision_id,
            old_classification: decision.classification,
            proposed_classification: proposed,
            reason: reason.to_string(),
            requested_by: actor.id.clone(),
            requested_at: now,
            status: OverrideStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
        };
        tx.override_requests.insert(request.id, request.clone());

        info!(
            request_id = %request.id,
            decision_id = %decision_id,
            from = %decision.classification,
            to = %proposed,
            actor = %actor.id,
            "Override requested"
        );
        Ok(request)
    })
}

/// Approves or rejects a PENDING override request.
///
/// The request status is checked before the period state, so resolving an
/// already resolved request reports the status rather than the period.
///
/// # Errors
///
/// - `NotFound` if the request, its decision or its period does not exist
/// - `DomainRuleViolation` unless the request is PENDING
/// - `InvalidState` unless the period is REVIEW
/// - `Unauthorized` unless the actor is owner of the period's company
pub fn resolve_override(
    store: &mut PayrollStore,
    actor: &Actor,
    request_id: Uuid,
    resolution: OverrideResolution,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<OverrideOutcome> {
    store.transaction(|tx| {
        let request = tx.override_request(request_id)?.clone();
        if request.status != OverrideStatus::Pending {
            return Err(EngineError::rule_violation(format!(
                "Cannot approve/reject override request: status is {}",
                status_label(request.status)
            )));
        }

        let decision = tx.decision(request.decision_id)?.clone();
        let period = tx.period(decision.period_id)?;
        PeriodStateMachine::evaluate(
            PeriodAction::ResolveOverride,
            period,
            actor,
            &tx.period_facts(decision.period_id),
        )?;

        let applied = match resolution {
            OverrideResolution::Approve => {
                let row = AttendanceOverride {
                    id: Uuid::new_v4(),
                    decision_id: decision.id,
                    request_id,
                    old_classification: decision.classification,
                    new_classification: request.proposed_classification,
                    approved_by: actor.id.clone(),
                    approved_at: now,
                };
                if let Some(stored) = tx.decisions.get_mut(&decision.id) {
                    stored.apply_classification(request.proposed_classification, now);
                }
                tx.overrides.push(row.clone());
                Some(row)
            }
            OverrideResolution::Reject => None,
        };

        let resolved = tx
            .override_requests
            .get_mut(&request_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "Override request",
                id: request_id.to_string(),
            })?;
        resolved.status = match resolution {
            OverrideResolution::Approve => OverrideStatus::Approved,
            OverrideResolution::Reject => OverrideStatus::Rejected,
        };
        resolved.reviewed_by = Some(actor.id.clone());
        resolved.reviewed_at = Some(now);
        resolved.review_note = note.map(str::to_string);
        let request = resolved.clone();

        info!(
            request_id = %request_id,
            decision_id = %decision.id,
            status = status_label(request.status),
            actor = %actor.id,
            "Override resolved"
        );
        Ok(OverrideOutcome { request, applied })
    })
}

fn status_label(status: OverrideStatus) -> &'static str {
    match status {
        OverrideStatus::Pending => "PENDING",
        OverrideStatus::Approved => "APPROVED",
        OverrideStatus::Rejected => "REJECTED",
    }
}
