//! Period lifecycle rules.
//!
//! Every operation that touches a period is a [`PeriodAction`], and every action
//! has exactly one [`ActionRule`] row: the states it may run in, the roles that
//! may run it, an optional precondition, and the state it moves the period to.
//! Transitions only ever move to a greater [`PayrollState`], so the lifecycle
//! cannot run backwards.
//!
//! Checks are evaluated in a fixed order: state, role, company, precondition.
//!
//! Operations that have no period lifecycle to check, such as opening a period
//! or previewing THR, are [`CompanyAction`]s governed by a [`CompanyRule`] row.
//! Both tables share one role and company check.

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, PayrollPeriod, PayrollState, Role};

/// An operation on a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodAction {
    /// Classify every employee-day of the period.
    GenerateDecisions,
    /// Move the period from DRAFT to REVIEW.
    SubmitForReview,
    /// Propose a change to one decision.
    RequestOverride,
    /// Approve or reject a proposed change.
    ResolveOverride,
    /// Add a one-off amount for an employee.
    AddAddition,
    /// Add a THR amount for an employee.
    CreateThrAddition,
    /// Compute pay and freeze the period.
    Finalize,
}

/// An operation authorized against a company rather than a period state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyAction {
    /// Open a new DRAFT period.
    CreatePeriod,
    /// Calculate THR for an employee without recording it.
    PreviewThr,
}

/// The authorization rule of one company action.
#[derive(Debug, Clone, Copy)]
pub struct CompanyRule {
    /// The governed action.
    pub action: CompanyAction,
    /// Name used in authorization errors.
    pub label: &'static str,
    /// Roles that may run the action.
    pub roles: &'static [Role],
    /// Role reported as required when the actor is unauthorized.
    pub required_role: Role,
}

/// A condition on the period's data checked after state and role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// At least one attendance decision exists.
    DecisionsGenerated,
    /// No override request is pending or unreviewed.
    OverridesResolved,
}

/// Facts about a period that preconditions are evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodFacts {
    /// Number of attendance decisions in the period.
    pub decision_count: usize,
    /// Number of unresolved override requests tied to the period.
    pub unresolved_overrides: usize,
}

/// The lifecycle rule of one action.
#[derive(Debug, Clone, Copy)]
pub struct ActionRule {
    /// The governed action.
    pub action: PeriodAction,
    /// Name used in authorization errors.
    pub label: &'static str,
    /// States the action may run in.
    pub allowed_states: &'static [PayrollState],
    /// State reported as required when the period is in the wrong state.
    pub reported_state: PayrollState,
    /// Roles that may run the action.
    pub roles: &'static [Role],
    /// Role reported as required when the actor is unauthorized.
    pub required_role: Role,
    /// Data condition checked last.
    pub precondition: Option<Precondition>,
    /// State the period moves to on success, if any.
    pub next_state: Option<PayrollState>,
}

const HR_OR_OWNER: &[Role] = &[Role::Hr, Role::Owner];
const OWNER_ONLY: &[Role] = &[Role::Owner];
const OPEN_STATES: &[PayrollState] = &[PayrollState::Draft, PayrollState::Review];

const GENERATE_DECISIONS: ActionRule = ActionRule {
    action: PeriodAction::GenerateDecisions,
    label: "prepare payroll",
    allowed_states: &[PayrollState::Draft],
    reported_state: PayrollState::Draft,
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
    precondition: None,
    next_state: None,
};

const SUBMIT_FOR_REVIEW: ActionRule = ActionRule {
    action: PeriodAction::SubmitForReview,
    label: "submit payroll for review",
    allowed_states: &[PayrollState::Draft],
    reported_state: PayrollState::Draft,
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
    precondition: Some(Precondition::DecisionsGenerated),
    next_state: Some(PayrollState::Review),
};

const REQUEST_OVERRIDE: ActionRule = ActionRule {
    action: PeriodAction::RequestOverride,
    label: "request override",
    allowed_states: OPEN_STATES,
    reported_state: PayrollState::Review,
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
    precondition: None,
    next_state: None,
};

const RESOLVE_OVERRIDE: ActionRule = ActionRule {
    action: PeriodAction::ResolveOverride,
    label: "approve override",
    allowed_states: &[PayrollState::Review],
    reported_state: PayrollState::Review,
    roles: OWNER_ONLY,
    required_role: Role::Owner,
    precondition: None,
    next_state: None,
};

const ADD_ADDITION: ActionRule = ActionRule {
    action: PeriodAction::AddAddition,
    label: "add payroll addition",
    allowed_states: OPEN_STATES,
    reported_state: PayrollState::Review,
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
    precondition: None,
    next_state: None,
};

const CREATE_THR_ADDITION: ActionRule = ActionRule {
    action: PeriodAction::CreateThrAddition,
    label: "create THR addition",
    allowed_states: OPEN_STATES,
    reported_state: PayrollState::Review,
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
    precondition: None,
    next_state: None,
};

const FINALIZE: ActionRule = ActionRule {
    action: PeriodAction::Finalize,
    label: "finalize payroll",
    allowed_states: &[PayrollState::Review],
    reported_state: PayrollState::Review,
    roles: OWNER_ONLY,
    required_role: Role::Owner,
    precondition: Some(Precondition::OverridesResolved),
    next_state: Some(PayrollState::Finalized),
};

const CREATE_PERIOD: CompanyRule = CompanyRule {
    action: CompanyAction::CreatePeriod,
    label: "create payroll period",
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
};

const PREVIEW_THR: CompanyRule = CompanyRule {
    action: CompanyAction::PreviewThr,
    label: "preview THR",
    roles: HR_OR_OWNER,
    required_role: Role::Hr,
};

impl CompanyAction {
    /// All company actions.
    pub const ALL: [CompanyAction; 2] = [Self::CreatePeriod, Self::PreviewThr];

    /// The authorization rule of this action.
    pub const fn rule(self) -> &'static CompanyRule {
        match self {
            Self::CreatePeriod => &CREATE_PERIOD,
            Self::PreviewThr => &PREVIEW_THR,
        }
    }
}

impl PeriodAction {
    /// All actions.
    pub const ALL: [PeriodAction; 7] = [
        Self::GenerateDecisions,
        Self::SubmitForReview,
        Self::RequestOverride,
        Self::ResolveOverride,
        Self::AddAddition,
        Self::CreateThrAddition,
        Self::Finalize,
    ];

    /// The lifecycle rule of this action.
    pub const fn rule(self) -> &'static ActionRule {
        match self {
            Self::GenerateDecisions => &GENERATE_DECISIONS,
            Self::SubmitForReview => &SUBMIT_FOR_REVIEW,
            Self::RequestOverride => &REQUEST_OVERRIDE,
            Self::ResolveOverride => &RESOLVE_OVERRIDE,
            Self::AddAddition => &ADD_ADDITION,
            Self::CreateThrAddition => &CREATE_THR_ADDITION,
            Self::Finalize => &FINALIZE,
        }
    }
}

/// Evaluates actions against the lifecycle table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodStateMachine;

impl PeriodStateMachine {
    /// Checks whether `actor` may run `action` on `period`.
    ///
    /// Returns the state the period must move to, if the action is a transition.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the period is not in an allowed state
    /// - `Unauthorized` if the actor lacks a permitted role or belongs to
    ///   another company
    /// - `DomainRuleViolation` if the precondition does not hold
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{Actor, PayrollPeriod, PayrollState, Role};
    /// use payroll_engine::workflow::{PeriodAction, PeriodFacts, PeriodStateMachine};
    /// use chrono::NaiveDate;
    ///
    /// let period = PayrollPeriod::new(
    ///     "acme",
    ///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    ///     "2024.1",
    /// ).unwrap();
    /// let hr = Actor { id: "hr_001".into(), role: Role::Hr, company_id: "acme".into() };
    /// let facts = PeriodFacts { decision_count: 30, unresolved_overrides: 0 };
    ///
    /// let next = PeriodStateMachine::evaluate(PeriodAction::SubmitForReview, &period, &hr, &facts).unwrap();
    /// assert_eq!(next, Some(PayrollState::Review));
    /// ```
    pub fn evaluate(
        action: PeriodAction,
        period: &PayrollPeriod,
        actor: &Actor,
        facts: &PeriodFacts,
    ) -> EngineResult<Option<PayrollState>> {
        let rule = action.rule();

        if !rule.allowed_states.contains(&period.state) {
            return Err(EngineError::InvalidState {
                current: period.state,
                required: rule.reported_state,
            });
        }

        check_actor(actor, rule.label, rule.roles, rule.required_role, &period.company_id)?;

        match rule.precondition {
            Some(Precondition::DecisionsGenerated) if facts.decision_count == 0 => {
                return Err(EngineError::rule_violation(
                    "Cannot submit for review: no attendance decisions have been generated.",
                ));
            }
            Some(Precondition::OverridesResolved) if facts.unresolved_overrides > 0 => {
                return Err(EngineError::rule_violation(format!(
                    "Cannot finalize payroll. There are {} pending override request(s) that must be resolved first.",
                    facts.unresolved_overrides
                )));
            }
            _ => {}
        }

        Ok(rule.next_state)
    }
}

impl PeriodStateMachine {
    /// Checks whether `actor` may run a company-scoped `action` for `company_id`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the actor lacks a permitted role or belongs to another
    /// company.
    pub fn authorize(action: CompanyAction, actor: &Actor, company_id: &str) -> EngineResult<()> {
        let rule = action.rule();
        check_actor(actor, rule.label, rule.roles, rule.required_role, company_id)
    }
}

/// Fails with `Unauthorized` unless the actor holds one of the rule's roles.
pub fn require_role(actor: &Actor, rule: &ActionRule) -> EngineResult<()> {
    require_any_role(actor, rule.label, rule.roles, rule.required_role)
}

fn require_any_role(
    actor: &Actor,
    label: &str,
    roles: &[Role],
    required_role: Role,
) -> EngineResult<()> {
    if actor.has_any_role(roles) {
        Ok(())
    } else {
        Err(EngineError::Unauthorized {
            action: label.to_string(),
            required_role,
        })
    }
}

fn check_actor(
    actor: &Actor,
    label: &str,
    roles: &[Role],
    required_role: Role,
    company_id: &str,
) -> EngineResult<()> {
    require_any_role(actor, label, roles, required_role)?;
    if actor.company_id != company_id {
        return Err(EngineError::Unauthorized {
            action: format!("{} for another company", label),
            required_role,
        });
    }
    Ok(())
}
