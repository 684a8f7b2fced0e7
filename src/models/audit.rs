//! Audit trail models.
//!
//! Every calculation function emits an [`AuditStep`]; the steps of one payroll
//! row are collected into an [`AuditTrace`] so the computed amounts can be
//! explained after the fact.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "working_days".to_string(),
///     rule_name: "Working Days".to_string(),
///     input: serde_json::json!({"period_start": "2024-06-01"}),
///     output: serde_json::json!({"total_working_days": 20}),
///     reasoning: "20 weekdays in period".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The ordered audit steps of one computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
}

impl AuditTrace {
    /// Step number to assign to the next pushed step.
    pub fn next_step(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step.
    pub fn push(&mut self, step: AuditStep) {
        self.steps.push(step);
    }
}
