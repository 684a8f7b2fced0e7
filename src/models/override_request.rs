//! Override request and override audit models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Classification;

/// Review status of an override request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideStatus {
    /// Awaiting an owner's decision.
    Pending,
    /// Approved; the decision was updated.
    Approved,
    /// Rejected; the decision was left untouched.
    Rejected,
}

/// How an owner resolves a pending override request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideResolution {
    /// Apply the proposed classification.
    Approve,
    /// Keep the current classification.
    Reject,
}

/// A proposed correction of one attendance decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The decision the request targets.
    pub decision_id: Uuid,
    /// Classification of the decision when the request was made.
    pub old_classification: Classification,
    /// Classification the requester wants applied.
    pub proposed_classification: Classification,
    /// Why the correction is needed.
    pub reason: String,
    /// Who requested the correction.
    pub requested_by: String,
    /// When the request was made.
    pub requested_at: DateTime<Utc>,
    /// Review status.
    pub status: OverrideStatus,
    /// Who reviewed the request.
    pub reviewed_by: Option<String>,
    /// When the request was reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer's note.
    pub review_note: Option<String>,
}

impl OverrideRequest {
    /// Returns true if the request blocks finalization.
    ///
    /// A request is unresolved while it is still pending, and also when it
    /// carries a terminal status without a review timestamp.
    pub fn is_unresolved(&self) -> bool {
        self.status == OverrideStatus::Pending || self.reviewed_at.is_none()
    }
}

/// Append-only audit row written when an override request is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceOverride {
    /// Unique identifier for the audit row.
    pub id: Uuid,
    /// The decision that was changed.
    pub decision_id: Uuid,
    /// The approved request.
    pub request_id: Uuid,
    /// Classification before the change.
    pub old_classification: Classification,
    /// Classification after the change.
    pub new_classification: Classification,
    /// Who approved the change.
    pub approved_by: String,
    /// When the change was applied.
    pub approved_at: DateTime<Utc>,
}
