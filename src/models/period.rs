//! Payroll period and company models.
//!
//! This module contains the [`PayrollPeriod`] type that owns every decision,
//! override request and batch of one payroll run, and the [`PayrollState`]
//! lifecycle it moves through.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle state of a payroll period.
///
/// Variants are declared in lifecycle order, so `Ord` reflects progression:
/// a transition is only ever legal towards a greater state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollState {
    /// Initial state; decisions may be (re)generated.
    Draft,
    /// Decisions are frozen except through approved overrides.
    Review,
    /// Terminal; the period and everything it owns is immutable.
    Finalized,
}

impl PayrollState {
    /// Returns the string representation of the state.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Review => "REVIEW",
            Self::Finalized => "FINALIZED",
        }
    }
}

impl std::fmt::Display for PayrollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company whose employees are paid through payroll periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique identifier for the company.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A payroll period for one company.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollPeriod, PayrollState};
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod::new(
///     "acme",
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
///     "2024.1",
/// )
/// .unwrap();
///
/// assert_eq!(period.state, PayrollState::Draft);
/// assert_eq!(period.dates().count(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Unique identifier for the period.
    pub id: Uuid,
    /// The owning company.
    pub company_id: String,
    /// First day of the period (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the period (inclusive).
    pub period_end: NaiveDate,
    /// Current lifecycle state.
    pub state: PayrollState,
    /// Rule version snapshotted onto every decision generated for this period.
    pub rule_version: String,
    /// When the period was submitted for review.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Who finalized the period.
    pub finalized_by: Option<String>,
    /// When the period was finalized.
    pub finalized_at: Option<DateTime<Utc>>,
}

impl PayrollPeriod {
    /// Creates a new DRAFT period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `period_end` is before `period_start`.
    pub fn new(
        company_id: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        rule_version: impl Into<String>,
    ) -> EngineResult<Self> {
        if period_end < period_start {
            return Err(EngineError::invalid_input(
                "period_end",
                format!("{} is before period_start {}", period_end, period_start),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            company_id: company_id.into(),
            period_start,
            period_end,
            state: PayrollState::Draft,
            rule_version: rule_version.into(),
            reviewed_at: None,
            finalized_by: None,
            finalized_at: None,
        })
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.period_start && date <= self.period_end
    }

    /// Iterates over every calendar date of the period.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.period_start
            .iter_days()
            .take_while(move |date| *date <= self.period_end)
    }

    /// Returns true once the period has been finalized.
    pub fn is_finalized(&self) -> bool {
        self.state == PayrollState::Finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_period_starts_in_draft() {
        let period = PayrollPeriod::new("acme", date(2024, 6, 1), date(2024, 6, 30), "v1").unwrap();
        assert_eq!(period.state, PayrollState::Draft);
        assert!(period.reviewed_at.is_none());
        assert!(period.finalized_at.is_none());
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let result = PayrollPeriod::new("acme", date(2024, 6, 30), date(2024, 6, 1), "v1");
        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "period_end"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_single_day_period_is_allowed() {
        let period = PayrollPeriod::new("acme", date(2024, 6, 3), date(2024, 6, 3), "v1").unwrap();
        assert_eq!(period.dates().collect::<Vec<_>>(), vec![date(2024, 6, 3)]);
    }

    #[test]
    fn test_contains_date_is_inclusive() {
        let period = PayrollPeriod::new("acme", date(2024, 6, 1), date(2024, 6, 30), "v1").unwrap();
        assert!(period.contains_date(date(2024, 6, 1)));
        assert!(period.contains_date(date(2024, 6, 30)));
        assert!(!period.contains_date(date(2024, 7, 1)));
        assert!(!period.contains_date(date(2024, 5, 31)));
    }

    #[test]
    fn test_state_order_follows_lifecycle() {
        assert!(PayrollState::Draft < PayrollState::Review);
        assert!(PayrollState::Review < PayrollState::Finalized);
    }

    #[test]
    fn test_state_serialization() {
        assert_eq!(
            serde_json::to_string(&PayrollState::Finalized).unwrap(),
            "\"FINALIZED\""
        );
        let state: PayrollState = serde_json::from_str("\"REVIEW\"").unwrap();
        assert_eq!(state, PayrollState::Review);
    }
}
