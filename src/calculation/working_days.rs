//! Working-day counting.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::AuditStep;

/// The result of counting working days, including the audit step.
#[derive(Debug, Clone)]
pub struct WorkingDaysResult {
    /// Number of Monday-to-Friday dates in the range.
    pub total_working_days: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Counts the Monday-to-Friday dates in `[start, end]`.
///
/// An empty range (end before start) has zero working days.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// // June 2024 starts on a Saturday and has 20 weekdays.
/// let result = count_working_days(
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
///     1,
/// );
/// assert_eq!(result.total_working_days, 20);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate, step_number: u32) -> WorkingDaysResult {
    let total_working_days = start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32;

    let audit_step = AuditStep {
        step_number,
        rule_id: "working_days".to_string(),
        rule_name: "Working Days".to_string(),
        input: serde_json::json!({
            "period_start": start.to_string(),
            "period_end": end.to_string()
        }),
        output: serde_json::json!({
            "total_working_days": total_working_days
        }),
        reasoning: format!(
            "{} weekday(s) between {} and {}",
            total_working_days, start, end
        ),
    };

    WorkingDaysResult {
        total_working_days,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_week() {
        // 2024-06-03 is a Monday
        let result = count_working_days(date(2024, 6, 3), date(2024, 6, 9), 1);
        assert_eq!(result.total_working_days, 5);
    }

    #[test]
    fn test_weekend_only_range_has_no_working_days() {
        let result = count_working_days(date(2024, 6, 1), date(2024, 6, 2), 1);
        assert_eq!(result.total_working_days, 0);
    }

    #[test]
    fn test_single_weekday() {
        let result = count_working_days(date(2024, 6, 5), date(2024, 6, 5), 1);
        assert_eq!(result.total_working_days, 1);
    }

    #[test]
    fn test_audit_step_records_count() {
        let result = count_working_days(date(2024, 6, 1), date(2024, 6, 30), 3);
        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "working_days");
        assert_eq!(result.audit_step.output["total_working_days"], 20);
    }
}
