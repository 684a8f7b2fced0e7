//! Employee compensation records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A time-bounded salary record.
///
/// A record is active while `effective_to` is unset. When several are active the
/// one with the latest `effective_from` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCompensation {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The compensated employee.
    pub employee_id: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Fixed monthly allowances by name.
    #[serde(default)]
    pub allowances: BTreeMap<String, Decimal>,
    /// First day the record applies.
    pub effective_from: NaiveDate,
    /// Last day the record applies; unset while active.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl EmployeeCompensation {
    /// Returns true while the record has no end date.
    pub fn is_active(&self) -> bool {
        self.effective_to.is_none()
    }

    /// Sum of all allowances, or `None` if it does not fit in a `Decimal`.
    pub fn total_allowances(&self) -> Option<Decimal> {
        self.allowances
            .values()
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_allowances() {
        let compensation = EmployeeCompensation {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            base_salary: dec("6000000"),
            allowances: BTreeMap::from([
                ("transport".to_string(), dec("500000")),
                ("meal".to_string(), dec("250000.50")),
            ]),
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: None,
        };
        assert!(compensation.is_active());
        assert_eq!(compensation.total_allowances(), Some(dec("750000.50")));
    }

    #[test]
    fn test_no_allowances_sum_to_zero() {
        let compensation = EmployeeCompensation {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            base_salary: dec("6000000"),
            allowances: BTreeMap::new(),
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
        };
        assert!(!compensation.is_active());
        assert_eq!(compensation.total_allowances(), Some(Decimal::ZERO));
    }
}
