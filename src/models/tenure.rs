//! Employment tenure value object.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Elapsed employment between a join date and an effective end date.
///
/// The end date is the calculation date, or the resignation date when that is
/// earlier. Months are whole completed months: a month only counts once the
/// end date reaches the join date's day-of-month.
///
/// # Example
///
/// ```
/// use payroll_engine::models::EmployeeTenure;
/// use chrono::NaiveDate;
///
/// let tenure = EmployeeTenure::from_dates(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
///     None,
/// );
/// assert_eq!(tenure.months_worked, 6);
/// assert!(!tenure.is_resigned);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTenure {
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Effective end of the measured tenure.
    pub end_date: NaiveDate,
    /// Whole months between the start and end dates.
    pub months_worked: u32,
    /// Calendar days between the start and end dates.
    pub days_worked: i64,
    /// Whether the end date comes from a resignation.
    pub is_resigned: bool,
}

impl EmployeeTenure {
    /// Measures tenure as of `calculation_date`.
    pub fn from_dates(
        join_date: NaiveDate,
        calculation_date: NaiveDate,
        resign_date: Option<NaiveDate>,
    ) -> Self {
        let (end_date, is_resigned) = match resign_date {
            Some(resigned) if resigned < calculation_date => (resigned, true),
            _ => (calculation_date, false),
        };

        Self {
            start_date: join_date,
            end_date,
            months_worked: whole_months_between(join_date, end_date),
            days_worked: (end_date - join_date).num_days().max(0),
            is_resigned,
        }
    }

    /// Returns true once at least one whole month has elapsed.
    pub fn has_worked_at_least_one_month(&self) -> bool {
        self.months_worked >= 1
    }

    /// Returns true once twelve or more whole months have elapsed.
    pub fn has_worked_full_year(&self) -> bool {
        self.months_worked >= 12
    }

    /// Months worked over twelve, capped at one.
    pub fn proration_factor(&self) -> Decimal {
        Decimal::from(self.months_worked.min(12)) / Decimal::from(12)
    }
}

fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months =
        (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_partial_month_does_not_count() {
        let tenure = EmployeeTenure::from_dates(date(2024, 1, 15), date(2024, 2, 14), None);
        assert_eq!(tenure.months_worked, 0);
        assert!(!tenure.has_worked_at_least_one_month());
        assert_eq!(tenure.days_worked, 30);
    }

    #[test]
    fn test_month_counts_on_same_day_of_month() {
        let tenure = EmployeeTenure::from_dates(date(2024, 1, 15), date(2024, 2, 15), None);
        assert_eq!(tenure.months_worked, 1);
    }

    #[test]
    fn test_months_span_years() {
        let tenure = EmployeeTenure::from_dates(date(2022, 11, 1), date(2024, 1, 1), None);
        assert_eq!(tenure.months_worked, 14);
        assert!(tenure.has_worked_full_year());
        assert_eq!(tenure.proration_factor(), Decimal::ONE);
    }

    #[test]
    fn test_earlier_resignation_ends_tenure() {
        let tenure = EmployeeTenure::from_dates(
            date(2024, 1, 1),
            date(2024, 12, 1),
            Some(date(2024, 4, 1)),
        );
        assert!(tenure.is_resigned);
        assert_eq!(tenure.end_date, date(2024, 4, 1));
        assert_eq!(tenure.months_worked, 3);
    }

    #[test]
    fn test_later_resignation_is_ignored() {
        let tenure = EmployeeTenure::from_dates(
            date(2024, 1, 1),
            date(2024, 7, 1),
            Some(date(2024, 9, 1)),
        );
        assert!(!tenure.is_resigned);
        assert_eq!(tenure.months_worked, 6);
        assert_eq!(tenure.proration_factor(), Decimal::new(5, 1));
    }

    #[test]
    fn test_same_day_is_zero_tenure() {
        let tenure = EmployeeTenure::from_dates(date(2024, 3, 1), date(2024, 3, 1), None);
        assert_eq!(tenure.months_worked, 0);
        assert_eq!(tenure.days_worked, 0);
    }
}
