//! THR (statutory holiday allowance) calculation.
//!
//! THR is computed from tenure and employee type, independently of the monthly
//! payroll run:
//!
//! | Type                | Amount                                             |
//! |---------------------|----------------------------------------------------|
//! | permanent           | `min(months, 12) / 12 x base`, 0 under one month   |
//! | contract            | `months / 12 x base`, 0 under one month            |
//! | daily / freelance   | `days / basis x base`                              |
//!
//! The daily basis is 365 calendar days or the configured working days per year
//! (see [`ThrDayBasis`]).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ThrDayBasis, ThrSettings};
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeTenure, EmployeeType};

use super::money::{checked_ratio, round_currency};

const CALENDAR_DAYS_IN_YEAR: u32 = 365;

/// How a THR amount was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrMethod {
    /// Permanent employee with twelve or more months.
    PermanentFull,
    /// Permanent employee with one to eleven months.
    PermanentProrated,
    /// Contract employee with at least one month.
    ContractProrated,
    /// Daily or freelance employee paid by days worked.
    DailyProrated,
    /// Not entitled to THR.
    Ineligible,
}

/// Inputs of one THR calculation.
#[derive(Debug, Clone)]
pub struct ThrInput {
    /// First day of employment.
    pub join_date: NaiveDate,
    /// Resignation date, if any.
    pub resign_date: Option<NaiveDate>,
    /// Date THR is computed for.
    pub calculation_date: NaiveDate,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Employment arrangement.
    pub employee_type: EmployeeType,
    /// Overrides the configured working days per year.
    pub working_days_in_year: Option<u32>,
}

/// The outcome of one THR calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrResult {
    /// THR amount rounded to currency scale.
    pub amount: Decimal,
    /// The base salary the amount was derived from.
    pub base_salary: Decimal,
    /// Tenure snapshot at the calculation date.
    pub tenure: EmployeeTenure,
    /// How the amount was derived.
    pub calculation_method: ThrMethod,
    /// Human-readable explanation.
    pub note: String,
    /// True when the amount is positive.
    pub eligible: bool,
}

/// Calculates THR for one employee.
///
/// # Errors
///
/// Returns `InvalidInput` if the calculation date is before the join date, if
/// the working-day basis is selected with zero working days per year, or if the
/// base salary is too large for the amount to be represented.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{ThrInput, ThrMethod, calculate_thr};
/// use payroll_engine::config::ThrSettings;
/// use payroll_engine::models::EmployeeType;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let input = ThrInput {
///     join_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     resign_date: None,
///     calculation_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
///     base_salary: Decimal::new(5_000_000, 0),
///     employee_type: EmployeeType::Permanent,
///     working_days_in_year: None,
/// };
///
/// let result = calculate_thr(&input, &ThrSettings::default()).unwrap();
/// assert_eq!(result.amount, Decimal::new(2_500_000, 0));
/// assert_eq!(result.calculation_method, ThrMethod::PermanentProrated);
/// assert!(result.eligible);
/// ```
pub fn calculate_thr(input: &ThrInput, settings: &ThrSettings) -> EngineResult<ThrResult> {
    if input.calculation_date < input.join_date {
        return Err(EngineError::invalid_input(
            "calculation_date",
            format!(
                "{} is before join date {}",
                input.calculation_date, input.join_date
            ),
        ));
    }

    let tenure =
        EmployeeTenure::from_dates(input.join_date, input.calculation_date, input.resign_date);
    let base = input.base_salary;
    let twelve = Decimal::from(12);

    let (raw_amount, method) = match input.employee_type {
        EmployeeType::Permanent if !tenure.has_worked_at_least_one_month() => {
            (Some(Decimal::ZERO), ThrMethod::Ineligible)
        }
        EmployeeType::Permanent if tenure.has_worked_full_year() => {
            (Some(base), ThrMethod::PermanentFull)
        }
        EmployeeType::Permanent => (
            checked_ratio(base, Decimal::from(tenure.months_worked), twelve),
            ThrMethod::PermanentProrated,
        ),
        EmployeeType::Contract if !tenure.has_worked_at_least_one_month() => {
            (Some(Decimal::ZERO), ThrMethod::Ineligible)
        }
        EmployeeType::Contract => (
            checked_ratio(base, Decimal::from(tenure.months_worked), twelve),
            ThrMethod::ContractProrated,
        ),
        EmployeeType::Daily | EmployeeType::Freelance => {
            let divisor = day_divisor(input, settings)?;
            if tenure.days_worked > 0 {
                (
                    checked_ratio(base, Decimal::from(tenure.days_worked), Decimal::from(divisor)),
                    ThrMethod::DailyProrated,
                )
            } else {
                (Some(Decimal::ZERO), ThrMethod::Ineligible)
            }
        }
    };

    let amount = raw_amount.map(round_currency).ok_or_else(|| {
        EngineError::invalid_input(
            "base_salary",
            format!("THR amount for base salary {} is out of range", base),
        )
    })?;
    let eligible = amount > Decimal::ZERO;
    let calculation_method = if eligible { method } else { ThrMethod::Ineligible };
    let note = calculation_note(input, settings, &tenure, amount, calculation_method);

    Ok(ThrResult {
        amount,
        base_salary: base,
        tenure,
        calculation_method,
        note,
        eligible,
    })
}

fn day_divisor(input: &ThrInput, settings: &ThrSettings) -> EngineResult<u32> {
    match settings.day_basis {
        ThrDayBasis::CalendarYear => Ok(CALENDAR_DAYS_IN_YEAR),
        ThrDayBasis::WorkingDays => {
            let days = input
                .working_days_in_year
                .unwrap_or(settings.working_days_in_year);
            if days == 0 {
                return Err(EngineError::invalid_input(
                    "working_days_in_year",
                    "must be positive",
                ));
            }
            Ok(days)
        }
    }
}

fn calculation_note(
    input: &ThrInput,
    settings: &ThrSettings,
    tenure: &EmployeeTenure,
    amount: Decimal,
    method: ThrMethod,
) -> String {
    let employee_type = input.employee_type;
    let resigned = if tenure.is_resigned { " (resigned)" } else { "" };
    let base = input.base_salary.normalize();

    match method {
        ThrMethod::Ineligible => format!(
            "{}{} - not eligible for THR (tenure under one month)",
            employee_type, resigned
        ),
        ThrMethod::PermanentFull => format!(
            "{}{} - full THR ({} months worked), base salary {}",
            employee_type, resigned, tenure.months_worked, base
        ),
        ThrMethod::PermanentProrated | ThrMethod::ContractProrated => format!(
            "{}{} - THR = ({} months / 12) x {} = {}",
            employee_type,
            resigned,
            tenure.months_worked,
            base,
            amount.normalize()
        ),
        ThrMethod::DailyProrated => {
            let divisor = match settings.day_basis {
                ThrDayBasis::CalendarYear => CALENDAR_DAYS_IN_YEAR,
                ThrDayBasis::WorkingDays => input
                    .working_days_in_year
                    .unwrap_or(settings.working_days_in_year),
            };
            format!(
                "{}{} - THR = ({} days / {}) x {} = {}",
                employee_type,
                resigned,
                tenure.days_worked,
                divisor,
                base,
                amount.normalize()
            )
        }
    }
}

/// Per-employee outcome of a batch THR calculation.
#[derive(Debug, Clone, Serialize)]
pub struct ThrBatchEntry {
    /// The employee the calculation was for.
    pub employee_id: String,
    /// The result, or the error message if the calculation failed.
    pub outcome: Result<ThrResult, String>,
}

/// Calculates THR for many employees independently.
///
/// A failing employee is recorded and the rest of the batch continues.
pub fn calculate_thr_batch<'a, I>(inputs: I, settings: &ThrSettings) -> Vec<ThrBatchEntry>
where
    I: IntoIterator<Item = (&'a str, ThrInput)>,
{
    inputs
        .into_iter()
        .map(|(employee_id, input)| ThrBatchEntry {
            employee_id: employee_id.to_string(),
            outcome: calculate_thr(&input, settings).map_err(|e| e.to_string()),
        })
        .collect()
}
