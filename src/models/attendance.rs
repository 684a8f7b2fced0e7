//! Attendance inputs and attendance decisions.
//!
//! Raw attendance, leave records, holidays and time corrections are produced by
//! upstream collaborators. The engine turns them into one [`AttendanceDecision`]
//! per employee-day. The classification → (payable, deduction type) mapping lives
//! in exactly one place, [`Classification::outcome`], and is shared by decision
//! generation and override approval.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an employee-day counts as worked, paid or unpaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    /// Clocked in.
    Attend,
    /// Clocked in late.
    Late,
    /// No attendance and no excuse.
    Absent,
    /// Approved paid leave.
    PaidLeave,
    /// Approved unpaid leave.
    UnpaidLeave,
    /// Paid sick leave.
    PaidSick,
    /// Unpaid sick leave.
    UnpaidSick,
    /// Company holiday that is paid.
    HolidayPaid,
    /// Company holiday that is not paid.
    HolidayUnpaid,
}

/// How much of a day's pay is withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeductionType {
    /// Nothing withheld.
    None,
    /// The whole day is withheld.
    Full,
}

/// The derived consequences of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    /// Whether the day counts towards the proration numerator.
    pub payable: bool,
    /// The deduction applied to the day.
    pub deduction_type: DeductionType,
}

impl Classification {
    /// All classifications, in declaration order.
    pub const ALL: [Classification; 9] = [
        Self::Attend,
        Self::Late,
        Self::Absent,
        Self::PaidLeave,
        Self::UnpaidLeave,
        Self::PaidSick,
        Self::UnpaidSick,
        Self::HolidayPaid,
        Self::HolidayUnpaid,
    ];

    /// Looks up the payable flag and deduction type for this classification.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{Classification, DeductionType};
    ///
    /// let outcome = Classification::UnpaidSick.outcome();
    /// assert!(!outcome.payable);
    /// assert_eq!(outcome.deduction_type, DeductionType::Full);
    /// ```
    pub const fn outcome(self) -> DayOutcome {
        match self {
            Self::Attend | Self::Late | Self::PaidLeave | Self::PaidSick | Self::HolidayPaid => {
                DayOutcome {
                    payable: true,
                    deduction_type: DeductionType::None,
                }
            }
            Self::Absent | Self::UnpaidLeave | Self::UnpaidSick | Self::HolidayUnpaid => {
                DayOutcome {
                    payable: false,
                    deduction_type: DeductionType::Full,
                }
            }
        }
    }

    /// Returns the string representation of the classification.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attend => "ATTEND",
            Self::Late => "LATE",
            Self::Absent => "ABSENT",
            Self::PaidLeave => "PAID_LEAVE",
            Self::UnpaidLeave => "UNPAID_LEAVE",
            Self::PaidSick => "PAID_SICK",
            Self::UnpaidSick => "UNPAID_SICK",
            Self::HolidayPaid => "HOLIDAY_PAID",
            Self::HolidayUnpaid => "HOLIDAY_UNPAID",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leave types recorded by the leave-approval collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveType {
    /// Paid leave.
    Paid,
    /// Unpaid leave.
    Unpaid,
    /// Paid sick leave.
    SickPaid,
    /// Unpaid sick leave.
    SickUnpaid,
}

impl LeaveType {
    /// The classification a day of this leave type receives.
    pub const fn classification(self) -> Classification {
        match self {
            Self::Paid => Classification::PaidLeave,
            Self::Unpaid => Classification::UnpaidLeave,
            Self::SickPaid => Classification::PaidSick,
            Self::SickUnpaid => Classification::UnpaidSick,
        }
    }
}

/// Review status of a raw attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// Captured, awaiting review.
    Pending,
    /// Reviewed and accepted.
    Approved,
    /// Reviewed and rejected.
    Rejected,
    /// Consumed by a payroll run; no longer editable.
    Locked,
}

/// A raw clock-in/clock-out record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttendance {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee's company.
    pub company_id: String,
    /// The employee.
    pub employee_id: String,
    /// The attendance date.
    pub date: NaiveDate,
    /// Clock-in time, if any.
    pub clock_in: Option<NaiveDateTime>,
    /// Clock-out time, if any.
    pub clock_out: Option<NaiveDateTime>,
    /// Review status.
    pub status: AttendanceStatus,
}

/// One day of approved leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// The employee on leave.
    pub employee_id: String,
    /// The leave date.
    pub date: NaiveDate,
    /// The kind of leave.
    pub leave_type: LeaveType,
}

/// A company holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The company observing the holiday.
    pub company_id: String,
    /// The holiday date.
    pub date: NaiveDate,
    /// The holiday name.
    pub name: String,
    /// Whether the day is paid.
    pub is_paid: bool,
}

/// An approved correction of an employee's clock-in for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCorrection {
    /// The corrected employee.
    pub employee_id: String,
    /// The corrected date.
    pub date: NaiveDate,
    /// The corrected clock-in, if one was established.
    pub corrected_clock_in: Option<NaiveDateTime>,
}

/// The classification of one employee-day within a period.
///
/// Keyed by `(period_id, employee_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDecision {
    /// Unique identifier for the decision.
    pub id: Uuid,
    /// The owning period.
    pub period_id: Uuid,
    /// The employee.
    pub employee_id: String,
    /// The classified date.
    pub date: NaiveDate,
    /// Why the day counts the way it does.
    pub classification: Classification,
    /// Derived from `classification`.
    pub payable: bool,
    /// Derived from `classification`.
    pub deduction_type: DeductionType,
    /// Rule version of the period at decision time.
    pub rule_version: String,
    /// When the classification was last decided.
    pub decided_at: DateTime<Utc>,
}

impl AttendanceDecision {
    /// Stamps a classification and its derived fields onto the decision.
    pub fn apply_classification(&mut self, classification: Classification, now: DateTime<Utc>) {
        let outcome = classification.outcome();
        self.classification = classification;
        self.payable = outcome.payable;
        self.deduction_type = outcome.deduction_type;
        self.decided_at = now;
    }
}
