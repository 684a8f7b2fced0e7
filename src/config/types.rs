//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::EmployeeType;

/// Engine-wide settings from `engine.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// Rule version stamped onto new periods and their decisions.
    pub rule_version: String,
}

/// Withholding category a taxpayer status maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaxCategory {
    /// Single filers and married filers without dependants.
    A,
    /// Filers with one or two dependants.
    B,
    /// Married filers with three dependants.
    C,
}

impl TaxCategory {
    /// Returns the string representation of the category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

/// One row of an effective-rate table.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound of gross; open-ended when unset.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Effective rate in percent.
    pub rate: Decimal,
}

/// Withholding tax configuration from `tax.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxConfig {
    /// Status assumed for employees without one.
    pub default_status: String,
    /// Taxpayer status to category.
    pub status_categories: HashMap<String, TaxCategory>,
    /// Category used for statuses missing from `status_categories`.
    pub default_category: TaxCategory,
    /// Bracket tables per category, in ascending `up_to` order.
    pub brackets: BTreeMap<TaxCategory, Vec<TaxBracket>>,
    /// Whether tax is subtracted from net pay.
    #[serde(default)]
    pub reduces_net: bool,
}

/// Which denominator the daily THR formula divides by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrDayBasis {
    /// Divide days worked by 365.
    #[default]
    CalendarYear,
    /// Divide days worked by the configured working days per year.
    WorkingDays,
}

/// THR settings from `thr.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ThrSettings {
    /// Day basis for daily and freelance employees.
    #[serde(default)]
    pub day_basis: ThrDayBasis,
    /// Working days per year for [`ThrDayBasis::WorkingDays`].
    #[serde(default = "default_working_days_in_year")]
    pub working_days_in_year: u32,
    /// Type assumed for employees without one.
    #[serde(default = "default_employee_type")]
    pub default_employee_type: EmployeeType,
}

fn default_working_days_in_year() -> u32 {
    260
}

fn default_employee_type() -> EmployeeType {
    EmployeeType::Permanent
}

impl Default for ThrSettings {
    fn default() -> Self {
        Self {
            day_basis: ThrDayBasis::default(),
            working_days_in_year: default_working_days_in_year(),
            default_employee_type: default_employee_type(),
        }
    }
}

/// The complete payroll configuration.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    /// Engine-wide settings.
    pub engine: EngineSettings,
    /// Withholding tax tables.
    pub tax: TaxConfig,
    /// THR settings.
    pub thr: ThrSettings,
}
