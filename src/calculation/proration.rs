//! Base salary proration by payable days.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::money::{checked_ratio, round_currency};

/// The result of prorating a base salary, including the audit step.
#[derive(Debug, Clone)]
pub struct ProrationResult {
    /// The prorated base salary, rounded to currency scale.
    pub prorated_base: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Scales `base_salary` by `payable_days / total_working_days`.
///
/// When the period contains no working days the base salary is paid in full.
///
/// # Errors
///
/// Returns `CalculationError` if the product overflows.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::prorate_base_salary;
/// use rust_decimal::Decimal;
///
/// let result = prorate_base_salary(Decimal::new(6_000_000, 0), 10, 20, 1).unwrap();
/// assert_eq!(result.prorated_base, Decimal::new(3_000_000, 0));
/// ```
pub fn prorate_base_salary(
    base_salary: Decimal,
    payable_days: u32,
    total_working_days: u32,
    step_number: u32,
) -> EngineResult<ProrationResult> {
    let (prorated_base, reasoning) = if total_working_days > 0 {
        let prorated = checked_ratio(
            base_salary,
            Decimal::from(payable_days),
            Decimal::from(total_working_days),
        )
        .map(round_currency)
        .ok_or_else(|| EngineError::overflow("prorated base salary"))?;
        (
            prorated,
            format!(
                "({} / {}) x {} = {}",
                payable_days,
                total_working_days,
                base_salary.normalize(),
                prorated.normalize()
            ),
        )
    } else {
        (
            base_salary,
            "No working days in period - full base salary paid".to_string(),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_proration".to_string(),
        rule_name: "Base Salary Proration".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.normalize().to_string(),
            "payable_days": payable_days,
            "total_working_days": total_working_days
        }),
        output: serde_json::json!({
            "prorated_base": prorated_base.normalize().to_string()
        }),
        reasoning,
    };

    Ok(ProrationResult {
        prorated_base,
        audit_step,
    })
}
