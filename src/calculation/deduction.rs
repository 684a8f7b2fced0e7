//! Deduction rule application.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, DeductionBasis, PayrollDeductionRule, PayrollRowDeduction};

use super::money::{checked_ratio, round_currency};

/// The result of applying one deduction rule, including the audit step.
#[derive(Debug, Clone)]
pub struct DeductionResult {
    /// The line item, with a snapshot of the rule.
    pub deduction: PayrollRowDeduction,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Resolves the salary figure a rule's rates apply to.
///
/// A capped rule without a configured cap uses the full base salary.
pub fn deduction_basis_amount(
    rule: &PayrollDeductionRule,
    base_salary: Decimal,
    gross: Decimal,
) -> Decimal {
    match rule.basis {
        DeductionBasis::BaseSalary => base_salary,
        DeductionBasis::CappedSalary => match rule.salary_cap {
            Some(cap) => base_salary.min(cap),
            None => base_salary,
        },
        DeductionBasis::GrossSalary => gross,
    }
}

/// Applies a deduction rule to one employee's pay.
///
/// Both amounts are `round(basis x rate / 100, 2)`.
///
/// # Errors
///
/// Returns `CalculationError` if an amount overflows.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_deduction_rule;
/// use payroll_engine::models::{DeductionBasis, PayrollDeductionRule};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let rule = PayrollDeductionRule {
///     id: Uuid::new_v4(),
///     company_id: "acme".to_string(),
///     code: "JP".to_string(),
///     name: "Pension".to_string(),
///     basis: DeductionBasis::BaseSalary,
///     employee_rate: Decimal::ONE,
///     employer_rate: Decimal::new(2, 0),
///     salary_cap: None,
///     effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     effective_to: None,
/// };
///
/// let result =
///     apply_deduction_rule(&rule, Decimal::new(10_000_000, 0), Decimal::new(10_000_000, 0), 1)
///         .unwrap();
/// assert_eq!(result.deduction.employee_amount, Decimal::new(100_000, 0));
/// ```
pub fn apply_deduction_rule(
    rule: &PayrollDeductionRule,
    base_salary: Decimal,
    gross: Decimal,
    step_number: u32,
) -> EngineResult<DeductionResult> {
    let basis_amount = deduction_basis_amount(rule, base_salary, gross);
    let rate_of = |rate: Decimal| {
        checked_ratio(basis_amount, rate, Decimal::ONE_HUNDRED)
            .map(round_currency)
            .ok_or_else(|| EngineError::overflow(format!("deduction {}", rule.code)))
    };
    let employee_amount = rate_of(rule.employee_rate)?;
    let employer_amount = rate_of(rule.employer_rate)?;

    let audit_step = AuditStep {
        step_number,
        rule_id: format!("deduction:{}", rule.code),
        rule_name: rule.name.clone(),
        input: serde_json::json!({
            "basis": rule.basis.as_str(),
            "base_salary": base_salary.normalize().to_string(),
            "gross": gross.normalize().to_string(),
            "salary_cap": rule.salary_cap.map(|cap| cap.normalize().to_string()),
            "employee_rate": rule.employee_rate.normalize().to_string(),
            "employer_rate": rule.employer_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "basis_amount": basis_amount.normalize().to_string(),
            "employee_amount": employee_amount.normalize().to_string(),
            "employer_amount": employer_amount.normalize().to_string()
        }),
        reasoning: format!(
            "{} x {}% = {} (employee), {} x {}% = {} (employer)",
            basis_amount.normalize(),
            rule.employee_rate.normalize(),
            employee_amount.normalize(),
            basis_amount.normalize(),
            rule.employer_rate.normalize(),
            employer_amount.normalize()
        ),
    };

    Ok(DeductionResult {
        deduction: PayrollRowDeduction {
            code: rule.code.clone(),
            basis_amount,
            employee_amount,
            employer_amount,
            rule_snapshot: rule.into(),
        },
        audit_step,
    })
}
