//! Per-employee pay calculation.
//!
//! Chains the individual rules in order and collects their audit steps:
//! working days → proration → allowances → additions → deductions → tax → net.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::TaxConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, Employee, EmployeeCompensation, PayrollAddition, PayrollDeductionRule,
    PayrollRowAddition, PayrollRowDeduction,
};

use super::deduction::apply_deduction_rule;
use super::money::{checked_sum, round_currency};
use super::proration::prorate_base_salary;
use super::tax::calculate_withholding;
use super::working_days::count_working_days;

/// Everything needed to compute one employee's pay for a period.
#[derive(Debug, Clone)]
pub struct EmployeePayInput<'a> {
    /// The paid employee.
    pub employee: &'a Employee,
    /// The employee's active compensation.
    pub compensation: &'a EmployeeCompensation,
    /// First day of the period.
    pub period_start: NaiveDate,
    /// Last day of the period.
    pub period_end: NaiveDate,
    /// Number of payable attendance decisions in the period.
    pub payable_days: u32,
    /// Additions for the employee in the period.
    pub additions: &'a [PayrollAddition],
    /// Deduction rules active for the company.
    pub deduction_rules: &'a [PayrollDeductionRule],
}

/// Computed amounts for one employee.
#[derive(Debug, Clone)]
pub struct EmployeePay {
    /// Prorated base plus allowances plus additions.
    pub gross_amount: Decimal,
    /// Sum of employee deduction amounts.
    pub deduction_amount: Decimal,
    /// Withholding tax.
    pub tax_amount: Decimal,
    /// Amount paid out.
    pub net_amount: Decimal,
    /// One line item per applied deduction rule.
    pub deductions: Vec<PayrollRowDeduction>,
    /// One line item per addition.
    pub additions: Vec<PayrollRowAddition>,
    /// How the amounts were derived.
    pub audit_trace: AuditTrace,
}

/// Computes gross, deductions, tax and net for one employee.
///
/// Tax is always computed and stored; it only reduces net when
/// `tax_config.reduces_net` is set.
///
/// # Errors
///
/// Propagates tax table errors, and returns `CalculationError` if any amount
/// overflows.
pub fn calculate_employee_pay(
    input: &EmployeePayInput<'_>,
    tax_config: &TaxConfig,
) -> EngineResult<EmployeePay> {
    let mut trace = AuditTrace::default();
    let base_salary = input.compensation.base_salary;

    let working_days = count_working_days(input.period_start, input.period_end, trace.next_step());
    trace.push(working_days.audit_step);

    let proration = prorate_base_salary(
        base_salary,
        input.payable_days,
        working_days.total_working_days,
        trace.next_step(),
    )?;
    trace.push(proration.audit_step);

    let allowances = input
        .compensation
        .total_allowances()
        .ok_or_else(|| EngineError::overflow("allowances"))?;
    trace.push(AuditStep {
        step_number: trace.next_step(),
        rule_id: "allowances".to_string(),
        rule_name: "Fixed Allowances".to_string(),
        input: serde_json::json!(input
            .compensation
            .allowances
            .iter()
            .map(|(name, amount)| (name.clone(), amount.normalize().to_string()))
            .collect::<std::collections::BTreeMap<_, _>>()),
        output: serde_json::json!({ "total_allowances": allowances.normalize().to_string() }),
        reasoning: format!(
            "{} allowance(s) totalling {}",
            input.compensation.allowances.len(),
            allowances.normalize()
        ),
    });

    let additions: Vec<PayrollRowAddition> = input
        .additions
        .iter()
        .map(|addition| PayrollRowAddition {
            addition_id: addition.id,
            code: addition.code,
            amount: addition.amount,
            description: addition.description.clone(),
        })
        .collect();
    let additions_total = checked_sum(additions.iter().map(|a| a.amount))
        .ok_or_else(|| EngineError::overflow("additions"))?;
    trace.push(AuditStep {
        step_number: trace.next_step(),
        rule_id: "additions".to_string(),
        rule_name: "Payroll Additions".to_string(),
        input: serde_json::json!(additions
            .iter()
            .map(|a| serde_json::json!({
                "code": a.code.as_str(),
                "amount": a.amount.normalize().to_string()
            }))
            .collect::<Vec<_>>()),
        output: serde_json::json!({ "total_additions": additions_total.normalize().to_string() }),
        reasoning: format!(
            "{} addition(s) totalling {}",
            additions.len(),
            additions_total.normalize()
        ),
    });

    let gross_amount = checked_sum([proration.prorated_base, allowances, additions_total])
        .map(round_currency)
        .ok_or_else(|| EngineError::overflow("gross"))?;

    let mut deductions = Vec::with_capacity(input.deduction_rules.len());
    for rule in input.deduction_rules {
        let result = apply_deduction_rule(rule, base_salary, gross_amount, trace.next_step())?;
        trace.push(result.audit_step);
        deductions.push(result.deduction);
    }
    let deduction_amount = checked_sum(deductions.iter().map(|d| d.employee_amount))
        .ok_or_else(|| EngineError::overflow("deductions"))?;

    let tax = calculate_withholding(
        gross_amount,
        input.employee.tax_status.as_deref(),
        tax_config,
        trace.next_step(),
    )?;
    trace.push(tax.audit_step);
    let tax_amount = tax.tax_amount;

    let withheld = if tax_config.reduces_net {
        checked_sum([deduction_amount, tax_amount])
    } else {
        Some(deduction_amount)
    };
    let net_amount = withheld
        .and_then(|withheld| gross_amount.checked_sub(withheld))
        .ok_or_else(|| EngineError::overflow("net"))?;
    trace.push(AuditStep {
        step_number: trace.next_step(),
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross": gross_amount.normalize().to_string(),
            "deductions": deduction_amount.normalize().to_string(),
            "tax": tax_amount.normalize().to_string(),
            "tax_reduces_net": tax_config.reduces_net
        }),
        output: serde_json::json!({ "net": net_amount.normalize().to_string() }),
        reasoning: if tax_config.reduces_net {
            format!(
                "{} - {} - {} = {}",
                gross_amount.normalize(),
                deduction_amount.normalize(),
                tax_amount.normalize(),
                net_amount.normalize()
            )
        } else {
            format!(
                "{} - {} = {} (tax {} recorded separately)",
                gross_amount.normalize(),
                deduction_amount.normalize(),
                net_amount.normalize(),
                tax_amount.normalize()
            )
        },
    });

    Ok(EmployeePay {
        gross_amount,
        deduction_amount,
        tax_amount,
        net_amount,
        deductions,
        additions,
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TaxBracket, TaxCategory};
    use crate::models::{AdditionCode, DeductionBasis, EmployeeStatus};
    use chrono::Utc;
    use std::collections::{BTreeMap, HashMap};
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_tax(rate: &str, reduces_net: bool) -> TaxConfig {
        TaxConfig {
            default_status: "TK/0".to_string(),
            status_categories: HashMap::from([("TK/0".to_string(), TaxCategory::A)]),
            default_category: TaxCategory::A,
            brackets: BTreeMap::from([(
                TaxCategory::A,
                vec![TaxBracket {
                    up_to: None,
                    rate: dec(rate),
                }],
            )]),
            reduces_net,
        }
    }

    fn create_test_employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            company_id: "acme".to_string(),
            name: "Budi".to_string(),
            status: EmployeeStatus::Active,
            join_date: date(2023, 1, 1),
            resign_date: None,
            tax_status: Some("TK/0".to_string()),
            employee_type: None,
        }
    }

    fn create_test_compensation() -> EmployeeCompensation {
        EmployeeCompensation {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            base_salary: dec("6000000"),
            allowances: BTreeMap::from([("transport".to_string(), dec("500000"))]),
            effective_from: date(2023, 1, 1),
            effective_to: None,
        }
    }

    fn create_test_rule() -> PayrollDeductionRule {
        PayrollDeductionRule {
            id: Uuid::new_v4(),
            company_id: "acme".to_string(),
            code: "JHT".to_string(),
            name: "Old-age security".to_string(),
            basis: DeductionBasis::BaseSalary,
            employee_rate: dec("2"),
            employer_rate: dec("3.7"),
            salary_cap: None,
            effective_from: date(2024, 1, 1),
            effective_to: None,
        }
    }

    fn create_test_addition() -> PayrollAddition {
        PayrollAddition {
            id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            code: AdditionCode::Bonus,
            amount: dec("250000"),
            description: "Quarterly bonus".to_string(),
            created_by: "hr_001".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_calculation_chain() {
        let employee = create_test_employee();
        let compensation = create_test_compensation();
        let rules = vec![create_test_rule()];
        let additions = vec![create_test_addition()];

        // June 2024 has 20 working days
        let input = EmployeePayInput {
            employee: &employee,
            compensation: &compensation,
            period_start: date(2024, 6, 1),
            period_end: date(2024, 6, 30),
            payable_days: 10,
            additions: &additions,
            deduction_rules: &rules,
        };

        let pay = calculate_employee_pay(&input, &flat_tax("1", false)).unwrap();

        // 3,000,000 prorated + 500,000 allowance + 250,000 bonus
        assert_eq!(pay.gross_amount, dec("3750000"));
        // 2% of unprorated base 6,000,000
        assert_eq!(pay.deduction_amount, dec("120000"));
        assert_eq!(pay.tax_amount, dec("37500"));
        // tax is informational
        assert_eq!(pay.net_amount, dec("3630000"));
        assert_eq!(pay.deductions.len(), 1);
        assert_eq!(pay.additions.len(), 1);
    }

    #[test]
    fn test_overflowing_additions_are_an_error() {
        let employee = create_test_employee();
        let compensation = create_test_compensation();
        let huge = PayrollAddition {
            amount: Decimal::MAX,
            ..create_test_addition()
        };
        let additions = vec![huge.clone(), huge];

        let input = EmployeePayInput {
            employee: &employee,
            compensation: &compensation,
            period_start: date(2024, 6, 1),
            period_end: date(2024, 6, 30),
            payable_days: 20,
            additions: &additions,
            deduction_rules: &[],
        };

        match calculate_employee_pay(&input, &flat_tax("1", false)) {
            Err(EngineError::CalculationError { message }) => {
                assert_eq!(message, "additions is out of range")
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }
    }

    #[test]
    fn test_tax_reduces_net_when_configured() {
        let employee = create_test_employee();
        let compensation = create_test_compensation();

        let input = EmployeePayInput {
            employee: &employee,
            compensation: &compensation,
            period_start: date(2024, 6, 1),
            period_end: date(2024, 6, 30),
            payable_days: 20,
            additions: &[],
            deduction_rules: &[],
        };

        let pay = calculate_employee_pay(&input, &flat_tax("2", true)).unwrap();

        assert_eq!(pay.gross_amount, dec("6500000"));
        assert_eq!(pay.tax_amount, dec("130000"));
        assert_eq!(pay.net_amount, dec("6370000"));
    }

    #[test]
    fn test_audit_trace_steps_are_ordered() {
        let employee = create_test_employee();
        let compensation = create_test_compensation();
        let rules = vec![create_test_rule()];

        let input = EmployeePayInput {
            employee: &employee,
            compensation: &compensation,
            period_start: date(2024, 6, 1),
            period_end: date(2024, 6, 30),
            payable_days: 20,
            additions: &[],
            deduction_rules: &rules,
        };

        let pay = calculate_employee_pay(&input, &flat_tax("0", false)).unwrap();
        let rule_ids: Vec<_> = pay
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();

        assert_eq!(
            rule_ids,
            vec![
                "working_days",
                "base_proration",
                "allowances",
                "additions",
                "deduction:JHT",
                "withholding_tax",
                "net_pay"
            ]
        );
        for (index, step) in pay.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
    }
}
