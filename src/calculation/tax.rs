//! Monthly withholding tax using effective-rate brackets.

use rust_decimal::Decimal;

use crate::config::{TaxCategory, TaxConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::AuditStep;

use super::money::{checked_ratio, round_to};

/// The result of computing withholding tax, including the audit step.
#[derive(Debug, Clone)]
pub struct TaxResult {
    /// Tax withheld, rounded to whole currency units.
    pub tax_amount: Decimal,
    /// Category the taxpayer status mapped to.
    pub category: TaxCategory,
    /// Effective rate applied, in percent.
    pub rate: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Maps a taxpayer status to its category.
///
/// Missing statuses fall back to the configured default status, and statuses
/// absent from the map fall back to the default category.
pub fn tax_category(tax_status: Option<&str>, config: &TaxConfig) -> TaxCategory {
    let status = tax_status.unwrap_or(&config.default_status);
    config
        .status_categories
        .get(status)
        .copied()
        .unwrap_or(config.default_category)
}

/// Computes withholding tax on `gross`.
///
/// The rate is taken from the first bracket of the category whose `up_to` is at
/// least `gross`; an open bracket matches everything. Non-positive gross is not
/// taxed.
///
/// # Errors
///
/// Returns `CalculationError` if the category has no bracket covering `gross`,
/// or if the tax amount overflows.
pub fn calculate_withholding(
    gross: Decimal,
    tax_status: Option<&str>,
    config: &TaxConfig,
    step_number: u32,
) -> EngineResult<TaxResult> {
    let category = tax_category(tax_status, config);

    let rate = if gross <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        config
            .brackets
            .get(&category)
            .and_then(|brackets| {
                brackets
                    .iter()
                    .find(|bracket| bracket.up_to.is_none_or(|up_to| gross <= up_to))
            })
            .map(|bracket| bracket.rate)
            .ok_or_else(|| EngineError::CalculationError {
                message: format!(
                    "no tax bracket in category {} covers gross {}",
                    category.as_str(),
                    gross
                ),
            })?
    };

    let tax_amount = checked_ratio(gross, rate, Decimal::ONE_HUNDRED)
        .map(|tax| round_to(tax, 0))
        .ok_or_else(|| EngineError::overflow("withholding tax"))?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "withholding_tax".to_string(),
        rule_name: "Withholding Tax".to_string(),
        input: serde_json::json!({
            "gross": gross.normalize().to_string(),
            "tax_status": tax_status
        }),
        output: serde_json::json!({
            "category": category.as_str(),
            "rate": rate.normalize().to_string(),
            "tax_amount": tax_amount.normalize().to_string()
        }),
        reasoning: format!(
            "Category {}: {} x {}% = {}",
            category.as_str(),
            gross.normalize(),
            rate.normalize(),
            tax_amount.normalize()
        ),
    };

    Ok(TaxResult {
        tax_amount,
        category,
        rate,
        audit_step,
    })
}
