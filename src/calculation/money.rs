//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of every stored monetary amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds an amount to [`CURRENCY_SCALE`] places, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    round_to(amount, CURRENCY_SCALE)
}

/// Rounds an amount to `scale` places, half away from zero.
pub fn round_to(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Sums amounts, or `None` if the total does not fit in a `Decimal`.
pub fn checked_sum<I>(amounts: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
}

/// Computes `amount x numerator / denominator`.
///
/// Returns `None` on overflow or a zero denominator.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::checked_ratio;
/// use rust_decimal::Decimal;
///
/// let half = checked_ratio(Decimal::new(5_000_000, 0), Decimal::from(6), Decimal::from(12));
/// assert_eq!(half, Some(Decimal::new(2_500_000, 0)));
/// assert_eq!(checked_ratio(Decimal::MAX, Decimal::from(6), Decimal::from(12)), None);
/// ```
pub fn checked_ratio(amount: Decimal, numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    amount.checked_mul(numerator)?.checked_div(denominator)
}
