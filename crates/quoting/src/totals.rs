//! Cost aggregation: line totals and the quotation grand total.
//!
//! Money arithmetic here is fixed-point throughout: prices in integer cents,
//! discounts in basis points, intermediates widened to `i128`. Each line total
//! is rounded exactly once (half away from zero, the usual currency display
//! rounding); the grand total is the exact sum of those already-rounded line
//! totals. Summing rounded values rather than rounding one unrounded sum can
//! differ by a cent for some quantity/discount combinations - that is the
//! documented policy of this system, not an accident.

use quoteworks_core::{DiscountPercent, DomainError, DomainResult, Money};

const BPS_DENOMINATOR: i128 = 10_000;

/// Total for one line: `quantity × unit_price × (1 − discount)`, rounded to
/// cents.
///
/// Rejects a zero quantity, a negative unit price and a discount above 100%.
pub fn line_total(
    quantity: u32,
    unit_price: Money,
    discount: DiscountPercent,
) -> DomainResult<Money> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be at least 1"));
    }
    if unit_price.is_negative() {
        return Err(DomainError::validation("unit price cannot be negative"));
    }
    if !discount.is_valid() {
        return Err(DomainError::validation("discount cannot exceed 100%"));
    }

    let gross = (unit_price.cents() as i128) * (quantity as i128);
    let retained = BPS_DENOMINATOR - discount.basis_points() as i128;
    let scaled = gross
        .checked_mul(retained)
        .ok_or_else(|| DomainError::invariant("line total overflow"))?;

    let cents = div_round_half_away(scaled, BPS_DENOMINATOR);
    i64::try_from(cents)
        .map(Money::from_cents)
        .map_err(|_| DomainError::invariant("line total overflow"))
}

/// Sum of already-rounded line totals.
///
/// Inputs are exact cents, so the sum needs no further rounding - applying
/// this to its own output is a no-op.
pub fn grand_total(line_totals: impl IntoIterator<Item = Money>) -> Money {
    line_totals.into_iter().sum()
}

/// Divide rounding half away from zero. `denominator` must be positive.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    if numerator >= 0 {
        (numerator + denominator / 2) / denominator
    } else {
        (numerator - denominator / 2) / denominator
    }
}
