use rust_decimal::Decimal;

/// `numerator / denominator * 100`, or zero when the denominator is zero.
pub fn percentage_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator / denominator * Decimal::ONE_HUNDRED
}
