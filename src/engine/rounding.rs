// ==========================================
// CAERS Core - Significant Figures Policy
// ==========================================

use crate::engine::error::{CalculationError, CalculationResult};
use rust_decimal::{Decimal, RoundingStrategy};

/// Significant figures kept on every calculated total
pub const EMISSIONS_PRECISION: u32 = 6;

/// Digits in the unscaled value (zero counts as one digit)
pub fn precision(value: Decimal) -> u32 {
    let mut mantissa = value.mantissa().unsigned_abs();
    let mut digits = 1;
    while mantissa >= 10 {
        mantissa /= 10;
        digits += 1;
    }
    digits
}

/// Rounds half-up to at most `max_precision` significant figures.
///
/// Values already within the limit are returned untouched; trailing
/// zeros are never added. Rounding left of the decimal point keeps
/// the magnitude (1234567 at 6 figures is 1234570). Rounding up past
/// `Decimal::MAX` is an `Overflow`.
pub fn set_significant_figures(value: Decimal, max_precision: u32) -> CalculationResult<Decimal> {
    let digits = precision(value);
    if digits <= max_precision {
        return Ok(value);
    }

    let new_scale = value.scale() as i64 - (digits - max_precision) as i64;
    if new_scale >= 0 {
        return Ok(value.round_dp_with_strategy(new_scale as u32, RoundingStrategy::MidpointAwayFromZero));
    }

    let shift = Decimal::from_i128_with_scale(10i128.pow((-new_scale) as u32), 0);
    let rounded = (value / shift).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.checked_mul(shift).ok_or(CalculationError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_precision_counts_unscaled_digits() {
        assert_eq!(precision(dec!(0)), 1);
        assert_eq!(precision(dec!(123.45)), 5);
        assert_eq!(precision(dec!(0.00012)), 2);
        assert_eq!(precision(dec!(-9999)), 4);
    }

    #[test]
    fn test_short_values_untouched() {
        let value = dec!(20.5);
        let rounded = set_significant_figures(value, EMISSIONS_PRECISION).unwrap();
        assert_eq!(rounded, value);
        assert_eq!(rounded.scale(), 1);
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(set_significant_figures(dec!(1.23456789), 6).unwrap(), dec!(1.23457));
        assert_eq!(set_significant_figures(dec!(0.0001234565), 6).unwrap(), dec!(0.000123457));
        assert_eq!(set_significant_figures(dec!(-2.0000005), 6).unwrap(), dec!(-2.00000));
    }

    #[test]
    fn test_rounds_left_of_decimal_point() {
        assert_eq!(set_significant_figures(dec!(1234567), 6).unwrap(), dec!(1234570));
        assert_eq!(set_significant_figures(dec!(1234567.89), 6).unwrap(), dec!(1234570));
    }

    #[test]
    fn test_rounding_up_past_max_is_overflow() {
        // 79228162514264337593543950335 rounds up to 792282 x 10^23
        assert!(matches!(
            set_significant_figures(Decimal::MAX, EMISSIONS_PRECISION),
            Err(CalculationError::Overflow)
        ));
        assert!(matches!(
            set_significant_figures(Decimal::MIN, EMISSIONS_PRECISION),
            Err(CalculationError::Overflow)
        ));
    }

    #[test]
    fn test_rounding_down_near_max_succeeds() {
        // 7922816251426433759354395033 rounds down to 792282 x 10^22
        let value = Decimal::MAX / dec!(10);
        let rounded = set_significant_figures(value.trunc(), EMISSIONS_PRECISION).unwrap();
        assert_eq!(rounded, Decimal::from_i128_with_scale(7922820000000000000000000000, 0));
    }
}
