//! Decimal amounts and their integer minor-unit representation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Minor units per major unit for every supported currency.
pub const MINOR_SCALE: u32 = 2;

/// `12.345` becomes `1234` and `12.355` becomes `1236` (banker's rounding).
/// `None` when out of range.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount.checked_mul(Decimal::ONE_HUNDRED)?.round().to_i64()
}

#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MINOR_SCALE)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(to_minor_units(Decimal::new(1999, 2)), Some(1999));
        assert_eq!(to_minor_units(Decimal::new(5, 0)), Some(500));
        assert_eq!(from_minor_units(1250), Decimal::new(1250, 2));
        assert_eq!(from_minor_units(0), Decimal::ZERO);
    }

    #[test]
    fn rounds_sub_cent_amounts() {
        assert_eq!(to_minor_units(Decimal::new(10_005, 3)), Some(1000));
        assert_eq!(to_minor_units(Decimal::new(10_015, 3)), Some(1002));
        assert_eq!(to_minor_units(Decimal::new(12_345, 3)), Some(1234));
        assert_eq!(to_minor_units(Decimal::new(12_355, 3)), Some(1236));
    }
}
