//! Binary fixed-point decoding.
//!
//! A fixed-point field stores `value * 2^fractional_bits` as an integer. The
//! quotient is always a terminating decimal (`1 / 2^k == 5^k / 10^k`), so the
//! exact value is built with integer arithmetic and never goes through an
//! `f64` division.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::config::OverflowPolicy;

const F64_MANTISSA_BITS: u64 = 53;
// Smallest exponent whose power of two is a normal `f64`.
const F64_MIN_NORMAL_EXP: i32 = f64::MIN_EXP - 1;
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Largest scale `decode` accepts. Wider scales decode to the sentinel.
pub const MAX_FRACTIONAL_BITS: u32 = 128;

/// Result of decoding a fixed-point field.
#[derive(Debug, Clone, PartialEq)]
pub enum DecimalValue {
    /// The quotient, exactly representable as an `f64`.
    Number(f64),
    /// The exact quotient in plain decimal notation.
    Fallback(String),
    /// Decode gave up; rendered as `null`.
    Sentinel,
}

impl DecimalValue {
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Whole numbers within `max_safe_integer` become JSON integers so that
    /// `2^48 / 2^48` serializes as `1` rather than `1.0`. Anything a 64-bit
    /// JSON integer cannot hold stays an `f64`.
    pub fn to_json(&self, max_safe_integer: u64) -> serde_json::Value {
        match self {
            Self::Number(v) => whole_number(*v, max_safe_integer).unwrap_or_else(|| {
                serde_json::Number::from_f64(*v)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }),
            Self::Fallback(s) => serde_json::Value::String(s.clone()),
            Self::Sentinel => serde_json::Value::Null,
        }
    }
}

fn whole_number(v: f64, max_safe_integer: u64) -> Option<serde_json::Value> {
    if v.fract() != 0.0 {
        return None;
    }
    if (0.0..TWO_POW_64).contains(&v) {
        let n = v as u64;
        (n <= max_safe_integer).then(|| serde_json::Value::from(n))
    } else if (-TWO_POW_63..0.0).contains(&v) {
        let n = v as i64;
        (n.unsigned_abs() <= max_safe_integer).then(|| serde_json::Value::from(n))
    } else {
        None
    }
}

/// Exact decimal value of `bits / 2^fractional_bits`.
pub fn fixed_point_to_decimal(bits: &BigInt, fractional_bits: u32) -> BigDecimal {
    let digits = bits * BigInt::from(5_u8).pow(fractional_bits);
    BigDecimal::new(digits, i64::from(fractional_bits)).normalized()
}

/// `bits / 2^fractional_bits` as an `f64`, or `None` when the conversion would
/// round.
pub fn exact_f64(bits: &BigInt, fractional_bits: u32) -> Option<f64> {
    let Some(shift) = bits.trailing_zeros() else {
        return Some(0.0);
    };
    let mantissa = bits >> shift;
    if mantissa.bits() > F64_MANTISSA_BITS {
        return None;
    }
    let mantissa = mantissa.to_i64()?;
    let exponent = i32::try_from(shift).ok()? - i32::try_from(fractional_bits).ok()?;
    if exponent < F64_MIN_NORMAL_EXP {
        return None;
    }
    let value = mantissa as f64 * 2_f64.powi(exponent);
    value.is_finite().then_some(value)
}

pub fn decode(bits: &BigInt, fractional_bits: u32, policy: OverflowPolicy) -> DecimalValue {
    if fractional_bits > MAX_FRACTIONAL_BITS {
        return DecimalValue::Sentinel;
    }
    if let Some(value) = exact_f64(bits, fractional_bits) {
        return DecimalValue::Number(value);
    }
    match policy {
        OverflowPolicy::FallbackString => {
            DecimalValue::Fallback(fixed_point_to_decimal(bits, fractional_bits).to_plain_string())
        }
        OverflowPolicy::Sentinel => DecimalValue::Sentinel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pow2(exp: u32) -> BigInt {
        BigInt::from(1_u8) << exp
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn one_and_one_half() {
        assert_eq!(
            decode(&pow2(48), 48, OverflowPolicy::FallbackString),
            DecimalValue::Number(1.0)
        );
        assert_eq!(
            decode(&(BigInt::from(3) * pow2(47)), 48, OverflowPolicy::FallbackString),
            DecimalValue::Number(1.5)
        );
    }

    #[test]
    fn zero_and_negative_values() {
        assert_eq!(
            decode(&BigInt::from(0), 48, OverflowPolicy::Sentinel),
            DecimalValue::Number(0.0)
        );
        assert_eq!(
            decode(&-(BigInt::from(5) * pow2(46)), 48, OverflowPolicy::FallbackString),
            DecimalValue::Number(-1.25)
        );
    }

    #[test]
    fn zero_fractional_bits_is_identity() {
        assert_eq!(
            decode(&BigInt::from(42), 0, OverflowPolicy::FallbackString),
            DecimalValue::Number(42.0)
        );
    }

    #[test]
    fn precision_exhaustion_falls_back_to_exact_string() {
        let bits = pow2(60) + 1;
        assert_eq!(
            decode(&bits, 48, OverflowPolicy::FallbackString),
            DecimalValue::Fallback(
                "4096.000000000000003552713678800500929355621337890625".to_string()
            )
        );
        assert_eq!(
            decode(&-bits, 48, OverflowPolicy::FallbackString),
            DecimalValue::Fallback(
                "-4096.000000000000003552713678800500929355621337890625".to_string()
            )
        );
    }

    #[test]
    fn u128_max_range_is_preserved_exactly() {
        let bits = pow2(127) - 1;
        assert_eq!(
            decode(&bits, 48, OverflowPolicy::FallbackString),
            DecimalValue::Fallback(
                "604462909807314587353087.999999999999996447286321199499070644378662109375"
                    .to_string()
            )
        );
    }

    #[test]
    fn sentinel_policy_replaces_fallback() {
        let value = decode(&(pow2(60) + 1), 48, OverflowPolicy::Sentinel);
        assert_eq!(value, DecimalValue::Sentinel);
        assert_eq!(value.to_json(u64::MAX), serde_json::Value::Null);
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(
            DecimalValue::Number(1.0).to_json(9_007_199_254_740_991),
            serde_json::json!(1)
        );
        assert_eq!(
            DecimalValue::Number(1.5).to_json(9_007_199_254_740_991),
            serde_json::json!(1.5)
        );
        assert_eq!(
            DecimalValue::Fallback("1.25".into()).to_json(9_007_199_254_740_991),
            serde_json::json!("1.25")
        );
    }

    #[test]
    fn whole_numbers_beyond_i64_are_not_saturated() {
        let two_pow_63 = decode(&pow2(63 + 48), 48, OverflowPolicy::FallbackString);
        assert_eq!(two_pow_63, DecimalValue::Number(TWO_POW_63));
        assert_eq!(
            two_pow_63.to_json(u64::MAX),
            serde_json::json!(9_223_372_036_854_775_808_u64)
        );

        let two_pow_64 = decode(&pow2(64 + 48), 48, OverflowPolicy::FallbackString)
            .to_json(u64::MAX);
        assert_ne!(two_pow_64, serde_json::json!(i64::MAX));
        assert_ne!(two_pow_64, serde_json::json!(u64::MAX));
        assert_eq!(two_pow_64.as_f64(), Some(TWO_POW_64));

        assert_eq!(
            DecimalValue::Number(-TWO_POW_63).to_json(u64::MAX),
            serde_json::json!(i64::MIN)
        );
        assert_eq!(
            DecimalValue::Number(-TWO_POW_64).to_json(u64::MAX).as_f64(),
            Some(-TWO_POW_64)
        );
    }

    #[test]
    fn whole_numbers_above_the_bound_stay_floats() {
        let value = DecimalValue::Number(9_007_199_254_740_992.0).to_json(9_007_199_254_740_991);
        assert!(value.is_f64());
        assert_eq!(value.as_f64(), Some(9_007_199_254_740_992.0));
    }

    #[test]
    fn wide_scales_never_underflow_to_zero() {
        let one = BigInt::from(1);
        assert_eq!(exact_f64(&one, 1_200), None);
        assert_eq!(exact_f64(&one, 1_022), Some(2_f64.powi(-1_022)));
        assert_eq!(
            decode(&one, 1_200, OverflowPolicy::FallbackString),
            DecimalValue::Sentinel
        );
        assert_eq!(
            decode(&one, MAX_FRACTIONAL_BITS + 1, OverflowPolicy::FallbackString),
            DecimalValue::Sentinel
        );
        assert_eq!(
            decode(&BigInt::from(0), u32::MAX, OverflowPolicy::FallbackString),
            DecimalValue::Sentinel
        );
    }

    #[test]
    fn exact_decode_matches_float_division_for_53_bit_patterns() {
        let mut seed = 0x5EED_u64;
        for _ in 0..20_000 {
            let raw = lcg_next(&mut seed) >> 11;
            let expected = raw as f64 / 2_f64.powi(48);
            assert_eq!(
                decode(&BigInt::from(raw), 48, OverflowPolicy::Sentinel),
                DecimalValue::Number(expected),
                "bits {raw}"
            );
        }
    }

    #[test]
    fn fallback_string_parses_back_to_the_same_quotient() {
        let mut seed = 0xFACE_u64;
        for _ in 0..2_000 {
            let hi = u128::from(lcg_next(&mut seed));
            let lo = u128::from(lcg_next(&mut seed));
            let bits = BigInt::from((hi << 64) | lo | 1);
            let decoded = decode(&bits, 48, OverflowPolicy::FallbackString);
            let DecimalValue::Fallback(text) = decoded else {
                assert!(bits.bits() <= 53, "wide odd pattern {bits} decoded as number");
                continue;
            };
            let parsed: BigDecimal = text.parse().unwrap_or_default();
            assert_eq!(parsed, fixed_point_to_decimal(&bits, 48));
            assert_eq!(
                parsed * BigDecimal::new(pow2(48), 0),
                BigDecimal::new(bits.clone(), 0)
            );
        }
    }
}
