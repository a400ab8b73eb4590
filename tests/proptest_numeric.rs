use num_bigint::BigInt;
use num_rational::Ratio;
use num_traits::ToPrimitive;
use proptest::prelude::*;
use quotient::{Int128, Rational};

// ============================================================================
// Strategies
// ============================================================================

/// Full-range 128-bit values, minus the minimum (reserved by several
/// round-trip properties).
fn any_int128() -> impl Strategy<Value = i128> {
    i128::MIN + 1..=i128::MAX
}

fn small_i64() -> impl Strategy<Value = i64> {
    -1_000_000i64..1_000_000i64
}

fn non_zero_i64() -> impl Strategy<Value = i64> {
    small_i64().prop_filter("Must be non-zero", |x| *x != 0)
}

/// Rationals small enough that one multiplicative step stays exact: the
/// widened intermediates come back under 64 bits untouched.
fn small_rational() -> impl Strategy<Value = Rational> {
    (small_i64(), non_zero_i64(), -3i32..3i32)
        .prop_map(|(n, d, s)| Rational::with_scale(n, d, s).unwrap())
}

fn non_zero_rational() -> impl Strategy<Value = Rational> {
    small_rational().prop_filter("Must be non-zero", |r| !r.is_zero())
}

/// Rationals small enough that several chained additive operations stay
/// exact, even after canonicalization inflates the fields.
fn tiny_rational() -> impl Strategy<Value = Rational> {
    (-60i64..60, 1i64..60, -2i32..2i32)
        .prop_map(|(n, d, s)| Rational::with_scale(n, d, s).unwrap())
}

fn non_zero_tiny_rational() -> impl Strategy<Value = Rational> {
    tiny_rational().prop_filter("Must be non-zero", |r| !r.is_zero())
}

fn big(v: i128) -> BigInt {
    BigInt::from(v)
}

fn in_i128_range(v: &BigInt) -> bool {
    *v >= big(i128::MIN) && *v <= big(i128::MAX)
}

// ============================================================================
// 128-bit Integer Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn int_add_matches_oracle(a in any_int128(), b in any_int128()) {
        let result = Int128::from(a).add(&Int128::from(b));
        match a.checked_add(b) {
            Some(sum) => prop_assert_eq!(result.unwrap().to_i128().unwrap(), sum),
            None => prop_assert!(result.is_err()),
        }
    }

    #[test]
    fn int_sub_matches_oracle(a in any_int128(), b in any_int128()) {
        let result = Int128::from(a).sub(&Int128::from(b));
        match a.checked_sub(b) {
            Some(diff) => prop_assert_eq!(result.unwrap().to_i128().unwrap(), diff),
            None => prop_assert!(result.is_err()),
        }
    }

    #[test]
    fn int_mul_matches_bigint_oracle(a in any_int128(), b in any_int128()) {
        let result = Int128::from(a).mul(&Int128::from(b));
        let expected = big(a) * big(b);
        if in_i128_range(&expected) {
            prop_assert_eq!(
                big(result.unwrap().to_i128().unwrap()),
                expected
            );
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn int_mul_small_operands(a in small_i64(), b in small_i64()) {
        // the 32x32 and 64x64 lanes, cross-checked exactly
        let product = Int128::from(a).mul(&Int128::from(b)).unwrap();
        prop_assert_eq!(product.to_i128().unwrap(), a as i128 * b as i128);
    }

    #[test]
    fn int_additive_inverse(a in any_int128(), b in any_int128()) {
        if let Ok(sum) = Int128::from(a).add(&Int128::from(b)) {
            prop_assert_eq!(sum.sub(&Int128::from(b)).unwrap(), Int128::from(a));
            prop_assert_eq!(sum.sub(&Int128::from(a)).unwrap(), Int128::from(b));
        }
    }

    #[test]
    fn int_division_remainder_identity(a in any_int128(), b in any_int128()) {
        prop_assume!(b != 0);
        let (q, r) = Int128::from(a).div_rem(&Int128::from(b)).unwrap();
        // a == q*b + r with 0 <= r < |b|; recombine through the
        // arbitrary-precision oracle, since q*b alone may exceed 128 bits
        prop_assert!(!r.is_negative());
        prop_assert!(r < Int128::from(b).abs().unwrap());
        let back = big(q.to_i128().unwrap()) * big(b) + big(r.to_i128().unwrap());
        prop_assert_eq!(back, big(a));
    }

    #[test]
    fn int_radix_round_trip(a in any_int128(), radix in 2u32..=36) {
        let v = Int128::from(a);
        let text = v.to_string_radix(radix).unwrap();
        prop_assert_eq!(Int128::from_str_radix(&text, radix).unwrap(), v);
    }

    #[test]
    fn int_shifts_match_native(a in any_int128(), n in 0i32..128) {
        prop_assert_eq!(
            Int128::from(a).shl(n).unwrap().to_i128().unwrap(),
            a << n
        );
        prop_assert_eq!(
            Int128::from(a).shr(n).unwrap().to_i128().unwrap(),
            a >> n
        );
    }

    #[test]
    fn int_comparison_matches_native(a in any_int128(), b in any_int128()) {
        prop_assert_eq!(Int128::from(a).cmp(&Int128::from(b)), a.cmp(&b));
    }
}

// ============================================================================
// Rational Properties
// ============================================================================

/// Map a small rational onto the arbitrary-precision oracle.
fn to_oracle(r: &Rational) -> Ratio<BigInt> {
    let mut numer = big((r.sign() as i64 * r.numer()) as i128);
    let mut denom = big(r.denom() as i128);
    if r.scale() >= 0 {
        numer *= big(10).pow(r.scale() as u32);
    } else {
        denom *= big(10).pow((-r.scale()) as u32);
    }
    Ratio::new(numer, denom)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn rational_add_matches_oracle(a in tiny_rational(), b in tiny_rational()) {
        let sum = a.add(&b).unwrap();
        prop_assert_eq!(to_oracle(&sum), to_oracle(&a) + to_oracle(&b));
    }

    #[test]
    fn rational_mul_matches_oracle(a in small_rational(), b in small_rational()) {
        let product = a.mul(&b).unwrap();
        prop_assert_eq!(to_oracle(&product), to_oracle(&a) * to_oracle(&b));
    }

    #[test]
    fn rational_multiplicative_inverse(a in non_zero_rational()) {
        // exact, no rounding
        prop_assert_eq!(a.recip().unwrap().mul(&a).unwrap(), Rational::ONE);
    }

    #[test]
    fn rational_additive_inverse(a in tiny_rational(), b in tiny_rational()) {
        let sum = a.add(&b).unwrap();
        prop_assert_eq!(sum.sub(&b).unwrap(), a);
        prop_assert_eq!(sum.sub(&a).unwrap(), b);
    }

    #[test]
    fn rational_normalization_idempotent(a in small_rational()) {
        let rebuilt = Rational::from_fields(a.sign(), a.numer(), a.denom(), a.scale()).unwrap();
        prop_assert_eq!(rebuilt, a);
    }

    #[test]
    fn rational_zero_canonicalization(d in non_zero_i64(), s in -40i32..40) {
        let zero = Rational::with_scale(0, d, s).unwrap();
        prop_assert_eq!(zero, Rational::ZERO);
    }

    #[test]
    fn rational_division_remainder_identity(
        a in tiny_rational(),
        b in non_zero_tiny_rational(),
    ) {
        let r = a.rem(&b).unwrap();
        prop_assert!(!r.is_negative());
        prop_assert!(r < b.abs());
        // |a| = floor(|a|/|b|) * |b| + r
        let q = a.abs().div(&b.abs()).unwrap().floor().unwrap();
        let back = q.mul(&b.abs()).unwrap().add(&r).unwrap();
        prop_assert_eq!(back, a.abs());
    }

    #[test]
    fn rational_display_round_trip(a in small_rational()) {
        let text = a.to_string();
        let parsed: Rational = text.parse().unwrap();
        prop_assert_eq!(parsed, a);
    }

    #[test]
    fn rational_comparison_matches_oracle(a in tiny_rational(), b in tiny_rational()) {
        prop_assert_eq!(a.cmp(&b), to_oracle(&a).cmp(&to_oracle(&b)));
    }

    #[test]
    fn rational_integer_pow_matches_oracle(a in non_zero_tiny_rational(), k in 1i32..4) {
        let powered = a.pow(k).unwrap();
        prop_assert_eq!(to_oracle(&powered), to_oracle(&a).pow(k));
    }

    #[test]
    fn rational_i64_round_trip(v in any::<i64>()) {
        prop_assume!(v != i64::MIN);
        let r = Rational::new(v, 1).unwrap();
        prop_assert_eq!(r.to_i64(), Some(v));
    }
}
