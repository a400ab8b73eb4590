//! Exact fractions scaled by a power of ten.
//!
//! A value is `sign * numer/denom * 10^scale` with the fraction kept in
//! lowest terms and powers of ten pulled out into the scale. The canonical
//! form is unique, so equality and hashing derive from the fields.
//! Intermediate products widen through [`Int128`] and come back to 64 bits
//! through a scaled reduction, which is the one place bounded precision
//! loss can enter.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_traits::{FromPrimitive, ToPrimitive};

use crate::error::{NumericError, NumericResult};
use crate::int128::{Int128, Int128Acc};

/// Scale gaps beyond this leave the smaller addend below the 64-bit
/// precision floor; addition short-circuits to the dominant operand.
const NEGLIGIBLE_SCALE_GAP: i64 = 18;

/// Scale gaps beyond this decide an order comparison outright: a reduced
/// 64-bit fraction always lies strictly between 10^-19 and 10^19.
const CONCLUSIVE_SCALE_GAP: i64 = 38;

/// ln(10) to 19 significant digits; backs the logarithm's decimal range
/// reduction.
pub(crate) const LN_TEN: Rational = Rational {
    sign: 1,
    numer: 575_646_273_248_511_421,
    denom: 25,
    scale: -16,
};

// ============================================================================
// Rational
// ============================================================================

/// An exact scaled fraction: `sign * numer/denom * 10^scale`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    sign: i8,
    numer: i64,
    denom: i64,
    scale: i32,
}

impl Rational {
    pub const ZERO: Rational = Rational {
        sign: 1,
        numer: 0,
        denom: 1,
        scale: 0,
    };
    pub const ONE: Rational = Rational {
        sign: 1,
        numer: 1,
        denom: 1,
        scale: 0,
    };
    pub const NEGATIVE_ONE: Rational = Rational {
        sign: -1,
        numer: 1,
        denom: 1,
        scale: 0,
    };
    pub const HALF: Rational = Rational {
        sign: 1,
        numer: 1,
        denom: 2,
        scale: 0,
    };
    pub const TWO: Rational = Rational {
        sign: 1,
        numer: 2,
        denom: 1,
        scale: 0,
    };
    /// e to 19 significant digits.
    pub const E: Rational = Rational {
        sign: 1,
        numer: 543_656_365_691_809_047,
        denom: 2,
        scale: -17,
    };
    /// pi to 19 significant digits.
    pub const PI: Rational = Rational {
        sign: 1,
        numer: 1_570_796_326_794_896_619,
        denom: 5,
        scale: -17,
    };
    /// pi/2 to 19 significant digits.
    pub const HALF_PI: Rational = Rational {
        sign: 1,
        numer: 1_570_796_326_794_896_619,
        denom: 1,
        scale: -18,
    };
    /// 2*pi to 19 significant digits.
    pub const TWO_PI: Rational = Rational {
        sign: 1,
        numer: 6_283_185_307_179_586_477,
        denom: 1,
        scale: -18,
    };
    pub const MIN: Rational = Rational {
        sign: -1,
        numer: i64::MAX,
        denom: 1,
        scale: i32::MAX,
    };
    pub const MAX: Rational = Rational {
        sign: 1,
        numer: i64::MAX,
        denom: 1,
        scale: i32::MAX,
    };

    // ========================================================================
    // Construction
    // ========================================================================

    /// Normalize `numer/denom` into canonical form.
    pub fn new(numer: i64, denom: i64) -> NumericResult<Rational> {
        Rational::with_scale(numer, denom, 0)
    }

    /// Normalize `numer/denom * 10^scale` into canonical form.
    pub fn with_scale(numer: i64, denom: i64, scale: i32) -> NumericResult<Rational> {
        let sign = if (numer < 0) != (denom < 0) { -1 } else { 1 };
        normalize(
            sign,
            numer.unsigned_abs(),
            denom.unsigned_abs(),
            scale as i64,
        )
    }

    /// Re-enter a value from its raw serialized fields. Constructing a value
    /// from its own fields is the identity.
    pub fn from_fields(sign: i8, numer: i64, denom: i64, scale: i32) -> NumericResult<Rational> {
        if sign != 1 && sign != -1 {
            return Err(NumericError::invalid_argument("sign must be +1 or -1"));
        }
        if numer < 0 {
            return Err(NumericError::invalid_argument(
                "numerator must be non-negative",
            ));
        }
        if denom < 0 {
            return Err(NumericError::invalid_argument(
                "denominator must be positive",
            ));
        }
        normalize(sign, numer as u64, denom as u64, scale as i64)
    }

    /// Normalize a 128-bit numerator/denominator pair. Each operand is
    /// first reduced to 64 bits by the scaled reduction, so this is where
    /// interop with [`Int128`] can shed sub-ulp digits.
    pub fn from_int128(numer: Int128, denom: Int128, scale: i32) -> NumericResult<Rational> {
        Rational::from_int128_scaled(numer, denom, scale as i64)
    }

    fn from_int128_scaled(numer: Int128, denom: Int128, scale: i64) -> NumericResult<Rational> {
        if denom.is_zero() {
            return Err(NumericError::undefined("zero denominator"));
        }
        if numer.is_zero() {
            return Ok(Rational::ZERO);
        }
        let sign = if numer.is_negative() != denom.is_negative() {
            -1
        } else {
            1
        };
        let (n, ns) = scaled_long(&numer);
        let (d, ds) = scaled_long(&denom);
        normalize(sign, n, d, scale + ns - ds)
    }

    /// Exact-within-precision conversion from a 128-bit integer.
    pub(crate) fn from_int128_total(v: &Int128) -> Rational {
        if v.is_zero() {
            return Rational::ZERO;
        }
        let sign = if v.is_negative() { -1 } else { 1 };
        let (n, ns) = scaled_long(v);
        normalize(sign, n, 1, ns).unwrap_or(Rational::ZERO)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn sign(&self) -> i8 {
        self.sign
    }

    pub fn numer(&self) -> i64 {
        self.numer
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    pub fn is_negative(&self) -> bool {
        self.sign < 0 && self.numer != 0
    }

    pub fn is_positive(&self) -> bool {
        self.sign > 0 && self.numer != 0
    }

    /// True when the value is a whole number. Canonical form guarantees an
    /// integer always lands on `denom == 1` with a non-negative scale.
    pub fn is_integer(&self) -> bool {
        self.denom == 1 && self.scale >= 0
    }

    pub fn signum(&self) -> i32 {
        if self.is_zero() { 0 } else { self.sign as i32 }
    }

    // ========================================================================
    // Sign Operations
    // ========================================================================

    pub fn neg(&self) -> Rational {
        if self.is_zero() {
            *self
        } else {
            Rational {
                sign: -self.sign,
                ..*self
            }
        }
    }

    pub fn abs(&self) -> Rational {
        Rational { sign: 1, ..*self }
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Add with alignment to the smaller scale. The cross products widen
    /// through 128 bits; when the power-of-ten alignment outgrows even
    /// that, decimal digits shed from the negligible side instead of the
    /// operation failing.
    pub fn add(&self, other: &Rational) -> NumericResult<Rational> {
        if self.is_zero() {
            return Ok(*other);
        }
        if other.is_zero() {
            return Ok(*self);
        }
        let gap = self.scale as i64 - other.scale as i64;
        if gap > NEGLIGIBLE_SCALE_GAP {
            return Ok(*self);
        }
        if gap < -NEGLIGIBLE_SCALE_GAP {
            return Ok(*other);
        }
        let (hi, lo) = if self.scale >= other.scale {
            (self, other)
        } else {
            (other, self)
        };
        let diff = (hi.scale as i64 - lo.scale as i64) as u32;
        let mut va = Int128::from(hi.numer).mul(&Int128::from(lo.denom))?;
        let mut vb = Int128::from(lo.numer).mul(&Int128::from(hi.denom))?;
        let mut out_scale = lo.scale as i64;
        for _ in 0..diff {
            match va.mul(&Int128::TEN) {
                Ok(widened) => va = widened,
                Err(_) => {
                    vb = vb.div_round(&Int128::TEN)?;
                    out_scale += 1;
                }
            }
        }
        if hi.sign < 0 {
            va = va.neg()?;
        }
        if lo.sign < 0 {
            vb = vb.neg()?;
        }
        let numer = loop {
            match va.add(&vb) {
                Ok(sum) => break sum,
                Err(_) => {
                    va = va.div_round(&Int128::TEN)?;
                    vb = vb.div_round(&Int128::TEN)?;
                    out_scale += 1;
                }
            }
        };
        let denom = Int128::from(hi.denom).mul(&Int128::from(lo.denom))?;
        Rational::from_int128_scaled(numer, denom, out_scale)
    }

    pub fn sub(&self, other: &Rational) -> NumericResult<Rational> {
        self.add(&other.neg())
    }

    /// Multiply through 128-bit products. The scale sum is itself
    /// overflow-checked, since the scale is a 32-bit exponent.
    pub fn mul(&self, other: &Rational) -> NumericResult<Rational> {
        if self.is_zero() || other.is_zero() {
            return Ok(Rational::ZERO);
        }
        if *self == Rational::ONE {
            return Ok(*other);
        }
        if *other == Rational::ONE {
            return Ok(*self);
        }
        if *self == Rational::NEGATIVE_ONE {
            return Ok(other.neg());
        }
        if *other == Rational::NEGATIVE_ONE {
            return Ok(self.neg());
        }
        let mut n = Int128::from(self.numer).mul(&Int128::from(other.numer))?;
        let d = Int128::from(self.denom).mul(&Int128::from(other.denom))?;
        if self.sign != other.sign {
            n = n.neg()?;
        }
        let scale = self.scale as i64 + other.scale as i64;
        Rational::from_int128_scaled(n, d, scale)
    }

    /// The multiplicative inverse: swap numerator and denominator, negate
    /// the scale. Exact for every nonzero value.
    pub fn recip(&self) -> NumericResult<Rational> {
        if self.is_zero() {
            return Err(NumericError::undefined("reciprocal of zero"));
        }
        normalize(
            self.sign,
            self.denom as u64,
            self.numer as u64,
            -(self.scale as i64),
        )
    }

    /// Division is multiplication by the reciprocal.
    pub fn div(&self, other: &Rational) -> NumericResult<Rational> {
        self.mul(&other.recip()?)
    }

    /// `a - floor(a/b) * b` on absolute values; the result is always
    /// non-negative.
    pub fn rem(&self, other: &Rational) -> NumericResult<Rational> {
        if other.is_zero() {
            return Err(NumericError::undefined("remainder by zero"));
        }
        let a = self.abs();
        let b = other.abs();
        let q = a.div(&b)?.floor()?;
        a.sub(&q.mul(&b)?)
    }

    /// Largest whole number not above the value. Values whose fractional
    /// part lies below the representable precision floor return themselves.
    pub fn floor(&self) -> NumericResult<Rational> {
        if self.is_zero() {
            return Ok(Rational::ZERO);
        }
        if self.is_integer() {
            return Ok(*self);
        }
        // the estimate is off by at most one either way, so these cutoffs
        // are conservative and everything between them fits the 128-bit
        // widening below
        let exponent = self.decimal_exponent();
        if exponent >= 20 {
            // the integer part alone exhausts the representable digits
            return Ok(*self);
        }
        if exponent <= -2 {
            // |value| < 1
            return Ok(if self.sign > 0 {
                Rational::ZERO
            } else {
                Rational::NEGATIVE_ONE
            });
        }
        let n = Int128::from(self.numer).mul(&pow10(self.scale.max(0) as u32)?)?;
        let d = Int128::from(self.denom).mul(&pow10((-self.scale).max(0) as u32)?)?;
        let (q, r) = n.div_rem(&d)?;
        let q = if self.sign < 0 && !r.is_zero() {
            q.add(&Int128::ONE)?
        } else {
            q
        };
        let q = if self.sign < 0 { q.neg()? } else { q };
        Ok(Rational::from_int128_total(&q))
    }

    /// Integer power by linear accumulation: exact in 64 bits while it
    /// fits, then through the widened 128-bit path, then step by step with
    /// bounded precision. A negative exponent reciprocates the positive
    /// power; the minimum exponent has no negation and overflows.
    pub fn pow(&self, exp: i32) -> NumericResult<Rational> {
        if exp == i32::MIN {
            return Err(NumericError::overflow("negating the minimum exponent"));
        }
        if exp < 0 {
            return self.pow(-exp)?.recip();
        }
        if exp == 0 {
            return Ok(Rational::ONE);
        }
        if self.is_zero() {
            return Ok(Rational::ZERO);
        }
        let sign = if self.sign < 0 && exp % 2 == 1 { -1 } else { 1 };
        let scale = self.scale as i64 * exp as i64;
        let mut nn = 1i64;
        let mut dd = 1i64;
        let mut exact = true;
        for _ in 0..exp {
            match (nn.checked_mul(self.numer), dd.checked_mul(self.denom)) {
                (Some(n2), Some(d2)) => {
                    nn = n2;
                    dd = d2;
                }
                _ => {
                    exact = false;
                    break;
                }
            }
        }
        if exact {
            return normalize(sign, nn as u64, dd as u64, scale);
        }
        match self.pow_int128(exp) {
            Ok(result) => Ok(result),
            Err(err) if err.is_overflow() => self.pow_stepwise(exp),
            Err(err) => Err(err),
        }
    }

    fn pow_int128(&self, exp: i32) -> NumericResult<Rational> {
        let base_n = Int128::from(self.numer);
        let base_d = Int128::from(self.denom);
        let mut n = Int128::ONE;
        let mut d = Int128::ONE;
        for _ in 0..exp {
            n = n.mul(&base_n)?;
            d = d.mul(&base_d)?;
        }
        if self.sign < 0 && exp % 2 == 1 {
            n = n.neg()?;
        }
        Rational::from_int128_scaled(n, d, self.scale as i64 * exp as i64)
    }

    fn pow_stepwise(&self, exp: i32) -> NumericResult<Rational> {
        let mut result = *self;
        for _ in 1..exp {
            result = result.mul(self)?;
        }
        Ok(result)
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Truncate toward zero into a 128-bit integer, saturating at the
    /// 128-bit bounds the way native float-to-int narrowing does.
    pub fn to_int128_truncated(&self) -> Int128 {
        if self.is_zero() || self.scale <= -19 {
            return Int128::ZERO;
        }
        let saturated = if self.sign > 0 {
            Int128::MAX
        } else {
            Int128::MIN
        };
        let magnitude = if self.scale >= 0 {
            let d = Int128::from(self.denom);
            let Ok((mut q, mut r)) = Int128::from(self.numer).div_rem(&d) else {
                return saturated;
            };
            for _ in 0..self.scale {
                // value x10 per digit: q = q*10 + (r*10)/d, r = (r*10)%d
                let Ok(r10) = r.mul(&Int128::TEN) else {
                    return saturated;
                };
                let Ok((carry, r2)) = r10.div_rem(&d) else {
                    return saturated;
                };
                let Ok(q10) = q.mul(&Int128::TEN).and_then(|v| v.add(&carry)) else {
                    return saturated;
                };
                q = q10;
                r = r2;
            }
            q
        } else {
            let Ok(scaled) = pow10((-self.scale) as u32)
                .and_then(|p| Int128::from(self.denom).mul(&p))
            else {
                return Int128::ZERO;
            };
            let Ok((q, _)) = Int128::from(self.numer).div_rem(&scaled) else {
                return Int128::ZERO;
            };
            q
        };
        if self.sign < 0 {
            magnitude.neg().unwrap_or(Int128::MIN)
        } else {
            magnitude
        }
    }

    /// The value as an `i32` when it is exactly an integer in range;
    /// `None` otherwise.
    pub(crate) fn to_i32_exact(&self) -> Option<i32> {
        if self.is_zero() {
            return Some(0);
        }
        if !self.is_integer() || self.scale > 9 {
            return None;
        }
        let mut v = self.numer;
        for _ in 0..self.scale {
            v = v.checked_mul(10)?;
        }
        i32::try_from(self.sign as i64 * v).ok()
    }

    pub(crate) fn to_f64_lossy(&self) -> f64 {
        (self.sign as f64) * (self.numer as f64 / self.denom as f64) * 10f64.powi(self.scale)
    }

    /// Crude decimal exponent estimate, off by at most one. Drives range
    /// reduction for the logarithm.
    pub(crate) fn decimal_exponent(&self) -> i64 {
        digits10(self.numer) - digits10(self.denom) + self.scale as i64
    }

    /// The same value with the scale moved by `delta`, renormalized.
    pub(crate) fn rescaled(&self, delta: i64) -> NumericResult<Rational> {
        if self.is_zero() {
            return Ok(*self);
        }
        normalize(
            self.sign,
            self.numer as u64,
            self.denom as u64,
            self.scale as i64 + delta,
        )
    }
}

// ============================================================================
// Standard Traits
// ============================================================================

impl Ord for Rational {
    /// Sign first, then a conclusive scale-gap bound, then the sign of the
    /// exact difference.
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        if self.is_zero() {
            return if other.sign > 0 {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if other.is_zero() {
            return if self.sign > 0 {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        if self.sign != other.sign {
            return if self.sign > 0 {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        let gap = self.scale as i64 - other.scale as i64;
        let magnitude = if gap > CONCLUSIVE_SCALE_GAP {
            Ordering::Greater
        } else if gap < -CONCLUSIVE_SCALE_GAP {
            Ordering::Less
        } else {
            match self.abs().sub(&other.abs()) {
                Ok(diff) => {
                    if diff.is_zero() {
                        Ordering::Equal
                    } else if diff.sign > 0 {
                        Ordering::Greater
                    } else {
                        Ordering::Less
                    }
                }
                // scales at the i32 edge: the gap decides
                Err(_) => gap.cmp(&0),
            }
        };
        if self.sign > 0 {
            magnitude
        } else {
            magnitude.reverse()
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.sign < 0 { "-" } else { "" };
        if self.denom == 1 {
            if self.scale == 0 {
                write!(f, "{sign}{}", self.numer)
            } else {
                write!(f, "{sign}{}e{}", self.numer, self.scale)
            }
        } else if self.scale == 0 {
            write!(f, "{sign}{}/{}", self.numer, self.denom)
        } else {
            write!(f, "({sign}{}/{})e{}", self.numer, self.denom, self.scale)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl From<i32> for Rational {
    fn from(v: i32) -> Rational {
        Rational::with_scale(v as i64, 1, 0).unwrap_or(Rational::ZERO)
    }
}

impl FromStr for Rational {
    type Err = NumericError;

    fn from_str(s: &str) -> NumericResult<Rational> {
        Parser::new(s).parse()
    }
}

impl ToPrimitive for Rational {
    fn to_i64(&self) -> Option<i64> {
        self.to_int128_truncated().to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        self.to_int128_truncated().to_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.to_f64_lossy())
    }
}

impl FromPrimitive for Rational {
    fn from_i64(v: i64) -> Option<Rational> {
        Rational::new(v, 1).ok()
    }

    fn from_u64(v: u64) -> Option<Rational> {
        normalize(1, v, 1, 0).ok()
    }
}

// ============================================================================
// Normalization
// ============================================================================

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

fn digits10(mut v: i64) -> i64 {
    let mut count = 0;
    while v != 0 {
        v /= 10;
        count += 1;
    }
    count
}

/// Reduce to the unique canonical form: strip common powers of ten into
/// the scale, reduce by GCD, and fold the scale's twos and fives into
/// whichever side carries them. The steps interact, so they run to a
/// fixed point.
fn normalize(sign: i8, numer: u64, denom: u64, scale: i64) -> NumericResult<Rational> {
    if denom == 0 {
        return Err(NumericError::undefined("zero denominator"));
    }
    if numer == 0 {
        return Ok(Rational::ZERO);
    }
    let limit = i64::MAX as u128;
    let mut n = numer as u128;
    let mut d = denom as u128;
    let mut s = scale;
    loop {
        let before = (n, d, s);
        while n % 10 == 0 {
            n /= 10;
            s += 1;
        }
        while d % 10 == 0 {
            d /= 10;
            s -= 1;
        }
        let g = gcd(n, d);
        if g > 1 {
            n /= g;
            d /= g;
        }
        while s > 0 && d % 2 == 0 && n * 5 <= limit {
            d /= 2;
            n *= 5;
            s -= 1;
        }
        while s > 0 && d % 5 == 0 && n * 2 <= limit {
            d /= 5;
            n *= 2;
            s -= 1;
        }
        while s < 0 && n % 2 == 0 && d * 5 <= limit {
            n /= 2;
            d *= 5;
            s += 1;
        }
        while s < 0 && n % 5 == 0 && d * 2 <= limit {
            n /= 5;
            d *= 2;
            s += 1;
        }
        if (n, d, s) == before {
            break;
        }
    }
    if n > limit {
        return Err(NumericError::overflow(
            "rational numerator exceeds the 64-bit range",
        ));
    }
    if d > limit {
        return Err(NumericError::overflow(
            "rational denominator exceeds the 64-bit range",
        ));
    }
    if s > i32::MAX as i64 || s <= i32::MIN as i64 {
        return Err(NumericError::overflow(
            "rational scale exceeds the 32-bit range",
        ));
    }
    Ok(Rational {
        sign,
        numer: n as i64,
        denom: d as i64,
        scale: s as i32,
    })
}

/// Reduce a 128-bit magnitude to 64 bits by round-half-up division by ten,
/// returning the reduced magnitude and the decimal shift discarded into
/// the scale.
fn scaled_long(v: &Int128) -> (u64, i64) {
    let mut acc = Int128Acc::from_int(v);
    let mut shift = 0i64;
    while !acc.fits_i64() {
        let rem = acc.divmod_small(10);
        if rem >= 5 {
            acc.add_small(1);
        }
        shift += 1;
    }
    (acc.low_u64(), shift)
}

pub(crate) fn pow10(k: u32) -> NumericResult<Int128> {
    let mut v = Int128::ONE;
    for _ in 0..k {
        v = v.mul(&Int128::TEN)?;
    }
    Ok(v)
}

// ============================================================================
// Parsing
// ============================================================================

/// Grammar: optional sign, optional parenthesization, decimal numerator,
/// optional `/denominator`, optional `e`/`E` signed exponent. Parentheses
/// are mandatory when an exponent follows a fractional denominator.
struct Parser {
    input: String,
    chars: Vec<char>,
    position: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        let trimmed = input.trim();
        Parser {
            input: input.to_string(),
            chars: trimmed.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> char {
        if self.position < self.chars.len() {
            self.chars[self.position]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        if self.position < self.chars.len() {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    fn expect_char(&mut self, expected: char) -> NumericResult<()> {
        if self.current_char() == expected {
            self.advance();
            Ok(())
        } else {
            Err(NumericError::format(
                &self.input,
                format!("expected {expected:?}, found {:?}", self.current_char()),
            ))
        }
    }

    fn read_sign(&mut self) -> i8 {
        match self.current_char() {
            '-' => {
                self.advance();
                -1
            }
            '+' => {
                self.advance();
                1
            }
            _ => 1,
        }
    }

    /// Digits with an optional decimal point; returns the digit value and
    /// the count of fractional digits.
    fn read_decimal(&mut self) -> NumericResult<(u64, u32)> {
        let mut value: u128 = 0;
        let mut any = false;
        let mut frac = 0u32;
        let mut seen_dot = false;
        loop {
            let c = self.current_char();
            if c.is_ascii_digit() {
                any = true;
                value = value * 10 + (c as u8 - b'0') as u128;
                if value > u64::MAX as u128 {
                    return Err(NumericError::overflow(
                        "numeric literal exceeds the 64-bit range",
                    ));
                }
                if seen_dot {
                    frac += 1;
                }
                self.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        if !any {
            return Err(NumericError::format(&self.input, "expected a digit"));
        }
        Ok((value as u64, frac))
    }

    fn read_exponent(&mut self) -> NumericResult<i64> {
        let sign = self.read_sign() as i64;
        let (value, frac) = self.read_decimal()?;
        if frac > 0 {
            return Err(NumericError::format(
                &self.input,
                "exponent must be an integer",
            ));
        }
        if value > i32::MAX as u64 {
            return Err(NumericError::overflow(
                "exponent exceeds the 32-bit range",
            ));
        }
        Ok(sign * value as i64)
    }

    fn parse(&mut self) -> NumericResult<Rational> {
        if self.is_eof() {
            return Err(NumericError::format(&self.input, "empty input"));
        }
        let mut sign = self.read_sign();
        let parenthesized = self.current_char() == '(';
        if parenthesized {
            self.advance();
            sign *= self.read_sign();
        }
        let (numer, frac) = self.read_decimal()?;
        let mut denom = 1u64;
        if self.current_char() == '/' {
            if frac > 0 {
                return Err(NumericError::format(
                    &self.input,
                    "a fractional numerator cannot take a denominator",
                ));
            }
            self.advance();
            let (d, dfrac) = self.read_decimal()?;
            if dfrac > 0 {
                return Err(NumericError::format(
                    &self.input,
                    "denominator must be an integer",
                ));
            }
            denom = d;
        }
        if parenthesized {
            self.expect_char(')')?;
        }
        let mut exponent = 0i64;
        if matches!(self.current_char(), 'e' | 'E') {
            if denom != 1 && !parenthesized {
                return Err(NumericError::format(
                    &self.input,
                    "parenthesize the fraction before an exponent",
                ));
            }
            self.advance();
            exponent = self.read_exponent()?;
        }
        if !self.is_eof() {
            return Err(NumericError::format(
                &self.input,
                format!("unexpected character {:?}", self.current_char()),
            ));
        }
        normalize(sign, numer, denom, exponent - frac as i64)
    }
}

// ============================================================================
// RationalAcc
// ============================================================================

/// In-place accumulator for chained sums. Internal only: it exists so a
/// series loop can fold terms without round-tripping a fresh value through
/// the public surface, and so the loop can observe the fixed point.
pub(crate) struct RationalAcc {
    value: Rational,
}

impl RationalAcc {
    pub(crate) fn new(value: Rational) -> RationalAcc {
        RationalAcc { value }
    }

    pub(crate) fn value(&self) -> Rational {
        self.value
    }

    /// Fold a term into the sum. `false` means the stored value did not
    /// change - the convergence fixed point under exact equality.
    pub(crate) fn accumulate(&mut self, term: &Rational) -> NumericResult<bool> {
        let next = self.value.add(term)?;
        if next == self.value {
            return Ok(false);
        }
        self.value = next;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form_is_unique() {
        // 30/2 * 10^0 and 15 are the same value and must normalize alike
        let a = Rational::new(30, 2).unwrap();
        let b = Rational::new(15, 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.numer(), 15);
        assert_eq!(a.denom(), 1);
        assert_eq!(a.scale(), 0);

        // 15 * 10^-1 and 3/2 are both 1.5
        let c = Rational::with_scale(15, 1, -1).unwrap();
        let d = Rational::new(3, 2).unwrap();
        assert_eq!(c, d);
        assert_eq!(c.numer(), 3);
        assert_eq!(c.denom(), 2);
        assert_eq!(c.scale(), 0);
    }

    #[test]
    fn test_trailing_zeros_move_into_scale() {
        let r = Rational::new(1500, 30).unwrap();
        assert_eq!(r.numer(), 5);
        assert_eq!(r.denom(), 1);
        assert_eq!(r.scale(), 1);
    }

    #[test]
    fn test_zero_is_canonical() {
        let a = Rational::with_scale(0, 7, 12).unwrap();
        let b = Rational::with_scale(0, -3, -40).unwrap();
        assert_eq!(a, Rational::ZERO);
        assert_eq!(b, Rational::ZERO);
        assert_eq!(a.denom(), 1);
        assert_eq!(a.scale(), 0);
        assert_eq!(a.sign(), 1);
    }

    #[test]
    fn test_min_i64_numerator_overflows() {
        assert!(Rational::new(i64::MIN, 1).is_err());
        // but MIN/2 reduces into range
        assert!(Rational::new(i64::MIN, 2).is_ok());
    }

    #[test]
    fn test_recip_renormalizes() {
        // 1/(7/2 * 10^3) = 2/7 * 10^-3, which canonicalizes away from a
        // plain field swap
        let r = Rational::with_scale(7, 2, 3).unwrap();
        let inv = r.recip().unwrap();
        assert_eq!(inv.mul(&r).unwrap(), Rational::ONE);
    }

    #[test]
    fn test_scaled_long_rounds_half_up() {
        // 2^127 is about 1.7e38: reduced to 64 bits in 20 digits
        let (v, shift) = scaled_long(&Int128::MAX);
        assert!(shift > 0);
        assert!(v <= i64::MAX as u64);
        // the leading digits of 2^127 - 1 survive
        assert_eq!(v / 10u64.pow(v.ilog10() - 3), 1701);
    }

    #[test]
    fn test_constants_are_canonical() {
        for c in [
            Rational::ZERO,
            Rational::ONE,
            Rational::NEGATIVE_ONE,
            Rational::HALF,
            Rational::TWO,
            Rational::E,
            Rational::PI,
            Rational::HALF_PI,
            Rational::TWO_PI,
            Rational::MIN,
            Rational::MAX,
        ] {
            let rebuilt =
                Rational::from_fields(c.sign(), c.numer(), c.denom(), c.scale()).unwrap();
            assert_eq!(rebuilt, c);
        }
    }

    #[test]
    fn test_constant_values() {
        assert!((Rational::PI.to_f64_lossy() - std::f64::consts::PI).abs() < 1e-15);
        assert!((Rational::E.to_f64_lossy() - std::f64::consts::E).abs() < 1e-15);
        assert!((Rational::TWO_PI.to_f64_lossy() - std::f64::consts::TAU).abs() < 1e-15);
        assert_eq!(
            Rational::PI.mul(&Rational::HALF).unwrap(),
            Rational::HALF_PI
        );
    }

    #[test]
    fn test_accumulator_reports_fixed_point() {
        let mut acc = RationalAcc::new(Rational::ONE);
        let tiny = Rational::with_scale(1, 1, -40).unwrap();
        assert!(!acc.accumulate(&tiny).unwrap());
        assert_eq!(acc.value(), Rational::ONE);

        let half = Rational::HALF;
        assert!(acc.accumulate(&half).unwrap());
        assert_eq!(acc.value(), Rational::new(3, 2).unwrap());
    }

    #[test]
    fn test_parse_display_round_trip() {
        for text in ["0", "5", "-5", "3/4", "-3/4", "7e3", "(5/7)e-3", "-2e-8"] {
            let value: Rational = text.parse().unwrap();
            let round: Rational = value.to_string().parse().unwrap();
            assert_eq!(value, round, "round trip of {text}");
        }
    }

    #[test]
    fn test_parse_decimal_point() {
        let v: Rational = "2.5".parse().unwrap();
        assert_eq!(v, Rational::new(5, 2).unwrap());
        let v: Rational = "-0.125".parse().unwrap();
        assert_eq!(v, Rational::new(-1, 8).unwrap());
    }

    #[test]
    fn test_parse_rejects_unparenthesized_fraction_exponent() {
        let err = "1/2e3".parse::<Rational>().unwrap_err();
        assert_eq!(err.kind, crate::error::NumericErrorKind::Format);
        assert!("(1/2)e3".parse::<Rational>().is_ok());
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Rational>().is_err());
        assert!("abc".parse::<Rational>().is_err());
        assert!("5/".parse::<Rational>().is_err());
        assert!("(5".parse::<Rational>().is_err());
        assert!("5e".parse::<Rational>().is_err());
        assert!("1/0".parse::<Rational>().is_err());
    }

    #[test]
    fn test_pow10() {
        assert_eq!(pow10(0).unwrap(), Int128::ONE);
        assert_eq!(pow10(2).unwrap(), Int128::from(100i64));
        assert!(pow10(39).is_err());
    }
}
