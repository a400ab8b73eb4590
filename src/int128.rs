//! Signed 128-bit integer arithmetic over four 32-bit words.
//!
//! Every operation either returns an exact result or reports a typed
//! error - nothing saturates and nothing wraps silently. The word layout
//! is most-significant first, matching the serialized form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_traits::{FromPrimitive, ToPrimitive};

use crate::error::{NumericError, NumericResult};

// ============================================================================
// Int128
// ============================================================================

/// Two's-complement signed 128-bit integer stored as four 32-bit words,
/// most-significant first. The bit pattern is the unique representation of
/// the value, so equality and hashing derive directly from the words.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Int128 {
    words: [u32; 4],
}

impl Int128 {
    pub const ZERO: Int128 = Int128 { words: [0, 0, 0, 0] };
    pub const ONE: Int128 = Int128 { words: [0, 0, 0, 1] };
    pub const NEGATIVE_ONE: Int128 = Int128 {
        words: [u32::MAX, u32::MAX, u32::MAX, u32::MAX],
    };
    pub const TWO: Int128 = Int128 { words: [0, 0, 0, 2] };
    pub const TEN: Int128 = Int128 { words: [0, 0, 0, 10] };
    pub const MIN: Int128 = Int128 {
        words: [0x8000_0000, 0, 0, 0],
    };
    pub const MAX: Int128 = Int128 {
        words: [0x7FFF_FFFF, u32::MAX, u32::MAX, u32::MAX],
    };

    /// Build a value from its four words, most-significant first.
    pub fn from_words(q1: u32, q2: u32, q3: u32, q4: u32) -> Int128 {
        Int128 {
            words: [q1, q2, q3, q4],
        }
    }

    /// The four words, most-significant first. This is the raw decomposition
    /// serialization reads and `from_words` restores.
    pub fn words(&self) -> [u32; 4] {
        self.words
    }

    pub fn is_negative(&self) -> bool {
        self.words[0] & 0x8000_0000 != 0
    }

    pub fn is_zero(&self) -> bool {
        self.words == [0, 0, 0, 0]
    }

    pub fn is_positive(&self) -> bool {
        !self.is_negative() && !self.is_zero()
    }

    pub fn signum(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Number of significant 32-bit words in the absolute value (1-4),
    /// or 0 for zero. Drives the multiplication fast-path dispatch.
    pub fn magnitude(&self) -> u32 {
        if self.is_zero() {
            0
        } else {
            limb_count(&magnitude_le(self))
        }
    }

    // ========================================================================
    // Addition / Subtraction / Negation
    // ========================================================================

    /// Word-wise addition with carry propagation. Two same-signed operands
    /// whose sum flips sign have overflowed 128 bits.
    pub fn add(&self, other: &Int128) -> NumericResult<Int128> {
        let mut words = [0u32; 4];
        let mut carry = 0u64;
        for i in (0..4).rev() {
            let sum = self.words[i] as u64 + other.words[i] as u64 + carry;
            words[i] = sum as u32;
            carry = sum >> 32;
        }
        let result = Int128 { words };
        if self.is_negative() == other.is_negative() && result.is_negative() != self.is_negative()
        {
            return Err(NumericError::overflow("integer addition exceeds 128 bits"));
        }
        Ok(result)
    }

    /// Word-wise subtraction with borrow propagation. Differing-sign
    /// operands whose difference loses the minuend's sign have overflowed.
    pub fn sub(&self, other: &Int128) -> NumericResult<Int128> {
        let mut words = [0u32; 4];
        let mut borrow = 0i64;
        for i in (0..4).rev() {
            let diff = self.words[i] as i64 - other.words[i] as i64 - borrow;
            if diff < 0 {
                words[i] = (diff + (1i64 << 32)) as u32;
                borrow = 1;
            } else {
                words[i] = diff as u32;
                borrow = 0;
            }
        }
        let result = Int128 { words };
        if self.is_negative() != other.is_negative() && result.is_negative() != self.is_negative()
        {
            return Err(NumericError::overflow(
                "integer subtraction exceeds 128 bits",
            ));
        }
        Ok(result)
    }

    /// Two's-complement negation. The minimum value has no positive
    /// counterpart and reports overflow.
    pub fn neg(&self) -> NumericResult<Int128> {
        if *self == Int128::MIN {
            return Err(NumericError::overflow(
                "negating the minimum 128-bit value",
            ));
        }
        let mut words = [0u32; 4];
        let mut carry = 1u64;
        for i in (0..4).rev() {
            let sum = (!self.words[i]) as u64 + carry;
            words[i] = sum as u32;
            carry = sum >> 32;
        }
        Ok(Int128 { words })
    }

    pub fn abs(&self) -> NumericResult<Int128> {
        if self.is_negative() { self.neg() } else { Ok(*self) }
    }

    // ========================================================================
    // Multiplication
    // ========================================================================

    /// Multiply, dispatching on the smaller operand's word magnitude.
    ///
    /// The four lane paths (32x32, 64x64, 32x128, 64x96) are the only
    /// magnitude pairings that can fit in 127 bits; every other pairing
    /// multiplies at least 2^64 by 2^64-and-change and fails immediately.
    pub fn mul(&self, other: &Int128) -> NumericResult<Int128> {
        if self.is_zero() || other.is_zero() {
            return Ok(Int128::ZERO);
        }
        let negative = self.is_negative() != other.is_negative();
        let a = magnitude_le(self);
        let b = magnitude_le(other);
        let (ma, mb) = (limb_count(&a), limb_count(&b));
        let (small, nsmall, big, nbig) = if ma <= mb {
            (&a, ma, &b, mb)
        } else {
            (&b, mb, &a, ma)
        };
        let product = match (nsmall, nbig) {
            (1, 1) => mul_32_32(small[0], big[0]),
            (2, 2) => mul_64_64(small, big),
            (1, _) => mul_32_128(small[0], big),
            (2, 3) => mul_64_96(small, big),
            _ => {
                return Err(NumericError::overflow(
                    "integer multiplication exceeds 128 bits",
                ));
            }
        };
        if product[4] != 0 {
            return Err(NumericError::overflow(
                "integer multiplication exceeds 128 bits",
            ));
        }
        Int128Acc::from_limbs([product[0], product[1], product[2], product[3]])
            .into_int128(negative)
    }

    // ========================================================================
    // Division
    // ========================================================================

    /// Quotient and remainder in one shift-subtract pass.
    ///
    /// The remainder is always non-negative, so
    /// `a == (a / b) * b + (a % b)` with `0 <= a % b < |b|` holds for every
    /// sign combination. Division by zero is undefined; `MIN / -1` overflows.
    pub fn div_rem(&self, other: &Int128) -> NumericResult<(Int128, Int128)> {
        if other.is_zero() {
            return Err(NumericError::undefined("division by zero"));
        }
        let (mut quo, mut rem) = div_rem_mag(self, other);
        if self.is_negative() && !rem.is_zero() {
            // shift the quotient past the dividend to keep the remainder
            // non-negative
            quo.add_small(1);
            let mut flipped = Int128Acc::from_limbs(magnitude_le(other));
            flipped.sub_assign(&rem);
            rem = flipped;
        }
        let q = quo.into_int128(self.is_negative() != other.is_negative())?;
        let r = rem.into_int128(false)?;
        Ok((q, r))
    }

    pub fn div(&self, other: &Int128) -> NumericResult<Int128> {
        Ok(self.div_rem(other)?.0)
    }

    pub fn rem(&self, other: &Int128) -> NumericResult<Int128> {
        Ok(self.div_rem(other)?.1)
    }

    /// Divide, rounding the magnitude of the quotient up when the remainder
    /// reaches half the divisor.
    pub fn div_round(&self, other: &Int128) -> NumericResult<Int128> {
        if other.is_zero() {
            return Err(NumericError::undefined("division by zero"));
        }
        let (mut quo, rem) = div_rem_mag(self, other);
        let mut doubled = rem;
        doubled.shl1();
        if doubled.cmp_mag(&Int128Acc::from_limbs(magnitude_le(other))) != Ordering::Less {
            quo.add_small(1);
        }
        quo.into_int128(self.is_negative() != other.is_negative())
    }

    // ========================================================================
    // Shifts and Bitwise Operations
    // ========================================================================

    /// Shift left; bits shifted past the top are discarded. Shifting by 128
    /// or more yields zero. A negative count is a caller error, not a range
    /// condition.
    pub fn shl(&self, n: i32) -> NumericResult<Int128> {
        if n < 0 {
            return Err(NumericError::invalid_argument("negative shift count"));
        }
        if n >= 128 {
            return Ok(Int128::ZERO);
        }
        let limbs = raw_le(self);
        let (words, bits) = ((n as usize) / 32, (n as u32) % 32);
        let mut out = [0u32; 4];
        for i in (0..4).rev() {
            if i >= words {
                let src = i - words;
                let mut v = limbs[src] << bits;
                if bits > 0 && src > 0 {
                    v |= limbs[src - 1] >> (32 - bits);
                }
                out[i] = v;
            }
        }
        Ok(from_raw_le(out))
    }

    /// Arithmetic shift right; the sign bit fills from the top. Shifting by
    /// 128 or more yields the all-zero or all-one pattern.
    pub fn shr(&self, n: i32) -> NumericResult<Int128> {
        if n < 0 {
            return Err(NumericError::invalid_argument("negative shift count"));
        }
        let fill = if self.is_negative() { u32::MAX } else { 0 };
        if n >= 128 {
            return Ok(Int128 { words: [fill; 4] });
        }
        Ok(from_raw_le(shift_right(raw_le(self), n as u32, fill)))
    }

    /// Logical shift right; zeros fill from the top.
    pub fn shr_unsigned(&self, n: i32) -> NumericResult<Int128> {
        if n < 0 {
            return Err(NumericError::invalid_argument("negative shift count"));
        }
        if n >= 128 {
            return Ok(Int128::ZERO);
        }
        Ok(from_raw_le(shift_right(raw_le(self), n as u32, 0)))
    }

    pub fn bitand(&self, other: &Int128) -> Int128 {
        let mut words = [0u32; 4];
        for i in 0..4 {
            words[i] = self.words[i] & other.words[i];
        }
        Int128 { words }
    }

    pub fn bitor(&self, other: &Int128) -> Int128 {
        let mut words = [0u32; 4];
        for i in 0..4 {
            words[i] = self.words[i] | other.words[i];
        }
        Int128 { words }
    }

    pub fn bitxor(&self, other: &Int128) -> Int128 {
        let mut words = [0u32; 4];
        for i in 0..4 {
            words[i] = self.words[i] ^ other.words[i];
        }
        Int128 { words }
    }

    pub fn bitnot(&self) -> Int128 {
        let mut words = [0u32; 4];
        for i in 0..4 {
            words[i] = !self.words[i];
        }
        Int128 { words }
    }

    // ========================================================================
    // String Conversion
    // ========================================================================

    /// Parse an optional sign and digits in the given radix (2-36).
    pub fn from_str_radix(input: &str, radix: u32) -> NumericResult<Int128> {
        if !(2..=36).contains(&radix) {
            return Err(NumericError::invalid_argument(format!(
                "radix {radix} outside the supported range 2-36"
            )));
        }
        let (negative, digits) = if let Some(rest) = input.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = input.strip_prefix('+') {
            (false, rest)
        } else {
            (false, input)
        };
        if digits.is_empty() {
            return Err(NumericError::format(input, "expected at least one digit"));
        }
        let mut acc = Int128Acc::zero();
        for c in digits.chars() {
            let Some(d) = c.to_digit(radix) else {
                return Err(NumericError::format(
                    input,
                    format!("invalid digit {c:?} for radix {radix}"),
                ));
            };
            if acc.mul_add_small(radix, d) {
                return Err(NumericError::overflow(
                    "parsed value exceeds the signed 128-bit range",
                ));
            }
        }
        acc.into_int128(negative)
    }

    /// Render in the given radix (2-36) by repeated division.
    pub fn to_string_radix(&self, radix: u32) -> NumericResult<String> {
        if !(2..=36).contains(&radix) {
            return Err(NumericError::invalid_argument(format!(
                "radix {radix} outside the supported range 2-36"
            )));
        }
        Ok(self.format_radix(radix))
    }

    fn format_radix(&self, radix: u32) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut acc = Int128Acc::from_limbs(magnitude_le(self));
        let mut digits = Vec::new();
        while !acc.is_zero() {
            let d = acc.divmod_small(radix);
            digits.push(char::from_digit(d, radix).unwrap_or('0'));
        }
        if self.is_negative() {
            digits.push('-');
        }
        digits.iter().rev().collect()
    }

    // ========================================================================
    // Narrowing
    // ========================================================================

    /// The low 64 bits, with native narrowing semantics.
    pub fn low_i64(&self) -> i64 {
        (((self.words[2] as u64) << 32) | self.words[3] as u64) as i64
    }

    /// The low 32 bits, with native narrowing semantics.
    pub fn low_i32(&self) -> i32 {
        self.words[3] as i32
    }
}

// ============================================================================
// Standard Traits
// ============================================================================

impl Ord for Int128 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // same sign: unsigned word comparison orders two's complement
            // correctly, most-significant word first
            _ => self.words.cmp(&other.words),
        }
    }
}

impl PartialOrd for Int128 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Int128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_radix(10))
    }
}

impl fmt::Debug for Int128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Int128({})", self.format_radix(10))
    }
}

impl FromStr for Int128 {
    type Err = NumericError;

    fn from_str(s: &str) -> NumericResult<Int128> {
        Int128::from_str_radix(s, 10)
    }
}

impl From<i32> for Int128 {
    fn from(v: i32) -> Int128 {
        Int128::from(v as i64)
    }
}

impl From<u32> for Int128 {
    fn from(v: u32) -> Int128 {
        Int128::from_words(0, 0, 0, v)
    }
}

impl From<i64> for Int128 {
    fn from(v: i64) -> Int128 {
        let ext = if v < 0 { u32::MAX } else { 0 };
        let raw = v as u64;
        Int128::from_words(ext, ext, (raw >> 32) as u32, raw as u32)
    }
}

impl From<u64> for Int128 {
    fn from(v: u64) -> Int128 {
        Int128::from_words(0, 0, (v >> 32) as u32, v as u32)
    }
}

impl From<i128> for Int128 {
    fn from(v: i128) -> Int128 {
        let raw = v as u128;
        Int128::from_words(
            (raw >> 96) as u32,
            (raw >> 64) as u32,
            (raw >> 32) as u32,
            raw as u32,
        )
    }
}

impl ToPrimitive for Int128 {
    fn to_i64(&self) -> Option<i64> {
        let low = self.low_i64();
        if Int128::from(low) == *self {
            Some(low)
        } else {
            None
        }
    }

    fn to_u64(&self) -> Option<u64> {
        if self.is_negative() || self.words[0] != 0 || self.words[1] != 0 {
            return None;
        }
        Some(((self.words[2] as u64) << 32) | self.words[3] as u64)
    }

    fn to_i128(&self) -> Option<i128> {
        let raw = ((self.words[0] as u128) << 96)
            | ((self.words[1] as u128) << 64)
            | ((self.words[2] as u128) << 32)
            | self.words[3] as u128;
        Some(raw as i128)
    }

    fn to_f64(&self) -> Option<f64> {
        let mag = magnitude_le(self);
        let mut value = 0.0f64;
        for i in (0..4).rev() {
            value = value * 4_294_967_296.0 + mag[i] as f64;
        }
        Some(if self.is_negative() { -value } else { value })
    }
}

impl FromPrimitive for Int128 {
    fn from_i64(v: i64) -> Option<Int128> {
        Some(Int128::from(v))
    }

    fn from_u64(v: u64) -> Option<Int128> {
        Some(Int128::from(v))
    }

    fn from_i128(v: i128) -> Option<Int128> {
        Some(Int128::from(v))
    }
}

// ============================================================================
// Magnitude Helpers
// ============================================================================

/// Absolute value as unsigned little-endian limbs. The minimum value maps
/// to the 2^127 magnitude, which the limbs hold exactly.
fn magnitude_le(v: &Int128) -> [u32; 4] {
    let mut limbs = raw_le(v);
    if v.is_negative() {
        let mut carry = 1u64;
        for limb in limbs.iter_mut() {
            let sum = (!*limb) as u64 + carry;
            *limb = sum as u32;
            carry = sum >> 32;
        }
    }
    limbs
}

fn raw_le(v: &Int128) -> [u32; 4] {
    [v.words[3], v.words[2], v.words[1], v.words[0]]
}

fn from_raw_le(limbs: [u32; 4]) -> Int128 {
    Int128 {
        words: [limbs[3], limbs[2], limbs[1], limbs[0]],
    }
}

fn limb_count(limbs: &[u32; 4]) -> u32 {
    for i in (0..4).rev() {
        if limbs[i] != 0 {
            return i as u32 + 1;
        }
    }
    1
}

fn shift_right(limbs: [u32; 4], n: u32, fill: u32) -> [u32; 4] {
    let (words, bits) = ((n as usize) / 32, n % 32);
    let mut out = [fill; 4];
    for i in 0..4 {
        let src = i + words;
        if src < 4 {
            let mut v = limbs[src] >> bits;
            if bits > 0 {
                let hi = if src + 1 < 4 { limbs[src + 1] } else { fill };
                v |= hi << (32 - bits);
            }
            out[i] = v;
        }
    }
    out
}

// ============================================================================
// Multiplication Lanes
// ============================================================================

fn mul_32_32(a: u32, b: u32) -> [u32; 5] {
    let p = a as u64 * b as u64;
    [p as u32, (p >> 32) as u32, 0, 0, 0]
}

fn mul_32_128(a: u32, b: &[u32; 4]) -> [u32; 5] {
    let mut out = [0u32; 5];
    let mut carry = 0u64;
    for i in 0..4 {
        let t = a as u64 * b[i] as u64 + carry;
        out[i] = t as u32;
        carry = t >> 32;
    }
    out[4] = carry as u32;
    out
}

fn mul_64_64(a: &[u32; 4], b: &[u32; 4]) -> [u32; 5] {
    let mut out = [0u32; 5];
    mul_lanes(&a[..2], &b[..2], &mut out);
    out
}

fn mul_64_96(a: &[u32; 4], b: &[u32; 4]) -> [u32; 5] {
    let mut out = [0u32; 5];
    mul_lanes(&a[..2], &b[..3], &mut out);
    out
}

/// Schoolbook partial products with carry propagation between 32-bit lanes.
/// Each row's final carry lands on a lane no earlier row has touched.
fn mul_lanes(a: &[u32], b: &[u32], out: &mut [u32; 5]) {
    for i in 0..a.len() {
        let mut carry = 0u64;
        for j in 0..b.len() {
            let t = out[i + j] as u64 + a[i] as u64 * b[j] as u64 + carry;
            out[i + j] = t as u32;
            carry = t >> 32;
        }
        out[i + b.len()] = carry as u32;
    }
}

// ============================================================================
// Shift-Subtract Division Core
// ============================================================================

/// `|a| / |b|` by binary shift-subtract: align the divisor to the dividend
/// with the leading-zero gap, then walk the gap back down one bit at a time.
fn div_rem_mag(a: &Int128, b: &Int128) -> (Int128Acc, Int128Acc) {
    let mut rem = Int128Acc::from_limbs(magnitude_le(a));
    let div = Int128Acc::from_limbs(magnitude_le(b));
    let mut quo = Int128Acc::zero();
    if rem.cmp_mag(&div) != Ordering::Less {
        let shift = rem.bits() - div.bits();
        let mut d = div;
        d.shl(shift);
        for _ in 0..=shift {
            quo.shl1();
            if rem.cmp_mag(&d) != Ordering::Less {
                rem.sub_assign(&d);
                quo.set_low_bit();
            }
            d.shr1();
        }
    }
    (quo, rem)
}

// ============================================================================
// Int128Acc
// ============================================================================

/// In-place unsigned 128-bit magnitude accumulator.
///
/// Strictly an internal workhorse for multi-step algorithms (the division
/// loop, digit accumulation while parsing, repeated division while
/// rendering). It never crosses the public API: callers only ever see the
/// immutable [`Int128`] it finishes as.
#[derive(Clone, Copy)]
pub(crate) struct Int128Acc {
    limbs: [u32; 4],
}

impl Int128Acc {
    pub(crate) fn zero() -> Int128Acc {
        Int128Acc { limbs: [0; 4] }
    }

    pub(crate) fn from_limbs(limbs: [u32; 4]) -> Int128Acc {
        Int128Acc { limbs }
    }

    pub(crate) fn from_int(v: &Int128) -> Int128Acc {
        Int128Acc {
            limbs: magnitude_le(v),
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.limbs == [0; 4]
    }

    /// Bit length of the magnitude; 0 for zero.
    pub(crate) fn bits(&self) -> u32 {
        for i in (0..4).rev() {
            if self.limbs[i] != 0 {
                return 32 * i as u32 + (32 - self.limbs[i].leading_zeros());
            }
        }
        0
    }

    pub(crate) fn cmp_mag(&self, other: &Int128Acc) -> Ordering {
        for i in (0..4).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    pub(crate) fn shl1(&mut self) {
        for i in (0..4).rev() {
            self.limbs[i] = (self.limbs[i] << 1) | if i > 0 { self.limbs[i - 1] >> 31 } else { 0 };
        }
    }

    pub(crate) fn shr1(&mut self) {
        for i in 0..4 {
            self.limbs[i] =
                (self.limbs[i] >> 1) | if i < 3 { self.limbs[i + 1] << 31 } else { 0 };
        }
    }

    /// Shift left by `n` bits; the caller guarantees the headroom.
    pub(crate) fn shl(&mut self, n: u32) {
        if n == 0 {
            return;
        }
        let limbs = self.limbs;
        let (words, bits) = ((n as usize) / 32, n % 32);
        let mut out = [0u32; 4];
        for i in (0..4).rev() {
            if i >= words {
                let src = i - words;
                let mut v = limbs[src] << bits;
                if bits > 0 && src > 0 {
                    v |= limbs[src - 1] >> (32 - bits);
                }
                out[i] = v;
            }
        }
        self.limbs = out;
    }

    pub(crate) fn set_low_bit(&mut self) {
        self.limbs[0] |= 1;
    }

    /// Add a small constant; the caller guarantees the headroom.
    pub(crate) fn add_small(&mut self, v: u32) {
        let mut carry = v as u64;
        for limb in self.limbs.iter_mut() {
            if carry == 0 {
                break;
            }
            let t = *limb as u64 + carry;
            *limb = t as u32;
            carry = t >> 32;
        }
        debug_assert_eq!(carry, 0);
    }

    /// Subtract a smaller-or-equal magnitude in place.
    pub(crate) fn sub_assign(&mut self, other: &Int128Acc) {
        let mut borrow = 0i64;
        for i in 0..4 {
            let diff = self.limbs[i] as i64 - other.limbs[i] as i64 - borrow;
            if diff < 0 {
                self.limbs[i] = (diff + (1i64 << 32)) as u32;
                borrow = 1;
            } else {
                self.limbs[i] = diff as u32;
                borrow = 0;
            }
        }
        debug_assert_eq!(borrow, 0);
    }

    /// `self = self * mul + add`; true means the result carried past 128
    /// bits.
    pub(crate) fn mul_add_small(&mut self, mul: u32, add: u32) -> bool {
        let mut carry = add as u64;
        for limb in self.limbs.iter_mut() {
            let t = *limb as u64 * mul as u64 + carry;
            *limb = t as u32;
            carry = t >> 32;
        }
        carry != 0
    }

    /// In-place division by a small divisor; returns the remainder.
    pub(crate) fn divmod_small(&mut self, d: u32) -> u32 {
        let mut rem = 0u64;
        for i in (0..4).rev() {
            let cur = (rem << 32) | self.limbs[i] as u64;
            self.limbs[i] = (cur / d as u64) as u32;
            rem = cur % d as u64;
        }
        rem as u32
    }

    /// True when the magnitude fits a non-negative `i64`.
    pub(crate) fn fits_i64(&self) -> bool {
        self.limbs[2] == 0 && self.limbs[3] == 0 && self.low_u64() <= i64::MAX as u64
    }

    pub(crate) fn low_u64(&self) -> u64 {
        ((self.limbs[1] as u64) << 32) | self.limbs[0] as u64
    }

    /// Finish the accumulator as a signed value, checking the 128-bit range.
    pub(crate) fn into_int128(self, negative: bool) -> NumericResult<Int128> {
        let top_set = self.limbs[3] & 0x8000_0000 != 0;
        if !negative {
            if top_set {
                return Err(NumericError::overflow(
                    "value exceeds the signed 128-bit range",
                ));
            }
            return Ok(from_raw_le(self.limbs));
        }
        if top_set {
            // only the exact 2^127 magnitude is representable, as MIN
            if self.limbs == [0, 0, 0, 0x8000_0000] {
                return Ok(Int128::MIN);
            }
            return Err(NumericError::overflow(
                "value exceeds the signed 128-bit range",
            ));
        }
        let mut limbs = [0u32; 4];
        let mut carry = 1u64;
        for i in 0..4 {
            let sum = (!self.limbs[i]) as u64 + carry;
            limbs[i] = sum as u32;
            carry = sum >> 32;
        }
        Ok(from_raw_le(limbs))
    }
}
