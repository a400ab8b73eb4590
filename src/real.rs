//! Shared capability of the two numeric kinds.

use crate::int128::Int128;
use crate::rational::Rational;

/// What every real-valued kind in the engine can do: report its sign and
/// convert to the other kind. Both [`Int128`] and [`Rational`] implement
/// this, which is the seam external layers program against.
pub trait Real {
    fn signum(&self) -> i32;
    fn is_zero(&self) -> bool;
    fn is_negative(&self) -> bool;

    fn is_positive(&self) -> bool {
        !self.is_negative() && !self.is_zero()
    }

    /// Truncating conversion into the integer kind.
    fn to_int128(&self) -> Int128;

    /// Conversion into the rational kind, exact within its precision.
    fn to_rational(&self) -> Rational;
}

impl Real for Int128 {
    fn signum(&self) -> i32 {
        Int128::signum(self)
    }

    fn is_zero(&self) -> bool {
        Int128::is_zero(self)
    }

    fn is_negative(&self) -> bool {
        Int128::is_negative(self)
    }

    fn to_int128(&self) -> Int128 {
        *self
    }

    fn to_rational(&self) -> Rational {
        Rational::from_int128_total(self)
    }
}

impl Real for Rational {
    fn signum(&self) -> i32 {
        Rational::signum(self)
    }

    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }

    fn is_negative(&self) -> bool {
        Rational::is_negative(self)
    }

    fn to_int128(&self) -> Int128 {
        self.to_int128_truncated()
    }

    fn to_rational(&self) -> Rational {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_to_rational_round_trip() {
        let v = Int128::from(123_456i64);
        let r = v.to_rational();
        assert_eq!(r.to_int128(), v);
    }

    #[test]
    fn test_rational_truncates_toward_zero() {
        let r = Rational::new(-7, 2).unwrap();
        assert_eq!(Real::to_int128(&r), Int128::from(-3i64));
        let r = Rational::new(7, 2).unwrap();
        assert_eq!(Real::to_int128(&r), Int128::from(3i64));
    }

    #[test]
    fn test_signum_agreement() {
        assert_eq!(Real::signum(&Int128::from(-5i64)), -1);
        assert_eq!(Real::signum(&Rational::new(-5, 1).unwrap()), -1);
        assert_eq!(Real::signum(&Int128::ZERO), 0);
        assert_eq!(Real::signum(&Rational::ZERO), 0);
        assert!(Real::is_positive(&Rational::HALF));
    }
}
