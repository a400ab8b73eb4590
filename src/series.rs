//! MacLaurin-series evaluation of the elementary functions.
//!
//! A series is described by two coefficient generators (numerator and
//! denominator, indexed by term number) plus the exponent rule
//! `coeff * n + offset`. Generators return `None` once a coefficient
//! leaves the 128-bit range - most often the factorial ceiling at 33! -
//! and the evaluator treats that as natural convergence: terms past the
//! representable range are below the precision floor anyway.

use crate::error::NumericResult;
use crate::factorial;
use crate::int128::Int128;
use crate::rational::{LN_TEN, Rational, RationalAcc};

/// Hard iteration ceiling. The slowest series this crate evaluates (the
/// logarithm with a reduced argument in (-0.9, 0]) reaches its fixed point
/// within about 450 terms; everything factorial-backed stops near 33.
const MAX_TERMS: u32 = 4096;

// ============================================================================
// Series Evaluator
// ============================================================================

type TermFn = fn(u32) -> Option<Int128>;

/// A MacLaurin series: term `n` is
/// `numer(n)/denom(n) * x^(power_coeff * n + power_offset)`.
pub(crate) struct MacLaurin {
    numer_term: TermFn,
    denom_term: TermFn,
    power_offset: u32,
    power_coeff: u32,
}

impl MacLaurin {
    /// Sum terms into an in-place accumulator until the sum stops changing
    /// under exact equality, a coefficient generator runs out of range, or
    /// a term itself overflows. The accumulated prefix is the result in
    /// every one of those cases.
    pub(crate) fn sum(&self, x: &Rational) -> NumericResult<Rational> {
        let (Some(n0), Some(d0)) = ((self.numer_term)(0), (self.denom_term)(0)) else {
            return Ok(Rational::ZERO);
        };
        let mut x_pow = x.pow(self.power_offset as i32)?;
        let x_step = x.pow(self.power_coeff as i32)?;
        let first = Rational::from_int128(n0, d0, 0)?.mul(&x_pow)?;
        let mut acc = RationalAcc::new(first);
        for n in 1..MAX_TERMS {
            let (Some(cn), Some(cd)) = ((self.numer_term)(n), (self.denom_term)(n)) else {
                break;
            };
            let term = match step_term(&mut x_pow, &x_step, cn, cd) {
                Ok(term) => term,
                Err(err) if err.is_overflow() => break,
                Err(err) => return Err(err),
            };
            match acc.accumulate(&term) {
                Ok(changed) => {
                    if !changed {
                        break;
                    }
                }
                Err(err) if err.is_overflow() => break,
                Err(err) => return Err(err),
            }
        }
        Ok(acc.value())
    }
}

fn step_term(
    x_pow: &mut Rational,
    x_step: &Rational,
    cn: Int128,
    cd: Int128,
) -> NumericResult<Rational> {
    *x_pow = x_pow.mul(x_step)?;
    Rational::from_int128(cn, cd, 0)?.mul(x_pow)
}

// ============================================================================
// Coefficient Generators
// ============================================================================

fn one_term(_n: u32) -> Option<Int128> {
    Some(Int128::ONE)
}

fn alternating_term(n: u32) -> Option<Int128> {
    Some(if n % 2 == 0 {
        Int128::ONE
    } else {
        Int128::NEGATIVE_ONE
    })
}

fn factorial_term(n: u32) -> Option<Int128> {
    factorial::checked(n)
}

fn odd_factorial_term(n: u32) -> Option<Int128> {
    factorial::checked(2 * n + 1)
}

fn even_factorial_term(n: u32) -> Option<Int128> {
    factorial::checked(2 * n)
}

fn linear_term(n: u32) -> Option<Int128> {
    Some(Int128::from(n as i64 + 1))
}

fn odd_linear_term(n: u32) -> Option<Int128> {
    Some(Int128::from(2 * n as i64 + 1))
}

/// `4^n * (n!)^2 * (2n+1)`, the arcsine denominator.
fn asin_denom_term(n: u32) -> Option<Int128> {
    if n > 62 {
        return None;
    }
    let f = factorial::checked(n)?;
    let squared = f.mul(&f).ok()?;
    let four_n = Int128::ONE.shl(2 * n as i32).ok()?;
    four_n
        .mul(&squared)
        .ok()?
        .mul(&Int128::from(2 * n as i64 + 1))
        .ok()
}

// ============================================================================
// Series Instances
// ============================================================================

const EXP_SERIES: MacLaurin = MacLaurin {
    numer_term: one_term,
    denom_term: factorial_term,
    power_offset: 0,
    power_coeff: 1,
};

/// ln(1+u) around u = 0; term n carries u^(n+1).
const LN_SERIES: MacLaurin = MacLaurin {
    numer_term: alternating_term,
    denom_term: linear_term,
    power_offset: 1,
    power_coeff: 1,
};

const SIN_SERIES: MacLaurin = MacLaurin {
    numer_term: alternating_term,
    denom_term: odd_factorial_term,
    power_offset: 1,
    power_coeff: 2,
};

const COS_SERIES: MacLaurin = MacLaurin {
    numer_term: alternating_term,
    denom_term: even_factorial_term,
    power_offset: 0,
    power_coeff: 2,
};

const SINH_SERIES: MacLaurin = MacLaurin {
    numer_term: one_term,
    denom_term: odd_factorial_term,
    power_offset: 1,
    power_coeff: 2,
};

const COSH_SERIES: MacLaurin = MacLaurin {
    numer_term: one_term,
    denom_term: even_factorial_term,
    power_offset: 0,
    power_coeff: 2,
};

const ASIN_SERIES: MacLaurin = MacLaurin {
    numer_term: even_factorial_term,
    denom_term: asin_denom_term,
    power_offset: 1,
    power_coeff: 2,
};

const ATAN_SERIES: MacLaurin = MacLaurin {
    numer_term: alternating_term,
    denom_term: odd_linear_term,
    power_offset: 1,
    power_coeff: 2,
};

// ============================================================================
// Elementary Functions
// ============================================================================

impl Rational {
    /// e^x.
    pub fn exp(&self) -> NumericResult<Rational> {
        EXP_SERIES.sum(self)
    }

    /// Natural logarithm; undefined for non-positive input.
    ///
    /// The input is reduced to `m * 10^k` with `m` in [1, 10), and ln(m)
    /// is taken through the reciprocal so the series argument stays in
    /// (-0.9, 0] where ln(1+u) converges quickly.
    pub fn ln(&self) -> NumericResult<Rational> {
        if !self.is_positive() {
            return Err(crate::error::NumericError::undefined(
                "logarithm of a non-positive number",
            ));
        }
        if *self == Rational::ONE {
            return Ok(Rational::ZERO);
        }
        let ten = Rational::from(10);
        let mut k = self.decimal_exponent();
        let mut m = self.rescaled(-k)?;
        while m >= ten {
            m = m.rescaled(-1)?;
            k += 1;
        }
        while m < Rational::ONE {
            m = m.rescaled(1)?;
            k -= 1;
        }
        let ln_m = if m == Rational::ONE {
            Rational::ZERO
        } else {
            let u = m.recip()?.sub(&Rational::ONE)?;
            LN_SERIES.sum(&u)?.neg()
        };
        if k == 0 {
            return Ok(ln_m);
        }
        ln_m.add(&LN_TEN.mul(&Rational::new(k, 1)?)?)
    }

    /// Sine, with the input first reduced modulo 2*pi.
    pub fn sin(&self) -> NumericResult<Rational> {
        let reduced = self.rem(&Rational::TWO_PI)?;
        let reduced = if self.is_negative() {
            reduced.neg()
        } else {
            reduced
        };
        SIN_SERIES.sum(&reduced)
    }

    /// Cosine, with the input first reduced modulo 2*pi.
    pub fn cos(&self) -> NumericResult<Rational> {
        COS_SERIES.sum(&self.rem(&Rational::TWO_PI)?)
    }

    /// Hyperbolic sine; the input shares the trigonometric 2*pi reduction,
    /// which keeps every term inside the factorial ceiling.
    pub fn sinh(&self) -> NumericResult<Rational> {
        let reduced = self.rem(&Rational::TWO_PI)?;
        let reduced = if self.is_negative() {
            reduced.neg()
        } else {
            reduced
        };
        SINH_SERIES.sum(&reduced)
    }

    /// Hyperbolic cosine, sharing the 2*pi reduction.
    pub fn cosh(&self) -> NumericResult<Rational> {
        COSH_SERIES.sum(&self.rem(&Rational::TWO_PI)?)
    }

    /// tan = sin / cos; undefined where cos is zero.
    pub fn tan(&self) -> NumericResult<Rational> {
        self.sin()?.div(&self.cos()?)
    }

    /// tanh = sinh / cosh.
    pub fn tanh(&self) -> NumericResult<Rational> {
        self.sinh()?.div(&self.cosh()?)
    }

    /// Arcsine; undefined outside [-1, 1].
    pub fn asin(&self) -> NumericResult<Rational> {
        if self.abs() > Rational::ONE {
            return Err(crate::error::NumericError::undefined(
                "arcsine outside [-1, 1]",
            ));
        }
        ASIN_SERIES.sum(self)
    }

    /// arccos = pi/2 - arcsin.
    pub fn acos(&self) -> NumericResult<Rational> {
        Rational::HALF_PI.sub(&self.asin()?)
    }

    /// Arctangent. Inputs beyond the unit interval fold through
    /// `atan(x) = pi/2 - atan(1/x)` so the series argument converges.
    pub fn atan(&self) -> NumericResult<Rational> {
        let a = self.abs();
        if a > Rational::ONE {
            let folded = Rational::HALF_PI.sub(&a.recip()?.atan()?)?;
            return Ok(if self.is_negative() {
                folded.neg()
            } else {
                folded
            });
        }
        ATAN_SERIES.sum(self)
    }

    /// sqrt(x) = e^(ln(x)/2); undefined for negative input.
    pub fn sqrt(&self) -> NumericResult<Rational> {
        if self.is_negative() {
            return Err(crate::error::NumericError::undefined(
                "square root of a negative number",
            ));
        }
        if self.is_zero() {
            return Ok(Rational::ZERO);
        }
        if *self == Rational::ONE {
            return Ok(Rational::ONE);
        }
        self.ln()?.mul(&Rational::HALF)?.exp()
    }

    /// Rational power: `a^b = e^(b ln a)`, except that an integral
    /// exponent in 32-bit range routes to the exact integer-power path.
    pub fn powf(&self, exp: &Rational) -> NumericResult<Rational> {
        if let Some(k) = exp.to_i32_exact() {
            return self.pow(k);
        }
        if self.is_zero() {
            return if exp.is_positive() {
                Ok(Rational::ZERO)
            } else {
                Err(crate::error::NumericError::undefined(
                    "zero base with a non-positive exponent",
                ))
            };
        }
        if self.is_negative() {
            return Err(crate::error::NumericError::undefined(
                "rational power of a negative base",
            ));
        }
        self.ln()?.mul(exp)?.exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::ToPrimitive;

    fn close(a: &Rational, expected: f64, tolerance: f64) -> bool {
        (a.to_f64().unwrap_or(f64::NAN) - expected).abs() < tolerance
    }

    #[test]
    fn test_series_stops_on_generator_exhaustion() {
        // cos of a value near 2*pi needs terms past the factorial ceiling;
        // the evaluator must stop, not error
        let near_tau = Rational::new(6, 1).unwrap();
        let result = COS_SERIES.sum(&near_tau).unwrap();
        assert!(close(&result, 6f64.cos(), 1e-9));
    }

    #[test]
    fn test_exp_of_zero_and_one() {
        assert_eq!(Rational::ZERO.exp().unwrap(), Rational::ONE);
        let e = Rational::ONE.exp().unwrap();
        assert!(close(&e, std::f64::consts::E, 1e-15));
    }

    #[test]
    fn test_ln_range_reduction() {
        // the raw ln(1+u) series diverges past 2; the reduced path must not
        for (input, expected) in [(2i64, 2f64.ln()), (10, 10f64.ln()), (1000, 1000f64.ln())] {
            let v = Rational::new(input, 1).unwrap().ln().unwrap();
            assert!(close(&v, expected, 1e-12), "ln({input})");
        }
        let half = Rational::HALF.ln().unwrap();
        assert!(close(&half, 0.5f64.ln(), 1e-12));
    }

    #[test]
    fn test_asin_denominator_generator() {
        assert_eq!(asin_denom_term(0), Some(Int128::ONE));
        // 4 * 1 * 3
        assert_eq!(asin_denom_term(1), Some(Int128::from(12i64)));
        // the (2n)! numerator dies first in practice, but the denominator
        // generator must also stop on its own
        assert_eq!(asin_denom_term(100), None);
    }

    #[test]
    fn test_atan_folds_large_inputs() {
        let v = Rational::new(10, 1).unwrap().atan().unwrap();
        assert!(close(&v, 10f64.atan(), 1e-12));
        let v = Rational::new(-10, 1).unwrap().atan().unwrap();
        assert!(close(&v, (-10f64).atan(), 1e-12));
    }
}
