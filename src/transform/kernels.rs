//! The operator bundles consumed by the transform engine.
//!
//! Each kernel pairs a unit function with a value function; the
//! value/variance form reuses the arithmetic of
//! [`ValueAndVariance`](crate::value_variance::ValueAndVariance), so the
//! propagation formulas live in one place.

use num_traits::Float;

use super::{BinaryKernel, Numeric, UnaryKernel};
use crate::error::{Error, Result};
use crate::units::Unit;
use crate::value_variance::ValueAndVariance;

fn expect_same_unit(a: Unit, b: Unit) -> Result<Unit>
{
    if a == b {
        Ok(a)
    } else {
        Err(Error::UnitMismatch { left: a, right: b })
    }
}

fn expect_dimensionless(name: &str, a: Unit) -> Result<Unit>
{
    if a.is_dimensionless() {
        Ok(Unit::DIMENSIONLESS)
    } else {
        Err(Error::not_dimensionless(name, a))
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Plus;

impl BinaryKernel for Plus
{
    const NAME: &'static str = "plus";
    const MIXED_VARIANCES_OK: bool = true;

    fn unit(&self, a: Unit, b: Unit) -> Result<Unit>
    {
        expect_same_unit(a, b)
    }

    fn value<T: Numeric>(&self, a: T, b: T) -> T
    {
        a + b
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>, b: ValueAndVariance<T>)
        -> ValueAndVariance<T>
    {
        a + b
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Minus;

impl BinaryKernel for Minus
{
    const NAME: &'static str = "minus";
    const MIXED_VARIANCES_OK: bool = true;

    fn unit(&self, a: Unit, b: Unit) -> Result<Unit>
    {
        expect_same_unit(a, b)
    }

    fn value<T: Numeric>(&self, a: T, b: T) -> T
    {
        a - b
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>, b: ValueAndVariance<T>)
        -> ValueAndVariance<T>
    {
        a - b
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Times;

impl BinaryKernel for Times
{
    const NAME: &'static str = "times";
    const MIXED_VARIANCES_OK: bool = false;

    fn unit(&self, a: Unit, b: Unit) -> Result<Unit>
    {
        // Histogram data times histogram data is meaningless; histogram
        // times dimensionless scale is the supported pattern.
        if a.is_counts() && b.is_counts() {
            return Err(Error::Unit(format!("cannot multiply {} by {}", a, b)));
        }
        Ok(a * b)
    }

    fn value<T: Numeric>(&self, a: T, b: T) -> T
    {
        a * b
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>, b: ValueAndVariance<T>)
        -> ValueAndVariance<T>
    {
        a * b
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Divide;

impl BinaryKernel for Divide
{
    const NAME: &'static str = "divide";
    const MIXED_VARIANCES_OK: bool = false;

    fn unit(&self, a: Unit, b: Unit) -> Result<Unit>
    {
        Ok(a / b)
    }

    fn value<T: Numeric>(&self, a: T, b: T) -> T
    {
        a / b
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>, b: ValueAndVariance<T>)
        -> ValueAndVariance<T>
    {
        a / b
    }
}

/// Unary minus: values negate, the variance is unchanged.
#[derive(Clone, Copy)]
pub(crate) struct Neg;

impl UnaryKernel for Neg
{
    const NAME: &'static str = "neg";
    const INT_SUPPORTED: bool = true;

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        Ok(a)
    }

    fn value_int<T: Numeric>(&self, a: T) -> T
    {
        -a
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        -a
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        -a
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Abs;

impl UnaryKernel for Abs
{
    const NAME: &'static str = "abs";
    const INT_SUPPORTED: bool = true;

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        Ok(a)
    }

    fn value_int<T: Numeric>(&self, a: T) -> T
    {
        a.abs()
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.abs()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.abs()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Sqrt;

impl UnaryKernel for Sqrt
{
    const NAME: &'static str = "sqrt";

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        a.sqrt()
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.sqrt()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.sqrt()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Exp;

impl UnaryKernel for Exp
{
    const NAME: &'static str = "exp";

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        expect_dimensionless(Self::NAME, a)
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.exp()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.exp()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Ln;

impl UnaryKernel for Ln
{
    const NAME: &'static str = "log";

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        expect_dimensionless(Self::NAME, a)
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.ln()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.ln()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Log10;

impl UnaryKernel for Log10
{
    const NAME: &'static str = "log10";

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        expect_dimensionless(Self::NAME, a)
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.log10()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.log10()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct Reciprocal;

impl UnaryKernel for Reciprocal
{
    const NAME: &'static str = "reciprocal";

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        Ok(Unit::DIMENSIONLESS / a)
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a.recip()
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.reciprocal()
    }
}

/// Integer power by repeated squaring, so the variance propagates
/// through the same multiplication tree as the value.
#[derive(Clone, Copy)]
pub(crate) struct Pow
{
    pub exponent: i32,
}

fn powi_by_squaring<T: Numeric>(a: T, n: u32) -> T
{
    let mut result = T::one();
    let mut base = a;
    let mut exp = n;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base;
        }
        exp >>= 1;
        if exp > 0 {
            base = base * base;
        }
    }
    result
}

impl UnaryKernel for Pow
{
    const NAME: &'static str = "pow";
    const INT_SUPPORTED: bool = true;

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        Ok(a.pow(self.exponent))
    }

    fn value_int<T: Numeric>(&self, a: T) -> T
    {
        // Negative exponents are rejected for integer dtypes before
        // dispatch.
        debug_assert!(self.exponent >= 0);
        powi_by_squaring(a, self.exponent.max(0) as u32)
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        if self.exponent < 0 {
            powi_by_squaring(a, self.exponent.unsigned_abs()).recip()
        } else {
            powi_by_squaring(a, self.exponent as u32)
        }
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a.powi(self.exponent)
    }
}

/// Passes elements through unchanged, with the identity unit function.
#[derive(Clone, Copy)]
pub(crate) struct Identity;

impl UnaryKernel for Identity
{
    const NAME: &'static str = "identity";
    const INT_SUPPORTED: bool = true;

    fn unit(&self, a: Unit) -> Result<Unit>
    {
        Ok(a)
    }

    fn value_int<T: Numeric>(&self, a: T) -> T
    {
        a
    }

    fn value<T: Float + Numeric>(&self, a: T) -> T
    {
        a
    }

    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>
    {
        a
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn counts_times_counts_is_rejected()
    {
        assert!(Times.unit(Unit::COUNTS, Unit::COUNTS).is_err());
        assert_eq!(Times.unit(Unit::COUNTS, Unit::DIMENSIONLESS).unwrap(), Unit::COUNTS);
        // Normalization of counts by counts is fine.
        assert_eq!(Divide.unit(Unit::COUNTS, Unit::COUNTS).unwrap(), Unit::DIMENSIONLESS);
    }

    #[test]
    fn additive_units_must_match()
    {
        assert!(Plus.unit(Unit::M, Unit::S).is_err());
        assert_eq!(Minus.unit(Unit::M, Unit::M).unwrap(), Unit::M);
    }

    #[test]
    fn sqrt_unit_is_half_power()
    {
        assert_eq!(Sqrt.unit(Unit::M.pow(2)).unwrap(), Unit::M);
        assert!(Sqrt.unit(Unit::M).is_err());
    }

    #[test]
    fn transcendental_units_require_dimensionless()
    {
        assert!(Exp.unit(Unit::M).is_err());
        assert!(Ln.unit(Unit::COUNTS).is_err());
        assert!(Log10.unit(Unit::DIMENSIONLESS).is_ok());
    }

    #[test]
    fn pow_unit()
    {
        assert_eq!(Pow { exponent: 3 }.unit(Unit::M).unwrap(), Unit::M.pow(3));
        assert_eq!(Pow { exponent: -1 }.unit(Unit::M).unwrap(), Unit::DIMENSIONLESS / Unit::M);
    }

    #[test]
    fn powi_by_squaring_matches_pow()
    {
        assert_eq!(powi_by_squaring(3i64, 0), 1);
        assert_eq!(powi_by_squaring(3i64, 5), 243);
        assert_eq!(powi_by_squaring(2.0f64, 10), 1024.0);
    }
}
