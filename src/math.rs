//! Elementwise math on variables, with unit and variance propagation.
//!
//! Domain errors inside an element (negative operand to `sqrt`,
//! `log` of zero) are not checked; they propagate as NaN/Inf in the
//! values, as IEEE arithmetic does. Unit preconditions are checked up
//! front and leave the operand untouched on failure.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::transform::kernels;
use crate::transform::{transform_unary, transform_unary_in_place};
use crate::variable::Variable;

/// Square root; the unit must be a perfect square (`m^2` gives `m`).
/// `Var(sqrt(a)) = Var(a) / (4 a)`.
pub fn sqrt(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Sqrt, a)
}

pub fn sqrt_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Sqrt, a)
}

/// Absolute value; unit and variance are unchanged.
pub fn abs(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Abs, a)
}

pub fn abs_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Abs, a)
}

/// Reciprocal; `Var(1/a) = Var(a) / a^4`.
pub fn reciprocal(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Reciprocal, a)
}

pub fn reciprocal_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Reciprocal, a)
}

/// Exponential; requires a dimensionless operand.
pub fn exp(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Exp, a)
}

pub fn exp_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Exp, a)
}

/// Natural logarithm; requires a dimensionless operand.
pub fn log(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Ln, a)
}

pub fn log_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Ln, a)
}

/// Base-10 logarithm; requires a dimensionless operand.
pub fn log10(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Log10, a)
}

pub fn log10_in_place(a: &mut Variable) -> Result<()>
{
    transform_unary_in_place(kernels::Log10, a)
}

/// Integer power by repeated squaring on value/variance pairs, so the
/// variance propagates through the same formula tree as the value. The
/// unit is raised to the same power. Negative exponents require a
/// floating-point dtype.
pub fn pow(a: &Variable, exponent: i32) -> Result<Variable>
{
    check_int_pow(a, exponent)?;
    transform_unary(kernels::Pow { exponent }, a)
}

pub fn pow_in_place(a: &mut Variable, exponent: i32) -> Result<()>
{
    check_int_pow(a, exponent)?;
    transform_unary_in_place(kernels::Pow { exponent }, a)
}

fn check_int_pow(a: &Variable, exponent: i32) -> Result<()>
{
    if exponent < 0 && matches!(a.dtype(), DType::Int64 | DType::Int32) {
        return Err(Error::Type(format!(
            "negative exponent {} requires a floating-point dtype, got {}",
            exponent,
            a.dtype()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dim::Dim;
    use crate::dimensions::Dimensions;
    use crate::units::Unit;
    use approx::assert_abs_diff_eq;

    fn x1(value: f64, variance: f64, unit: Unit) -> Variable
    {
        Variable::with_variances(
            Dimensions::from(&[(Dim::X, 1)][..]),
            unit,
            vec![value],
            vec![variance],
        )
        .unwrap()
    }

    #[test]
    fn sqrt_of_square_unit()
    {
        let a = x1(4.0, 0.5, Unit::M.pow(2));
        let r = sqrt(&a).unwrap();
        assert_eq!(r.unit(), Unit::M);
        assert_abs_diff_eq!(r.values::<f64>().unwrap()[0], 2.0);
        assert_abs_diff_eq!(r.variances::<f64>().unwrap()[0], 0.5 / 16.0);
        assert!(sqrt(&x1(1.0, 0.0, Unit::M)).is_err());
    }

    #[test]
    fn exp_requires_dimensionless()
    {
        assert!(matches!(exp(&x1(1.0, 0.0, Unit::M)), Err(Error::Unit(_))));
        let r = exp(&x1(1.0, 0.1, Unit::DIMENSIONLESS)).unwrap();
        let e = 1.0f64.exp();
        assert_abs_diff_eq!(r.values::<f64>().unwrap()[0], e);
        assert_abs_diff_eq!(r.variances::<f64>().unwrap()[0], 0.1 * e * e);
    }

    #[test]
    fn pow_raises_unit()
    {
        let a = x1(2.0, 0.1, Unit::M);
        let r = pow(&a, 3).unwrap();
        assert_eq!(r.unit(), Unit::M.pow(3));
        assert_abs_diff_eq!(r.values::<f64>().unwrap()[0], 8.0);
    }

    #[test]
    fn negative_int_pow_rejected()
    {
        let a = Variable::scalar(3i64);
        assert!(matches!(pow(&a, -1), Err(Error::Type(_))));
        assert_eq!(pow(&a, 3).unwrap().values::<i64>().unwrap(), &[27]);
    }

    #[test]
    fn in_place_forms()
    {
        let mut a = x1(4.0, 0.5, Unit::M.pow(2));
        sqrt_in_place(&mut a).unwrap();
        assert_eq!(a.unit(), Unit::M);
        assert_abs_diff_eq!(a.values::<f64>().unwrap()[0], 2.0);
        // Negative elements propagate NaN, not an error.
        let mut b = Variable::new(
            Dimensions::from(&[(Dim::X, 2)][..]),
            Unit::DIMENSIONLESS,
            vec![4.0, -1.0],
        )
        .unwrap();
        sqrt_in_place(&mut b).unwrap();
        assert_abs_diff_eq!(b.values::<f64>().unwrap()[0], 2.0);
        assert!(b.values::<f64>().unwrap()[1].is_nan());
    }
}
