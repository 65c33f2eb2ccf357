//! Dimension reductions, built on the accumulate engine.

use num_traits::Float;

use crate::dim::Dim;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::transform::accumulate::accumulate_in_place;
use crate::transform::kernels::Plus;
use crate::variable::Variable;

/// Sum over `dim`. The unit is unchanged; variances add.
pub fn sum(a: &Variable, dim: Dim) -> Result<Variable>
{
    if a.is_binned() {
        return Err(Error::unsupported_dtype("sum", DType::Binned));
    }
    a.dims().len_of(dim)?;
    let mut out_dims = a.dims().clone();
    out_dims.erase(dim)?;
    let mut out = Variable::empty(a.dtype(), out_dims, a.unit(), a.has_variances())?;
    accumulate_in_place(Plus, &mut out, a)?;
    Ok(out)
}

/// Arithmetic mean over `dim`, for floating-point dtypes.
///
/// `Var(mean) = Var(sum) / n^2`.
pub fn mean(a: &Variable, dim: Dim) -> Result<Variable>
{
    let n = a.dims().len_of(dim)?;
    let mut out = sum(a, dim)?;
    match out.dtype() {
        DType::Float64 => scale_by_count::<f64>(&mut out, n)?,
        DType::Float32 => scale_by_count::<f32>(&mut out, n)?,
        dtype => return Err(Error::unsupported_dtype("mean", dtype)),
    }
    Ok(out)
}

fn scale_by_count<T: Float + Element>(out: &mut Variable, n: usize) -> Result<()>
{
    let inv = T::one() / T::from(n).expect("count fits the float type");
    for value in out.values_mut::<T>()? {
        *value = *value * inv;
    }
    if out.has_variances() {
        let inv2 = inv * inv;
        for variance in out.variances_mut::<T>()? {
            *variance = *variance * inv2;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dimensions::Dimensions;
    use crate::units::Unit;
    use approx::assert_abs_diff_eq;

    fn yx(values: Vec<f64>) -> Variable
    {
        Variable::new(Dimensions::from(&[(Dim::Y, 2), (Dim::X, 3)][..]), Unit::M, values)
            .unwrap()
    }

    #[test]
    fn sum_over_outer_and_inner()
    {
        let a = yx(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let over_y = sum(&a, Dim::Y).unwrap();
        assert_eq!(over_y.dims(), &Dimensions::from(&[(Dim::X, 3)][..]));
        assert_eq!(over_y.values::<f64>().unwrap(), &[5.0, 7.0, 9.0]);
        assert_eq!(over_y.unit(), Unit::M);
        let over_x = sum(&a, Dim::X).unwrap();
        assert_eq!(over_x.values::<f64>().unwrap(), &[6.0, 15.0]);
    }

    #[test]
    fn sum_of_int_variable()
    {
        let a = Variable::new(
            Dimensions::from(&[(Dim::X, 4)][..]),
            Unit::DIMENSIONLESS,
            vec![1i64, 2, 3, 4],
        )
        .unwrap();
        let total = sum(&a, Dim::X).unwrap();
        assert_eq!(total.values::<i64>().unwrap(), &[10]);
    }

    #[test]
    fn mean_scales_variances_quadratically()
    {
        let a = Variable::with_variances(
            Dimensions::from(&[(Dim::X, 2)][..]),
            Unit::M,
            vec![1.0, 3.0],
            vec![0.4, 0.8],
        )
        .unwrap();
        let m = mean(&a, Dim::X).unwrap();
        assert_abs_diff_eq!(m.values::<f64>().unwrap()[0], 2.0);
        assert_abs_diff_eq!(m.variances::<f64>().unwrap()[0], (0.4 + 0.8) / 4.0);
    }

    #[test]
    fn missing_dim_is_reported()
    {
        let a = yx(vec![0.0; 6]);
        assert!(matches!(sum(&a, Dim::Z), Err(Error::DimensionNotFound { .. })));
    }
}
