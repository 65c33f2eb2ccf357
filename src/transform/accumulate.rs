//! The reversed-broadcast transform: the output's dimensions are a
//! subset of the input's, so an output element may be visited several
//! times (reductions, scans).
//!
//! The kernel must be commutative-associative on the output element for
//! the result to be deterministic; this is a precondition, not checked.
//! Unit propagation is skipped — repeated application of the kernel's
//! unit function to an accumulator slot would not be meaningful — so
//! the caller presets the output unit.

use num_traits::Float;

use super::{
    check_binary_variances, mixed_variances_error, BinaryKernel, Numeric,
};
use crate::dtype::DType;
use crate::element_view::ElementArrayView;
use crate::error::{Error, Result};
use crate::parallel::{parallel_for, SendPtr, TRANSFORM_GRAIN};
use crate::strides::Strides;
use crate::value_variance::ValueAndVariance;
use crate::variable::Variable;
use crate::view_index::ViewIndex;

/// Accumulate `input` into `out` with `op`, broadcasting `out` over the
/// dimensions of `input` it lacks.
pub(crate) fn accumulate_in_place<Op: BinaryKernel>(
    op: Op, out: &mut Variable, input: &Variable,
) -> Result<()>
{
    match (out.dtype(), input.dtype()) {
        (DType::Float64, DType::Float64) => accumulate_float::<f64, Op>(op, out, input),
        (DType::Float32, DType::Float32) => accumulate_float::<f32, Op>(op, out, input),
        (DType::Int64, DType::Int64) => accumulate_int::<i64, Op>(op, out, input),
        (DType::Int32, DType::Int32) => accumulate_int::<i32, Op>(op, out, input),
        (da, db) => Err(Error::unsupported_dtype_pair(Op::NAME, da, db)),
    }
}

fn check_accumulate_dims(out: &Variable, input: &Variable) -> Result<()>
{
    if !input.dims().includes(out.dims()) {
        return Err(Error::Dimension(format!(
            "accumulation target {} is not a subset of the input dimensions {}",
            out.dims(),
            input.dims()
        )));
    }
    let (dims, strides, _) = out.layout();
    if strides.is_broadcast(dims) {
        return Err(Error::broadcast_write(dims));
    }
    Ok(())
}

fn accumulate_float<T, Op>(op: Op, out: &mut Variable, input: &Variable) -> Result<()>
where
    T: Numeric + Float,
    Op: BinaryKernel,
{
    check_accumulate_dims(out, input)?;
    if input.has_variances() && !out.has_variances() {
        return Err(mixed_variances_error());
    }
    check_binary_variances(Op::MIXED_VARIANCES_OK, out, input)?;
    let out_has = out.has_variances();
    let target = input.dims().clone();
    let (bc, o_offset, axis) = {
        let (o_dims, o_strides, o_offset) = out.layout();
        let axis = o_dims.outer().and_then(|dim| target.index_of(dim));
        (o_strides.broadcast_to(o_dims, &target), o_offset, axis)
    };
    let iv = input.broadcast_values::<T>(&target);
    let i_var = input.broadcast_variances::<T>(&target);
    let i_var_data = i_var.as_ref().map(|view| view.data());
    let (values, variances) = out.dense_parts_mut::<T>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = variances.map(|v| SendPtr::new(v.as_mut_ptr()));
    let run = |block: &ElementArrayView<'_, T>, o_base: isize| {
        if out_has {
            let var_ptr = var_ptr.expect("variance channel present");
            accumulate_block_vv::<T, Op>(op, val_ptr, var_ptr, o_base, &bc, block, i_var_data);
        } else {
            accumulate_block_plain::<T, Op>(op, val_ptr, o_base, &bc, block);
        }
    };
    match axis {
        // Slice the outermost output dimension into blocks; input and
        // output blocks are disjoint, visits within a block are serial.
        Some(axis) if target.volume() > 0 => {
            let len = target.at(axis).1;
            let per_index = target.volume() / len.max(1);
            parallel_for(len, (TRANSFORM_GRAIN / per_index.max(1)).max(1), |range| {
                let block = iv.restrict(axis, range.start, range.end);
                run(&block, o_offset + range.start as isize * bc.at(axis));
            });
        }
        // Scalar output: serial accumulation over the whole input.
        _ => run(&iv, o_offset),
    }
    Ok(())
}

fn accumulate_int<T, Op>(op: Op, out: &mut Variable, input: &Variable) -> Result<()>
where
    T: Numeric,
    Op: BinaryKernel,
{
    check_accumulate_dims(out, input)?;
    debug_assert!(!out.has_variances() && !input.has_variances());
    let target = input.dims().clone();
    let (bc, o_offset, axis) = {
        let (o_dims, o_strides, o_offset) = out.layout();
        let axis = o_dims.outer().and_then(|dim| target.index_of(dim));
        (o_strides.broadcast_to(o_dims, &target), o_offset, axis)
    };
    let iv = input.broadcast_values::<T>(&target);
    let (values, _) = out.dense_parts_mut::<T>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    match axis {
        Some(axis) if target.volume() > 0 => {
            let len = target.at(axis).1;
            let per_index = target.volume() / len.max(1);
            parallel_for(len, (TRANSFORM_GRAIN / per_index.max(1)).max(1), |range| {
                let block = iv.restrict(axis, range.start, range.end);
                let o_base = o_offset + range.start as isize * bc.at(axis);
                accumulate_block_plain::<T, Op>(op, val_ptr, o_base, &bc, &block);
            });
        }
        _ => accumulate_block_plain::<T, Op>(op, val_ptr, o_offset, &bc, &iv),
    }
    Ok(())
}

/// Walk a block of the input, folding each element into the output slot
/// its coordinates map to (stride 0 over reduced dimensions).
fn accumulate_block_plain<T, Op>(
    op: Op, val_ptr: SendPtr<T>, o_base: isize, out_strides: &Strides,
    block: &ElementArrayView<'_, T>,
) where
    T: Numeric,
    Op: BinaryKernel,
{
    let (data, base) = (block.data(), block.base());
    let mut iv = block.view_index();
    let mut ov = ViewIndex::new(block.dims(), out_strides);
    for _ in 0..block.len() {
        let off_o = (o_base + ov.offset()) as usize;
        let x = unsafe { *val_ptr.get().add(off_o) };
        let y = data[(base + iv.offset()) as usize];
        unsafe { *val_ptr.get().add(off_o) = op.value(x, y) };
        iv.increment();
        ov.increment();
    }
}

fn accumulate_block_vv<T, Op>(
    op: Op, val_ptr: SendPtr<T>, var_ptr: SendPtr<T>, o_base: isize, out_strides: &Strides,
    block: &ElementArrayView<'_, T>, block_var: Option<&[T]>,
) where
    T: Numeric + Float,
    Op: BinaryKernel,
{
    let (data, base) = (block.data(), block.base());
    let mut iv = block.view_index();
    let mut ov = ViewIndex::new(block.dims(), out_strides);
    for _ in 0..block.len() {
        let off_o = (o_base + ov.offset()) as usize;
        let off_i = (base + iv.offset()) as usize;
        let x = ValueAndVariance::new(unsafe { *val_ptr.get().add(off_o) }, unsafe {
            *var_ptr.get().add(off_o)
        });
        let y =
            ValueAndVariance::new(data[off_i], block_var.map_or_else(T::zero, |d| d[off_i]));
        let r = op.value_vv(x, y);
        unsafe {
            *val_ptr.get().add(off_o) = r.value;
            *var_ptr.get().add(off_o) = r.variance;
        }
        iv.increment();
        ov.increment();
    }
}

#[cfg(test)]
mod tests
{
    use super::super::kernels::Plus;
    use super::*;
    use crate::dim::Dim;
    use crate::dimensions::Dimensions;
    use crate::units::Unit;

    fn dims(pairs: &[(Dim, usize)]) -> Dimensions
    {
        Dimensions::from(pairs)
    }

    #[test]
    fn sum_into_broadcast_output()
    {
        let mut out = Variable::new(dims(&[(Dim::X, 2)]), Unit::M, vec![0.0, 0.0]).unwrap();
        let input = Variable::new(
            dims(&[(Dim::Y, 3), (Dim::X, 2)]),
            Unit::M,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();
        accumulate_in_place(Plus, &mut out, &input).unwrap();
        assert_eq!(out.values::<f64>().unwrap(), &[9.0, 12.0]);
    }

    #[test]
    fn scalar_output_runs_serially()
    {
        let mut out = Variable::scalar(0.0).with_unit(Unit::M);
        let input =
            Variable::new(dims(&[(Dim::X, 4)]), Unit::M, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        accumulate_in_place(Plus, &mut out, &input).unwrap();
        assert_eq!(out.values::<f64>().unwrap(), &[10.0]);
        // Unit propagation is skipped: the output keeps its preset unit.
        assert_eq!(out.unit(), Unit::M);
    }

    #[test]
    fn variances_accumulate_linearly()
    {
        let mut out = Variable::with_variances(
            dims(&[(Dim::X, 2)]),
            Unit::M,
            vec![0.0, 0.0],
            vec![0.0, 0.0],
        )
        .unwrap();
        let input = Variable::with_variances(
            dims(&[(Dim::Y, 2), (Dim::X, 2)]),
            Unit::M,
            vec![1.0, 2.0, 3.0, 4.0],
            vec![0.1, 0.2, 0.3, 0.4],
        )
        .unwrap();
        accumulate_in_place(Plus, &mut out, &input).unwrap();
        assert_eq!(out.values::<f64>().unwrap(), &[4.0, 6.0]);
        assert_eq!(out.variances::<f64>().unwrap(), &[0.4, 0.6000000000000001]);
    }

    #[test]
    fn output_must_be_subset()
    {
        let mut out = Variable::new(dims(&[(Dim::Z, 2)]), Unit::M, vec![0.0, 0.0]).unwrap();
        let input = Variable::new(dims(&[(Dim::X, 2)]), Unit::M, vec![1.0, 2.0]).unwrap();
        assert!(matches!(
            accumulate_in_place(Plus, &mut out, &input),
            Err(Error::Dimension(_))
        ));
    }
}
