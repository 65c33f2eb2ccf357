// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The elementwise transform engine.
//!
//! A transform applies a kernel over broadcast-aligned views of one or
//! two variables. The kernel bundles a unit function, a value function
//! and a value-with-variance function; the engine contributes dtype
//! dispatch, dimension merging, the variance-presence policy, output
//! allocation and parallel iteration over blocks of the outermost
//! output dimension.
//!
//! Preflight order is fixed: dtype dispatch, dimension merge, unit
//! kernel, variance policy — all before any allocation or write, so a
//! failed transform leaves every operand untouched. Per-element IEEE
//! anomalies (negative sqrt, division by zero) are not checked and
//! propagate as NaN/Inf.

pub(crate) mod accumulate;
pub(crate) mod kernels;

use std::ops::Range;

use num_traits::cast::AsPrimitive;
use num_traits::Float;

use crate::dimensions::Dimensions;
use crate::dtype::{DType, Element};
use crate::element_view::ElementArrayView;
use crate::error::{Error, Result};
use crate::parallel::{parallel_for, SendPtr, TRANSFORM_GRAIN};
use crate::units::Unit;
use crate::value_variance::ValueAndVariance;
use crate::variable::Variable;
use crate::view_index::ViewIndex;

/// Element types the arithmetic kernels run on.
pub(crate) trait Numeric: Element + Copy + PartialOrd + num_traits::Signed {}

impl Numeric for f64 {}
impl Numeric for f32 {}
impl Numeric for i64 {}
impl Numeric for i32 {}

/// A two-operand kernel: unit function, value function, and the same
/// value function lifted to value/variance pairs.
pub(crate) trait BinaryKernel: Copy + Send + Sync
{
    const NAME: &'static str;
    /// Additive kernels treat a missing variance channel as an exact
    /// operand; multiplicative kernels reject mixed presence.
    const MIXED_VARIANCES_OK: bool;

    fn unit(&self, a: Unit, b: Unit) -> Result<Unit>;
    fn value<T: Numeric>(&self, a: T, b: T) -> T;
    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>, b: ValueAndVariance<T>)
        -> ValueAndVariance<T>;
}

/// A one-operand kernel.
///
/// Kernels meaningful for integers (negation, absolute value) opt in
/// via `INT_SUPPORTED` and override `value_int`; transcendental kernels
/// leave it unimplemented and dispatch rejects integer dtypes first.
pub(crate) trait UnaryKernel: Copy + Send + Sync
{
    const NAME: &'static str;
    const INT_SUPPORTED: bool = false;

    fn unit(&self, a: Unit) -> Result<Unit>;
    fn value_int<T: Numeric>(&self, _a: T) -> T
    {
        unreachable!("integer dispatch is gated by INT_SUPPORTED")
    }
    fn value<T: Float + Numeric>(&self, a: T) -> T;
    fn value_vv<T: Float>(&self, a: ValueAndVariance<T>) -> ValueAndVariance<T>;
}

pub(crate) fn mixed_variances_error() -> Error
{
    Error::Variances("either both or none of the operands must have a variance".into())
}

fn variances_into_plain_error() -> Error
{
    Error::Variances("cannot write variances into a variable without a variance channel".into())
}

fn in_place_dims_error(dst: &Dimensions, merged: &Dimensions) -> Error
{
    Error::Dimension(format!(
        "in-place destination with dimensions {} cannot hold result dimensions {}",
        dst, merged
    ))
}

// --- dispatch -------------------------------------------------------------

/// Enumerates the supported dtype tuples of the binary kernels. Pairs
/// with a floating-point result go through `$float` (variance-capable);
/// pure integer pairs through `$int`.
macro_rules! binary_dtype_dispatch {
    ($da:expr, $db:expr, $name:expr, $float:ident, $int:ident) => {
        match ($da, $db) {
            (DType::Float64, DType::Float64) => $float!(f64, f64, f64),
            (DType::Float32, DType::Float32) => $float!(f32, f32, f32),
            (DType::Float64, DType::Float32) => $float!(f64, f32, f64),
            (DType::Float32, DType::Float64) => $float!(f32, f64, f64),
            (DType::Float64, DType::Int64) => $float!(f64, i64, f64),
            (DType::Int64, DType::Float64) => $float!(i64, f64, f64),
            (DType::Float64, DType::Int32) => $float!(f64, i32, f64),
            (DType::Int32, DType::Float64) => $float!(i32, f64, f64),
            (DType::Int64, DType::Int64) => $int!(i64, i64, i64),
            (DType::Int32, DType::Int32) => $int!(i32, i32, i32),
            (DType::Int64, DType::Int32) => $int!(i64, i32, i64),
            (DType::Int32, DType::Int64) => $int!(i32, i64, i64),
            (da, db) => Err(Error::unsupported_dtype_pair($name, da, db)),
        }
    };
}

pub(crate) fn transform_binary<Op: BinaryKernel>(op: Op, a: &Variable, b: &Variable)
    -> Result<Variable>
{
    macro_rules! float {
        ($A:ty, $B:ty, $O:ty) => {
            binary_float::<$A, $B, $O, Op>(op, a, b)
        };
    }
    macro_rules! int {
        ($A:ty, $B:ty, $O:ty) => {
            binary_int::<$A, $B, $O, Op>(op, a, b)
        };
    }
    binary_dtype_dispatch!(a.dtype(), b.dtype(), Op::NAME, float, int)
}

/// In-place form: `dst` is the first operand and the destination, so
/// only tuples whose result dtype equals `dst`'s are supported.
pub(crate) fn transform_binary_in_place<Op: BinaryKernel>(
    op: Op, dst: &mut Variable, src: &Variable,
) -> Result<()>
{
    macro_rules! float {
        ($A:ty, $B:ty) => {
            binary_in_place_float::<$A, $B, Op>(op, dst, src)
        };
    }
    macro_rules! int {
        ($A:ty, $B:ty) => {
            binary_in_place_int::<$A, $B, Op>(op, dst, src)
        };
    }
    match (dst.dtype(), src.dtype()) {
        (DType::Float64, DType::Float64) => float!(f64, f64),
        (DType::Float64, DType::Float32) => float!(f64, f32),
        (DType::Float64, DType::Int64) => float!(f64, i64),
        (DType::Float64, DType::Int32) => float!(f64, i32),
        (DType::Float32, DType::Float32) => float!(f32, f32),
        (DType::Float32, DType::Float64) => float!(f32, f64),
        (DType::Int64, DType::Int64) => int!(i64, i64),
        (DType::Int64, DType::Int32) => int!(i64, i32),
        (DType::Int32, DType::Int32) => int!(i32, i32),
        (da, db) => Err(Error::unsupported_dtype_pair(Op::NAME, da, db)),
    }
}

pub(crate) fn transform_unary<Op: UnaryKernel>(op: Op, a: &Variable) -> Result<Variable>
{
    match a.dtype() {
        DType::Float64 => unary_float::<f64, Op>(op, a),
        DType::Float32 => unary_float::<f32, Op>(op, a),
        DType::Int64 if Op::INT_SUPPORTED => unary_int::<i64, Op>(op, a),
        DType::Int32 if Op::INT_SUPPORTED => unary_int::<i32, Op>(op, a),
        dtype => Err(Error::unsupported_dtype(Op::NAME, dtype)),
    }
}

pub(crate) fn transform_unary_in_place<Op: UnaryKernel>(op: Op, dst: &mut Variable)
    -> Result<()>
{
    match dst.dtype() {
        DType::Float64 => unary_in_place_float::<f64, Op>(op, dst),
        DType::Float32 => unary_in_place_float::<f32, Op>(op, dst),
        DType::Int64 if Op::INT_SUPPORTED => unary_in_place_int::<i64, Op>(op, dst),
        DType::Int32 if Op::INT_SUPPORTED => unary_in_place_int::<i32, Op>(op, dst),
        dtype => Err(Error::unsupported_dtype(Op::NAME, dtype)),
    }
}

// --- iteration helpers ----------------------------------------------------

/// Split a dimension set into (outermost length, inner volume).
fn outer_split(dims: &Dimensions) -> (usize, usize)
{
    if dims.ndim() == 0 {
        return (1, 1);
    }
    let outer = dims.at(0).1;
    let inner = if outer == 0 { 0 } else { dims.volume() / outer };
    (outer, inner)
}

fn outer_grain(inner: usize) -> usize
{
    (TRANSFORM_GRAIN / inner.max(1)).max(1)
}

fn rows<'a, T>(view: &ElementArrayView<'a, T>, range: &Range<usize>) -> ElementArrayView<'a, T>
{
    if view.dims().ndim() == 0 {
        view.clone()
    } else {
        view.restrict(0, range.start, range.end)
    }
}

pub(crate) fn check_binary_variances(
    mixed_ok: bool, a: &Variable, b: &Variable,
) -> Result<bool>
{
    let (a_has, b_has) = (a.has_variances(), b.has_variances());
    if !mixed_ok && a_has != b_has {
        return Err(mixed_variances_error());
    }
    Ok(a_has || b_has)
}

// --- out-of-place drivers -------------------------------------------------

fn binary_float<A, B, O, Op>(op: Op, a: &Variable, b: &Variable) -> Result<Variable>
where
    A: Numeric + AsPrimitive<O>,
    B: Numeric + AsPrimitive<O>,
    O: Numeric + Float,
    Op: BinaryKernel,
{
    let dims = Dimensions::merge(a.dims(), b.dims())?;
    let unit = op.unit(a.unit(), b.unit())?;
    let with_variances = check_binary_variances(Op::MIXED_VARIANCES_OK, a, b)?;
    let mut values = vec![O::zero(); dims.volume()];
    let av = a.broadcast_values::<A>(&dims);
    let bv = b.broadcast_values::<B>(&dims);
    if !with_variances {
        zip_values::<A, B, O, Op>(op, &mut values, &av, &bv);
        return Ok(Variable::from_parts(dims, unit, values, None));
    }
    let mut variances = vec![O::zero(); dims.volume()];
    let a_var = a.broadcast_variances::<A>(&dims);
    let b_var = b.broadcast_variances::<B>(&dims);
    zip_values_vv::<A, B, O, Op>(
        op,
        &mut values,
        &mut variances,
        &av,
        a_var.as_ref(),
        &bv,
        b_var.as_ref(),
    );
    Ok(Variable::from_parts(dims, unit, values, Some(variances)))
}

fn binary_int<A, B, O, Op>(op: Op, a: &Variable, b: &Variable) -> Result<Variable>
where
    A: Numeric + AsPrimitive<O>,
    B: Numeric + AsPrimitive<O>,
    O: Numeric,
    Op: BinaryKernel,
{
    let dims = Dimensions::merge(a.dims(), b.dims())?;
    let unit = op.unit(a.unit(), b.unit())?;
    debug_assert!(!a.has_variances() && !b.has_variances());
    let mut values = vec![O::zero(); dims.volume()];
    let av = a.broadcast_values::<A>(&dims);
    let bv = b.broadcast_values::<B>(&dims);
    zip_values::<A, B, O, Op>(op, &mut values, &av, &bv);
    Ok(Variable::from_parts(dims, unit, values, None))
}

fn zip_values<A, B, O, Op>(
    op: Op, out: &mut [O], av: &ElementArrayView<'_, A>, bv: &ElementArrayView<'_, B>,
) where
    A: Numeric + AsPrimitive<O>,
    B: Numeric + AsPrimitive<O>,
    O: Numeric,
    Op: BinaryKernel,
{
    let (outer, inner) = outer_split(av.dims());
    let out_ptr = SendPtr::new(out.as_mut_ptr());
    parallel_for(outer, outer_grain(inner), |range| {
        let ac = rows(av, &range);
        let bc = rows(bv, &range);
        let len = (range.end - range.start) * inner;
        let dst = unsafe { out_ptr.get().add(range.start * inner) };
        match (ac.as_slice(), bc.as_slice()) {
            (Some(a_s), Some(b_s)) => {
                // Contiguous fast path: plain lockstep walk.
                for i in 0..len {
                    let x: O = a_s[i].as_();
                    let y: O = b_s[i].as_();
                    unsafe { *dst.add(i) = op.value(x, y) };
                }
            }
            _ => {
                let (a_data, a_base) = (ac.data(), ac.base());
                let (b_data, b_base) = (bc.data(), bc.base());
                let mut ia = ac.view_index();
                let mut ib = bc.view_index();
                for i in 0..len {
                    let x: O = a_data[(a_base + ia.offset()) as usize].as_();
                    let y: O = b_data[(b_base + ib.offset()) as usize].as_();
                    unsafe { *dst.add(i) = op.value(x, y) };
                    ia.increment();
                    ib.increment();
                }
            }
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn zip_values_vv<A, B, O, Op>(
    op: Op, values: &mut [O], variances: &mut [O], av: &ElementArrayView<'_, A>,
    a_var: Option<&ElementArrayView<'_, A>>, bv: &ElementArrayView<'_, B>,
    b_var: Option<&ElementArrayView<'_, B>>,
) where
    A: Numeric + AsPrimitive<O>,
    B: Numeric + AsPrimitive<O>,
    O: Numeric + Float,
    Op: BinaryKernel,
{
    let (outer, inner) = outer_split(av.dims());
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = SendPtr::new(variances.as_mut_ptr());
    // Variance buffers share the value buffers' layout, so one view
    // index per operand serves both channels.
    let a_var_data = a_var.map(|view| view.data());
    let b_var_data = b_var.map(|view| view.data());
    parallel_for(outer, outer_grain(inner), |range| {
        let ac = rows(av, &range);
        let bc = rows(bv, &range);
        let len = (range.end - range.start) * inner;
        let (a_data, a_base) = (ac.data(), ac.base());
        let (b_data, b_base) = (bc.data(), bc.base());
        let mut ia = ac.view_index();
        let mut ib = bc.view_index();
        for i in 0..len {
            let off_a = (a_base + ia.offset()) as usize;
            let off_b = (b_base + ib.offset()) as usize;
            let x = ValueAndVariance::new(
                a_data[off_a].as_(),
                a_var_data.map_or_else(O::zero, |d| d[off_a].as_()),
            );
            let y = ValueAndVariance::new(
                b_data[off_b].as_(),
                b_var_data.map_or_else(O::zero, |d| d[off_b].as_()),
            );
            let r = op.value_vv(x, y);
            unsafe {
                *val_ptr.get().add(range.start * inner + i) = r.value;
                *var_ptr.get().add(range.start * inner + i) = r.variance;
            }
            ia.increment();
            ib.increment();
        }
    });
}

fn unary_float<T, Op>(op: Op, a: &Variable) -> Result<Variable>
where
    T: Numeric + Float,
    Op: UnaryKernel,
{
    let dims = a.dims().clone();
    let unit = op.unit(a.unit())?;
    let av = a.broadcast_values::<T>(&dims);
    let mut values = vec![T::zero(); dims.volume()];
    if !a.has_variances() {
        map_values::<T, _>(&mut values, &av, |x| op.value(x));
        return Ok(Variable::from_parts(dims, unit, values, None));
    }
    let mut variances = vec![T::zero(); dims.volume()];
    let a_var = a.broadcast_variances::<T>(&dims).expect("variance presence checked");
    let var_data = a_var.data();
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = SendPtr::new(variances.as_mut_ptr());
    let (outer, inner) = outer_split(&dims);
    parallel_for(outer, outer_grain(inner), |range| {
        let ac = rows(&av, &range);
        let len = (range.end - range.start) * inner;
        let (a_data, a_base) = (ac.data(), ac.base());
        let mut ia = ac.view_index();
        for i in 0..len {
            let off = (a_base + ia.offset()) as usize;
            let r = op.value_vv(ValueAndVariance::new(a_data[off], var_data[off]));
            unsafe {
                *val_ptr.get().add(range.start * inner + i) = r.value;
                *var_ptr.get().add(range.start * inner + i) = r.variance;
            }
            ia.increment();
        }
    });
    Ok(Variable::from_parts(dims, unit, values, Some(variances)))
}

fn unary_int<T, Op>(op: Op, a: &Variable) -> Result<Variable>
where
    T: Numeric,
    Op: UnaryKernel,
{
    let dims = a.dims().clone();
    let unit = op.unit(a.unit())?;
    let av = a.broadcast_values::<T>(&dims);
    let mut values = vec![T::zero(); dims.volume()];
    map_values::<T, _>(&mut values, &av, |x| op.value_int(x));
    Ok(Variable::from_parts(dims, unit, values, None))
}

fn map_values<T, F>(out: &mut [T], av: &ElementArrayView<'_, T>, f: F)
where
    T: Numeric,
    F: Fn(T) -> T + Send + Sync,
{
    let (outer, inner) = outer_split(av.dims());
    let out_ptr = SendPtr::new(out.as_mut_ptr());
    parallel_for(outer, outer_grain(inner), |range| {
        let ac = rows(av, &range);
        let len = (range.end - range.start) * inner;
        let dst = unsafe { out_ptr.get().add(range.start * inner) };
        if let Some(a_s) = ac.as_slice() {
            for i in 0..len {
                unsafe { *dst.add(i) = f(a_s[i]) };
            }
        } else {
            let (a_data, a_base) = (ac.data(), ac.base());
            let mut ia = ac.view_index();
            for i in 0..len {
                unsafe { *dst.add(i) = f(a_data[(a_base + ia.offset()) as usize]) };
                ia.increment();
            }
        }
    });
}

// --- in-place drivers -----------------------------------------------------

/// Common in-place preflight: result dims must equal the destination's,
/// and the destination must not be a broadcast view.
fn check_in_place_dims(dst: &Variable, src_dims: &Dimensions) -> Result<()>
{
    let merged = Dimensions::merge(dst.dims(), src_dims)?;
    if &merged != dst.dims() {
        return Err(in_place_dims_error(dst.dims(), &merged));
    }
    let (dims, strides, _) = dst.layout();
    if strides.is_broadcast(dims) {
        return Err(Error::broadcast_write(dims));
    }
    Ok(())
}

fn binary_in_place_float<A, B, Op>(op: Op, dst: &mut Variable, src: &Variable) -> Result<()>
where
    A: Numeric + Float,
    B: Numeric + AsPrimitive<A>,
    Op: BinaryKernel,
{
    check_in_place_dims(dst, src.dims())?;
    let unit = op.unit(dst.unit(), src.unit())?;
    let (dst_has, src_has) = (dst.has_variances(), src.has_variances());
    if src_has && !dst_has {
        return Err(variances_into_plain_error());
    }
    if !Op::MIXED_VARIANCES_OK && dst_has != src_has {
        return Err(mixed_variances_error());
    }
    let target = dst.dims().clone();
    let (_, d_strides, d_offset) = dst.layout();
    let d_strides = d_strides.clone();
    let (outer, inner) = outer_split(&target);
    let sv = src.broadcast_values::<B>(&target);
    let s_var = src.broadcast_variances::<B>(&target);
    let s_var_data = s_var.as_ref().map(|view| view.data());
    // Uniquifies the destination, which is also what decouples it from
    // any source sharing the same buffer: sources were viewed above and
    // keep reading the old storage.
    let (values, variances) = dst.dense_parts_mut::<A>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = variances.map(|v| SendPtr::new(v.as_mut_ptr()));
    parallel_for(outer, outer_grain(inner), |range| {
        let sc = rows(&sv, &range);
        let len = (range.end - range.start) * inner;
        let (s_data, s_base) = (sc.data(), sc.base());
        let mut is = sc.view_index();
        let mut id = ViewIndex::new(&target, &d_strides);
        id.seek(range.start * inner);
        for _ in 0..len {
            let off_d = (d_offset + id.offset()) as usize;
            let off_s = (s_base + is.offset()) as usize;
            match var_ptr {
                Some(var_ptr) => {
                    let x = ValueAndVariance::new(unsafe { *val_ptr.get().add(off_d) }, unsafe {
                        *var_ptr.get().add(off_d)
                    });
                    let y = ValueAndVariance::new(
                        s_data[off_s].as_(),
                        s_var_data.map_or_else(A::zero, |d| d[off_s].as_()),
                    );
                    let r = op.value_vv(x, y);
                    unsafe {
                        *val_ptr.get().add(off_d) = r.value;
                        *var_ptr.get().add(off_d) = r.variance;
                    }
                }
                None => {
                    let x = unsafe { *val_ptr.get().add(off_d) };
                    let y: A = s_data[off_s].as_();
                    unsafe { *val_ptr.get().add(off_d) = op.value(x, y) };
                }
            }
            id.increment();
            is.increment();
        }
    });
    dst.set_unit(unit);
    Ok(())
}

fn binary_in_place_int<A, B, Op>(op: Op, dst: &mut Variable, src: &Variable) -> Result<()>
where
    A: Numeric,
    B: Numeric + AsPrimitive<A>,
    Op: BinaryKernel,
{
    check_in_place_dims(dst, src.dims())?;
    let unit = op.unit(dst.unit(), src.unit())?;
    debug_assert!(!dst.has_variances() && !src.has_variances());
    let target = dst.dims().clone();
    let (_, d_strides, d_offset) = dst.layout();
    let d_strides = d_strides.clone();
    let (outer, inner) = outer_split(&target);
    let sv = src.broadcast_values::<B>(&target);
    let (values, _) = dst.dense_parts_mut::<A>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    parallel_for(outer, outer_grain(inner), |range| {
        let sc = rows(&sv, &range);
        let len = (range.end - range.start) * inner;
        let (s_data, s_base) = (sc.data(), sc.base());
        let mut is = sc.view_index();
        let mut id = ViewIndex::new(&target, &d_strides);
        id.seek(range.start * inner);
        for _ in 0..len {
            let off_d = (d_offset + id.offset()) as usize;
            let x = unsafe { *val_ptr.get().add(off_d) };
            let y: A = s_data[(s_base + is.offset()) as usize].as_();
            unsafe { *val_ptr.get().add(off_d) = op.value(x, y) };
            id.increment();
            is.increment();
        }
    });
    dst.set_unit(unit);
    Ok(())
}

fn unary_in_place_float<T, Op>(op: Op, dst: &mut Variable) -> Result<()>
where
    T: Numeric + Float,
    Op: UnaryKernel,
{
    check_in_place_dims(dst, &Dimensions::empty())?;
    let unit = op.unit(dst.unit())?;
    let target = dst.dims().clone();
    let (_, d_strides, d_offset) = dst.layout();
    let d_strides = d_strides.clone();
    let (outer, inner) = outer_split(&target);
    let (values, variances) = dst.dense_parts_mut::<T>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = variances.map(|v| SendPtr::new(v.as_mut_ptr()));
    parallel_for(outer, outer_grain(inner), |range| {
        let mut id = ViewIndex::new(&target, &d_strides);
        id.seek(range.start * inner);
        for _ in 0..(range.end - range.start) * inner {
            let off = (d_offset + id.offset()) as usize;
            match var_ptr {
                Some(var_ptr) => {
                    let x = ValueAndVariance::new(unsafe { *val_ptr.get().add(off) }, unsafe {
                        *var_ptr.get().add(off)
                    });
                    let r = op.value_vv(x);
                    unsafe {
                        *val_ptr.get().add(off) = r.value;
                        *var_ptr.get().add(off) = r.variance;
                    }
                }
                None => unsafe { *val_ptr.get().add(off) = op.value(*val_ptr.get().add(off)) },
            }
            id.increment();
        }
    });
    dst.set_unit(unit);
    Ok(())
}

fn unary_in_place_int<T, Op>(op: Op, dst: &mut Variable) -> Result<()>
where
    T: Numeric,
    Op: UnaryKernel,
{
    check_in_place_dims(dst, &Dimensions::empty())?;
    let unit = op.unit(dst.unit())?;
    let target = dst.dims().clone();
    let (_, d_strides, d_offset) = dst.layout();
    let d_strides = d_strides.clone();
    let (outer, inner) = outer_split(&target);
    let (values, _) = dst.dense_parts_mut::<T>()?;
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    parallel_for(outer, outer_grain(inner), |range| {
        let mut id = ViewIndex::new(&target, &d_strides);
        id.seek(range.start * inner);
        for _ in 0..(range.end - range.start) * inner {
            let off = (d_offset + id.offset()) as usize;
            unsafe { *val_ptr.get().add(off) = op.value_int(*val_ptr.get().add(off)) };
            id.increment();
        }
    });
    dst.set_unit(unit);
    Ok(())
}
