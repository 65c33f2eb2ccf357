//! Operations over binned variables.
//!
//! A binned variable stores `[begin, end)` ranges into a shared dense
//! buffer; every operation here reduces to work on the buffer indexed
//! through those ranges. Event lists with per-event weights are
//! expressed as two binned variables over identical ranges.

use crate::data_array::DataArray;
use crate::dim::Dim;
use crate::dimensions::Dimensions;
use crate::dtype::{for_each_element_type, DType, Element, IndexPair};
use crate::error::{Error, Result};
use crate::histogram::{check_coord_unit, check_weight_unit, histogram_slices, EdgeSpec};
use crate::parallel::{parallel_for, SendPtr};
use crate::transform::Numeric;
use crate::units::Unit;
use crate::variable::Variable;

/// Number of elements in each bin, as a dimensionless `int64` variable.
pub fn bin_sizes(v: &Variable) -> Result<Variable>
{
    let (indices, _, _) = v.binned_parts()?;
    let sizes: Vec<i64> = indices.iter().map(|pair| pair.len()).collect();
    Variable::new(v.dims().clone(), Unit::DIMENSIONLESS, sizes)
}

/// Bin-wise concatenation: at every outer coordinate the result bin is
/// `a`'s slice followed by `b`'s slice. Outer dimensions broadcast; the
/// result owns a freshly packed buffer.
pub fn concatenate(a: &Variable, b: &Variable) -> Result<Variable>
{
    let (a_indices, a_dim, a_buffer) = a.binned_parts()?;
    let (b_indices, b_dim, b_buffer) = b.binned_parts()?;
    if a_dim != b_dim {
        return Err(Error::Dimension(format!("bin dimension mismatch: {} vs {}", a_dim, b_dim)));
    }
    if a_buffer.dtype() != b_buffer.dtype() {
        return Err(Error::dtype_mismatch(a_buffer.dtype(), b_buffer.dtype()));
    }
    if a_buffer.unit() != b_buffer.unit() {
        return Err(Error::UnitMismatch { left: a_buffer.unit(), right: b_buffer.unit() });
    }
    if a_buffer.has_variances() != b_buffer.has_variances() {
        return Err(Error::Variances(
            "either both or none of the bin buffers must have a variance".into(),
        ));
    }
    let out_dims = Dimensions::merge(a.dims(), b.dims())?;
    let pairs: Vec<(IndexPair, IndexPair)> = a_indices
        .broadcast_to(&out_dims)
        .iter()
        .zip(b_indices.broadcast_to(&out_dims).iter())
        .map(|(&pa, &pb)| (pa, pb))
        .collect();
    let mut ranges = Vec::with_capacity(pairs.len());
    let mut cursor = 0i64;
    for &(pa, pb) in &pairs {
        let len = pa.len() + pb.len();
        ranges.push(IndexPair::new(cursor, cursor + len));
        cursor += len;
    }

    macro_rules! pack {
        ($t:ty) => {
            if a_buffer.dtype() == <$t as Element>::DTYPE {
                let buffer =
                    pack_buffer::<$t>(a_buffer, b_buffer, &pairs, a_dim, cursor as usize)?;
                return Ok(Variable::bins_from_ranges(out_dims, ranges, a_dim, buffer));
            }
        };
    }
    for_each_element_type!(pack);
    Err(Error::unsupported_dtype("buckets::concatenate", a_buffer.dtype()))
}

fn pack_buffer<T: Element>(
    a_buffer: &Variable, b_buffer: &Variable, pairs: &[(IndexPair, IndexPair)], bin_dim: Dim,
    total: usize,
) -> Result<Variable>
{
    let a_values = a_buffer.values::<T>()?;
    let b_values = b_buffer.values::<T>()?;
    let mut values = Vec::with_capacity(total);
    for &(pa, pb) in pairs {
        values.extend_from_slice(&a_values[pa.begin as usize..pa.end as usize]);
        values.extend_from_slice(&b_values[pb.begin as usize..pb.end as usize]);
    }
    let variances = if a_buffer.has_variances() {
        let a_variances = a_buffer.variances::<T>()?;
        let b_variances = b_buffer.variances::<T>()?;
        let mut variances = Vec::with_capacity(total);
        for &(pa, pb) in pairs {
            variances.extend_from_slice(&a_variances[pa.begin as usize..pa.end as usize]);
            variances.extend_from_slice(&b_variances[pb.begin as usize..pb.end as usize]);
        }
        Some(variances)
    } else {
        None
    };
    let dims = Dimensions::new(&[(bin_dim, total)])?;
    Ok(Variable::from_parts(dims, a_buffer.unit(), values, variances))
}

/// In-place bin-wise concatenation. Unlike [`concatenate`] the outer
/// dimensions must match exactly; a broadcast operand is rejected.
pub fn append(a: &mut Variable, b: &Variable) -> Result<()>
{
    if a.dims() != b.dims() {
        return Err(Error::DimensionMismatch {
            expected: a.dims().clone(),
            actual: b.dims().clone(),
        });
    }
    *a = concatenate(a, b)?;
    Ok(())
}

/// Reduce every bin to the sum of its buffer slice.
pub fn sum(v: &Variable) -> Result<Variable>
{
    let (_, _, buffer) = v.binned_parts()?;
    match buffer.dtype() {
        DType::Float64 => sum_bins::<f64>(v),
        DType::Float32 => sum_bins::<f32>(v),
        DType::Int64 => sum_bins::<i64>(v),
        DType::Int32 => sum_bins::<i32>(v),
        dtype => Err(Error::unsupported_dtype("buckets::sum", dtype)),
    }
}

fn sum_bins<T: Numeric>(v: &Variable) -> Result<Variable>
{
    let (indices, _, buffer) = v.binned_parts()?;
    let pairs: Vec<IndexPair> = indices.iter().copied().collect();
    let buffer_values = buffer.values::<T>()?;
    let buffer_variances = buffer.variances::<T>().ok();
    let mut values = vec![T::zero(); pairs.len()];
    let mut variances = buffer.has_variances().then(|| vec![T::zero(); pairs.len()]);
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = variances.as_mut().map(|v| SendPtr::new(v.as_mut_ptr()));
    parallel_for(pairs.len(), 1024, |range| {
        for i in range {
            let span = pairs[i].begin as usize..pairs[i].end as usize;
            let total =
                buffer_values[span.clone()].iter().fold(T::zero(), |acc, &x| acc + x);
            unsafe { *val_ptr.get().add(i) = total };
            if let (Some(var_ptr), Some(buffer_variances)) = (var_ptr, buffer_variances) {
                let total =
                    buffer_variances[span].iter().fold(T::zero(), |acc, &x| acc + x);
                unsafe { *var_ptr.get().add(i) = total };
            }
        }
    });
    Ok(Variable::from_parts(v.dims().clone(), buffer.unit(), values, variances))
}

/// Histogram each bin's events over `edges`.
///
/// `coords` is a binned variable whose buffer holds the per-event
/// coordinates; `weights`, when given, is a binned variable over the
/// same ranges whose buffer holds per-event weights. Without weights
/// every event counts 1 with variance 1. The edge dimension is appended
/// as the innermost output dimension.
pub fn histogram(
    coords: &Variable, weights: Option<&Variable>, edges: &Variable,
) -> Result<Variable>
{
    let (c_indices, _, c_buffer) = coords.binned_parts()?;
    check_coord_unit(c_buffer.unit(), edges.unit())?;
    let (edge_dim, spec) = EdgeSpec::from_variable(edges)?;
    let c_pairs: Vec<IndexPair> = c_indices.iter().copied().collect();
    let c_values = c_buffer.values::<f64>()?;

    let weight_parts = match weights {
        Some(weights) => {
            let (w_indices, _, w_buffer) = weights.binned_parts()?;
            check_weight_unit(w_buffer.unit())?;
            let w_pairs: Vec<IndexPair> = w_indices.iter().copied().collect();
            if weights.dims() != coords.dims()
                || w_pairs
                    .iter()
                    .zip(&c_pairs)
                    .any(|(w, c)| w.len() != c.len())
            {
                return Err(Error::Dimension(
                    "weight bins must parallel the coordinate bins".into(),
                ));
            }
            Some((w_pairs, w_buffer.values::<f64>()?, w_buffer.variances::<f64>().ok()))
        }
        None => None,
    };
    let with_variances =
        weight_parts.as_ref().map(|(_, _, variances)| variances.is_some()).unwrap_or(true);
    let unit = weights.map(|w| w.bin_buffer().map(|b| b.unit())).transpose()?.unwrap_or(Unit::COUNTS);

    let nbin = spec.nbin();
    let mut out_dims = coords.dims().clone();
    out_dims.insert(out_dims.ndim(), edge_dim, nbin)?;
    let mut values = vec![0.0; out_dims.volume()];
    let mut variances = with_variances.then(|| vec![0.0; out_dims.volume()]);
    let val_ptr = SendPtr::new(values.as_mut_ptr());
    let var_ptr = variances.as_mut().map(|v| SendPtr::new(v.as_mut_ptr()));
    parallel_for(c_pairs.len(), 256, |range| {
        for i in range {
            let c_span = c_pairs[i].begin as usize..c_pairs[i].end as usize;
            let weight_slices = weight_parts.as_ref().map(|(w_pairs, values, variances)| {
                let span = w_pairs[i].begin as usize..w_pairs[i].end as usize;
                (&values[span.clone()], variances.as_ref().map(|v| &v[span]))
            });
            let bin_values =
                unsafe { std::slice::from_raw_parts_mut(val_ptr.get().add(i * nbin), nbin) };
            let bin_variances = var_ptr.map(|ptr| unsafe {
                std::slice::from_raw_parts_mut(ptr.get().add(i * nbin), nbin)
            });
            histogram_slices(&spec, &c_values[c_span], weight_slices, bin_values, bin_variances);
        }
    });
    Ok(Variable::from_parts(out_dims, unit, values, variances))
}

/// Look up each event's coordinate in a histogram and emit the value it
/// lands on, as a binned variable parallel to `coords`.
///
/// Events outside all edges map to 0; events landing in a masked
/// histogram bin map to 0.
pub fn map(hist: &DataArray, coords: &Variable) -> Result<Variable>
{
    let data = hist.data();
    if data.dims().ndim() != 1 {
        return Err(Error::Dimension(format!(
            "lookup histogram must be one-dimensional, got {}",
            data.dims()
        )));
    }
    let dim = data.dims().at(0).0;
    let nbin = data.dims().at(0).1;
    let edges = hist
        .coord(dim)
        .ok_or_else(|| Error::DimensionNotFound { dim, dims: data.dims().clone() })?;
    if edges.dims().len_of(dim)? != nbin + 1 {
        return Err(Error::BinEdge(format!(
            "lookup histogram needs a bin-edge coordinate for {}: expected {} edges, got {}",
            dim,
            nbin + 1,
            edges.dims().len_of(dim)?
        )));
    }
    let (_, spec) = EdgeSpec::from_variable(edges)?;
    let (c_indices, c_dim, c_buffer) = coords.binned_parts()?;
    check_coord_unit(c_buffer.unit(), edges.unit())?;
    let hist_values = data.values::<f64>()?;
    let hist_variances = data.variances::<f64>().ok();
    let masked = combined_mask(hist, nbin)?;

    let c_values = c_buffer.values::<f64>()?;
    let mut values = vec![0.0; c_buffer.size()];
    let mut variances = hist_variances.is_some().then(|| vec![0.0; c_buffer.size()]);
    let pairs: Vec<IndexPair> = c_indices.iter().copied().collect();
    for &pair in &pairs {
        for event in pair.begin as usize..pair.end as usize {
            let Some(bin) = spec.bin_of(c_values[event]) else { continue };
            if masked.as_ref().map(|m| m[bin]).unwrap_or(false) {
                continue;
            }
            values[event] = hist_values[bin];
            if let (Some(variances), Some(hist_variances)) =
                (variances.as_mut(), hist_variances)
            {
                variances[event] = hist_variances[bin];
            }
        }
    }
    let buffer = Variable::from_parts(
        c_buffer.dims().clone(),
        data.unit(),
        values,
        variances,
    );
    Ok(Variable::bins_from_ranges(coords.dims().clone(), pairs, c_dim, buffer))
}

fn combined_mask(hist: &DataArray, nbin: usize) -> Result<Option<Vec<bool>>>
{
    if hist.masks().is_empty() {
        return Ok(None);
    }
    let mut combined = vec![false; nbin];
    for mask in hist.masks().values() {
        let view = mask.broadcast(hist.data().dims())?;
        for (slot, &flag) in combined.iter_mut().zip(view.array_view::<bool>()?.iter()) {
            *slot |= flag;
        }
    }
    Ok(Some(combined))
}

/// Arithmetic between a binned variable and a scalar: the operation
/// distributes into the bin buffer, the ranges are shared unchanged.
pub(crate) fn binned_arithmetic(
    a: &Variable, b: &Variable, op: fn(&Variable, &Variable) -> Result<Variable>,
) -> Result<Variable>
{
    if a.is_binned() && b.is_binned() {
        return Err(Error::Type("arithmetic between two binned variables is not supported".into()));
    }
    let (binned, dense, binned_left) =
        if a.is_binned() { (a, b, true) } else { (b, a, false) };
    if dense.dims().ndim() != 0 {
        return Err(Error::Type(
            "arithmetic with a binned variable requires a scalar operand".into(),
        ));
    }
    let (indices, bin_dim, buffer) = binned.binned_parts()?;
    let buffer = if binned_left { op(buffer, dense)? } else { op(dense, buffer)? };
    let ranges = indices.iter().copied().collect();
    Ok(Variable::bins_from_ranges(binned.dims().clone(), ranges, bin_dim, buffer))
}

/// Content equality of two bins, regardless of where each bin lives in
/// its buffer.
pub(crate) fn bin_contents_equal(
    a_buffer: &Variable, a: IndexPair, b_buffer: &Variable, b: IndexPair,
) -> bool
{
    macro_rules! cmp {
        ($t:ty) => {
            if a_buffer.dtype() == <$t as Element>::DTYPE {
                return slices_equal::<$t>(a_buffer, a, b_buffer, b);
            }
        };
    }
    for_each_element_type!(cmp);
    false
}

fn slices_equal<T: Element>(
    a_buffer: &Variable, a: IndexPair, b_buffer: &Variable, b: IndexPair,
) -> bool
{
    let (Ok(a_values), Ok(b_values)) = (a_buffer.values::<T>(), b_buffer.values::<T>()) else {
        return false;
    };
    if a_values[a.begin as usize..a.end as usize] != b_values[b.begin as usize..b.end as usize] {
        return false;
    }
    match (a_buffer.variances::<T>().ok(), b_buffer.variances::<T>().ok()) {
        (None, None) => true,
        (Some(a_variances), Some(b_variances)) => {
            a_variances[a.begin as usize..a.end as usize]
                == b_variances[b.begin as usize..b.end as usize]
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn binned_1234() -> Variable
    {
        let indices = Variable::new(
            Dimensions::from(&[(Dim::Y, 2)][..]),
            Unit::DIMENSIONLESS,
            vec![IndexPair::new(0, 2), IndexPair::new(2, 4)],
        )
        .unwrap();
        let buffer = Variable::new(
            Dimensions::from(&[(Dim::X, 4)][..]),
            Unit::M,
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        Variable::make_bins(indices, Dim::X, buffer).unwrap()
    }

    #[test]
    fn sizes_and_sum()
    {
        let v = binned_1234();
        let sizes = bin_sizes(&v).unwrap();
        assert_eq!(sizes.values::<i64>().unwrap(), &[2, 2]);
        let sums = sum(&v).unwrap();
        assert_eq!(sums.values::<f64>().unwrap(), &[3.0, 7.0]);
        assert_eq!(sums.unit(), Unit::M);
    }

    #[test]
    fn concatenate_packs_interleaved()
    {
        let a = binned_1234();
        let b = crate::impl_ops::times(&a, &Variable::scalar(3.0)).unwrap();
        let joined = concatenate(&a, &b).unwrap();
        let indices = joined.bin_indices().unwrap();
        assert_eq!(
            indices.values::<IndexPair>().unwrap(),
            &[IndexPair::new(0, 4), IndexPair::new(4, 8)]
        );
        let buffer = joined.bin_buffer().unwrap();
        assert_eq!(
            buffer.values::<f64>().unwrap(),
            &[1.0, 2.0, 3.0, 6.0, 3.0, 4.0, 9.0, 12.0]
        );
    }

    #[test]
    fn append_requires_exact_dims()
    {
        let mut a = binned_1234();
        let b = a.slice_range(Dim::Y, 0..1).unwrap();
        assert!(matches!(append(&mut a, &b), Err(Error::DimensionMismatch { .. })));
        let c = binned_1234();
        append(&mut a, &c).unwrap();
        assert_eq!(bin_sizes(&a).unwrap().values::<i64>().unwrap(), &[4, 4]);
    }

    #[test]
    fn slicing_shares_the_buffer()
    {
        let v = binned_1234();
        let tail = v.slice_range(Dim::Y, 1..2).unwrap();
        let (indices, _, buffer) = tail.binned_parts().unwrap();
        assert_eq!(indices.iter().copied().collect::<Vec<_>>(), [IndexPair::new(2, 4)]);
        assert_eq!(buffer.values::<f64>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert!(tail.same_buffer(&v));
    }

    #[test]
    fn scalar_scaling_distributes()
    {
        let v = binned_1234();
        let scaled = crate::impl_ops::times(&v, &Variable::scalar(2.0)).unwrap();
        let buffer = scaled.bin_buffer().unwrap();
        assert_eq!(buffer.values::<f64>().unwrap(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(buffer.unit(), Unit::M);
        // Non-scalar operands are rejected.
        let wide = Variable::new(
            Dimensions::from(&[(Dim::Y, 2)][..]),
            Unit::DIMENSIONLESS,
            vec![1.0, 2.0],
        )
        .unwrap();
        assert!(matches!(
            crate::impl_ops::times(&v, &wide),
            Err(Error::Type(_))
        ));
    }
}
