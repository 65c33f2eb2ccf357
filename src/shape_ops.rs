//! Shape-changing operations on dense variables.

use crate::dim::Dim;
use crate::dimensions::Dimensions;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::strides::Strides;
use crate::variable::Variable;
use crate::view_index::ViewIndex;

/// Concatenate two dense variables along `dim`.
///
/// All dimensions other than `dim` must match exactly. An operand
/// lacking `dim` contributes a single slab; when neither operand has
/// `dim`, a new outermost dimension of length 2 is created. Dtypes,
/// units and variance presence must agree.
pub fn concatenate(a: &Variable, b: &Variable, dim: Dim) -> Result<Variable>
{
    if a.is_binned() || b.is_binned() {
        return Err(Error::Type(
            "concatenate expects dense variables; bin-wise concatenation is buckets::concatenate"
                .into(),
        ));
    }
    if a.dtype() != b.dtype() {
        return Err(Error::dtype_mismatch(a.dtype(), b.dtype()));
    }
    if a.unit() != b.unit() {
        return Err(Error::UnitMismatch { left: a.unit(), right: b.unit() });
    }
    if a.has_variances() != b.has_variances() {
        return Err(Error::Variances(
            "either both or none of the concatenated variables must have a variance".into(),
        ));
    }
    let mut a_rest = a.dims().clone();
    let _ = a_rest.erase(dim);
    let mut b_rest = b.dims().clone();
    let _ = b_rest.erase(dim);
    if a_rest != b_rest {
        return Err(Error::DimensionMismatch { expected: a_rest, actual: b_rest });
    }
    let la = a.dims().len_of(dim).unwrap_or(1);
    let lb = b.dims().len_of(dim).unwrap_or(1);
    let out_dims = output_dims(a.dims(), b.dims(), dim, la + lb)?;
    let mut out = Variable::empty(a.dtype(), out_dims, a.unit(), a.has_variances())?;
    // The typed copy is dispatched by dtype through the factory, so
    // consumer-registered element types concatenate too.
    crate::factory::with_maker(a.dtype(), |maker| {
        maker.fill_concat(&mut out, dim, &[(a, la), (b, lb)])
    })??;
    Ok(out)
}

fn output_dims(a: &Dimensions, b: &Dimensions, dim: Dim, total: usize) -> Result<Dimensions>
{
    let mut out = if a.contains(dim) {
        a.clone()
    } else if b.contains(dim) {
        b.clone()
    } else {
        // Stacking along a fresh dimension places it at the outer end.
        let mut out = a.clone();
        out.insert_outer(dim, total)?;
        return Ok(out);
    };
    out.resize(dim, total)?;
    Ok(out)
}

/// Copy each part into its slab `[start, start + len)` of the output's
/// concatenation dimension. Parts lacking the dimension broadcast into
/// a single slab.
pub(crate) fn fill_parts<T: Element>(
    out: &mut Variable, dim: Dim, parts: &[(&Variable, usize)],
) -> Result<()>
{
    let out_dims = out.dims().clone();
    let out_strides = Strides::contiguous(&out_dims);
    let axis = out_dims.index_of(dim).expect("output contains the concatenation dimension");
    let stride_d = out_strides.at(axis);
    let sources: Vec<_> = parts
        .iter()
        .scan(0usize, |start, &(src, len)| {
            let begin = *start;
            *start += len;
            let mut region = out_dims.clone();
            region.resize(dim, len).expect("shortening an existing dimension");
            Some((src, region, begin as isize * stride_d))
        })
        .collect();
    let (values, mut variances) = out.dense_parts_mut::<T>()?;
    for (src, region, base) in &sources {
        let sv = src.broadcast_values::<T>(region);
        let mut ov = ViewIndex::new(region, &out_strides);
        for element in &sv {
            values[(*base + ov.offset()) as usize] = element.clone();
            ov.increment();
        }
        if let Some(variances) = variances.as_deref_mut() {
            let s_var = src.broadcast_variances::<T>(region).expect("presence checked");
            let mut ov = ViewIndex::new(region, &out_strides);
            for element in &s_var {
                variances[(*base + ov.offset()) as usize] = element.clone();
                ov.increment();
            }
        }
    }
    Ok(())
}

/// View `a` through the larger dimension set `target` (stride-0 axes
/// for dimensions `a` lacks). Forwarding wrapper over
/// [`Variable::broadcast`].
pub fn broadcast(a: &Variable, target: &Dimensions) -> Result<Variable>
{
    a.broadcast(target)
}
