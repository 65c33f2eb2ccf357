//! Runtime dispatch from [`DType`] values to concrete holder makers.
//!
//! Generic code cannot name element types it does not know; the factory
//! is the one place where construction, copying and equality are
//! selected by `DType` value. The registry is populated once with the
//! core element types and is read-mostly afterwards; consumers add
//! makers for their own element types with [`register`].

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::dim::Dim;
use crate::dimensions::Dimensions;
use crate::dtype::{for_each_element_type, DType, Element};
use crate::error::{Error, Result};
use crate::units::Unit;
use crate::variable::Variable;

/// Constructs and inspects variables of one element type.
pub trait VariableMaker: Send + Sync
{
    fn dtype(&self) -> DType;

    /// A fresh default-initialized variable.
    fn create(&self, dims: Dimensions, unit: Unit, with_variances: bool) -> Result<Variable>;

    /// Deep copy of `var` (whose dtype is `self.dtype()`).
    fn copy(&self, var: &Variable) -> Variable;

    /// Elementwise equality of two variables of this dtype.
    fn equals(&self, a: &Variable, b: &Variable) -> bool;

    /// Copy `parts` into consecutive slabs of `out` along `dim`; the
    /// typed backend of [`concatenate`](crate::concatenate).
    fn fill_concat(&self, out: &mut Variable, dim: Dim, parts: &[(&Variable, usize)])
        -> Result<()>;

    /// The dtype of the elements a consumer observes: the dtype itself
    /// for dense variables, the buffer's dtype for binned ones.
    fn elem_dtype(&self, var: &Variable) -> DType;

    /// The unit carried by the observed elements.
    fn elem_unit(&self, var: &Variable) -> Unit;

    fn has_variances(&self, var: &Variable) -> bool;

    /// The backing buffer of a binned variable, `None` for dense ones.
    fn bin_buffer(&self, var: &Variable) -> Option<Variable>;
}

struct DenseMaker<T>(PhantomData<T>);

impl<T: Element> VariableMaker for DenseMaker<T>
{
    fn dtype(&self) -> DType
    {
        T::DTYPE
    }

    fn create(&self, dims: Dimensions, unit: Unit, with_variances: bool) -> Result<Variable>
    {
        if with_variances && !T::SUPPORTS_VARIANCES {
            return Err(Error::Variances(format!("dtype {} cannot have variances", T::DTYPE)));
        }
        let holder = crate::data_holders::DenseHolder::<T>::default_init(
            dims.volume(),
            with_variances,
        );
        Ok(Variable::from_holder(dims, unit, Box::new(holder)))
    }

    fn copy(&self, var: &Variable) -> Variable
    {
        var.copy_dense::<T>()
    }

    fn equals(&self, a: &Variable, b: &Variable) -> bool
    {
        a.eq_dense::<T>(b)
    }

    fn fill_concat(&self, out: &mut Variable, dim: Dim, parts: &[(&Variable, usize)])
        -> Result<()>
    {
        crate::shape_ops::fill_parts::<T>(out, dim, parts)
    }

    fn elem_dtype(&self, _var: &Variable) -> DType
    {
        T::DTYPE
    }

    fn elem_unit(&self, var: &Variable) -> Unit
    {
        var.unit()
    }

    fn has_variances(&self, var: &Variable) -> bool
    {
        var.has_variances()
    }

    fn bin_buffer(&self, _var: &Variable) -> Option<Variable>
    {
        None
    }
}

struct BinnedMaker;

impl VariableMaker for BinnedMaker
{
    fn dtype(&self) -> DType
    {
        DType::Binned
    }

    fn create(&self, _dims: Dimensions, _unit: Unit, _with_variances: bool) -> Result<Variable>
    {
        Err(Error::Type(
            "binned variables have no default initializer; use make_bins".into(),
        ))
    }

    fn copy(&self, var: &Variable) -> Variable
    {
        var.copy_binned()
    }

    fn equals(&self, a: &Variable, b: &Variable) -> bool
    {
        a.eq_binned(b)
    }

    fn fill_concat(&self, _out: &mut Variable, _dim: Dim, _parts: &[(&Variable, usize)])
        -> Result<()>
    {
        Err(Error::Type(
            "concatenate expects dense variables; bin-wise concatenation is buckets::concatenate"
                .into(),
        ))
    }

    fn elem_dtype(&self, var: &Variable) -> DType
    {
        var.bin_buffer().map(|buffer| buffer.dtype()).unwrap_or(DType::Binned)
    }

    fn elem_unit(&self, var: &Variable) -> Unit
    {
        var.bin_buffer().map(|buffer| buffer.unit()).unwrap_or(Unit::DIMENSIONLESS)
    }

    fn has_variances(&self, var: &Variable) -> bool
    {
        var.bin_buffer().map(|buffer| buffer.has_variances()).unwrap_or(false)
    }

    fn bin_buffer(&self, var: &Variable) -> Option<Variable>
    {
        var.bin_buffer().ok().cloned()
    }
}

static REGISTRY: Lazy<RwLock<HashMap<DType, Arc<dyn VariableMaker>>>> = Lazy::new(|| {
    let mut makers: HashMap<DType, Arc<dyn VariableMaker>> = HashMap::new();
    macro_rules! register_dense {
        ($t:ty) => {
            makers.insert(<$t as Element>::DTYPE, Arc::new(DenseMaker::<$t>(PhantomData)));
        };
    }
    for_each_element_type!(register_dense);
    makers.insert(DType::Binned, Arc::new(BinnedMaker));
    RwLock::new(makers)
});

/// A ready-made maker for a dense element type; the usual argument to
/// [`register`] when plugging in a consumer element type.
pub fn dense_maker<T: Element>() -> Box<dyn VariableMaker>
{
    Box::new(DenseMaker::<T>(PhantomData))
}

/// Register a maker for a consumer-provided element type.
///
/// Not expected on any hot path; calls must be externally serialized
/// with respect to each other (lookups may run concurrently).
pub fn register(maker: Box<dyn VariableMaker>)
{
    let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
    registry.insert(maker.dtype(), Arc::from(maker));
}

/// The lock is released before `f` runs: makers may recurse into the
/// factory (copying a binned variable copies its buffer).
pub(crate) fn with_maker<R>(
    dtype: DType, f: impl FnOnce(&dyn VariableMaker) -> R,
) -> Result<R>
{
    let maker = {
        let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
        registry.get(&dtype).cloned()
    };
    match maker {
        Some(maker) => Ok(f(maker.as_ref())),
        None => Err(Error::Type(format!("no maker registered for dtype {}", dtype))),
    }
}

pub(crate) fn create(
    dtype: DType, dims: Dimensions, unit: Unit, with_variances: bool,
) -> Result<Variable>
{
    with_maker(dtype, |maker| maker.create(dims, unit, with_variances))?
}

pub(crate) fn copy(var: &Variable) -> Variable
{
    with_maker(var.dtype(), |maker| maker.copy(var))
        .unwrap_or_else(|e| panic!("cannot copy variable: {}", e))
}

pub(crate) fn equals(a: &Variable, b: &Variable) -> bool
{
    with_maker(a.dtype(), |maker| maker.equals(a, b)).unwrap_or(false)
}

/// The dtype of the elements observed through `var` (the buffer dtype
/// for binned variables).
pub fn element_dtype(var: &Variable) -> Result<DType>
{
    with_maker(var.dtype(), |maker| maker.elem_dtype(var))
}

/// The unit of the elements observed through `var`.
pub fn element_unit(var: &Variable) -> Result<Unit>
{
    with_maker(var.dtype(), |maker| maker.elem_unit(var))
}

/// Whether the elements observed through `var` carry variances.
pub fn element_has_variances(var: &Variable) -> Result<bool>
{
    with_maker(var.dtype(), |maker| maker.has_variances(var))
}

/// The backing buffer of a binned variable, `None` for dense variables.
pub fn extract_bin_buffer(var: &Variable) -> Result<Option<Variable>>
{
    with_maker(var.dtype(), |maker| maker.bin_buffer(var))
}
