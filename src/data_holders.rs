//! Type-erased element storage behind a [`Variable`].
//!
//! A variable owns a single `Arc<dyn VariableConcept>`; the concrete
//! holder is selected per element type. Dense and binned storage are the
//! two implementations of the concept. Slices and assignments share the
//! holder; mutation uniquifies it first (copy-on-write).

use std::any::Any;

use crate::dim::Dim;
use crate::dtype::{DType, Element, IndexPair};
use crate::variable::Variable;

pub(crate) trait VariableConcept: Any + Send + Sync
{
    fn dtype(&self) -> DType;
    /// Element count of the underlying buffer (not of any view into it).
    fn len(&self) -> usize;
    fn has_variances(&self) -> bool;
    fn clone_box(&self) -> Box<dyn VariableConcept>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn VariableConcept
{
    pub(crate) fn downcast_ref<H: 'static>(&self) -> Option<&H>
    {
        self.as_any().downcast_ref()
    }

    pub(crate) fn downcast_mut<H: 'static>(&mut self) -> Option<&mut H>
    {
        self.as_any_mut().downcast_mut()
    }
}

/// Contiguous typed storage with an optional variance channel.
///
/// Invariant: when present, the variance buffer has the value buffer's
/// length, and the element type is variance-capable.
#[derive(Clone, Debug)]
pub(crate) struct DenseHolder<T>
{
    pub values: Vec<T>,
    pub variances: Option<Vec<T>>,
}

impl<T: Element> DenseHolder<T>
{
    pub fn new(values: Vec<T>, variances: Option<Vec<T>>) -> DenseHolder<T>
    {
        if let Some(variances) = &variances {
            debug_assert!(T::SUPPORTS_VARIANCES);
            debug_assert_eq!(values.len(), variances.len());
        }
        DenseHolder { values, variances }
    }

    pub fn default_init(len: usize, with_variances: bool) -> DenseHolder<T>
    {
        DenseHolder {
            values: vec![T::default(); len],
            variances: with_variances.then(|| vec![T::default(); len]),
        }
    }
}

impl<T: Element> VariableConcept for DenseHolder<T>
{
    fn dtype(&self) -> DType
    {
        T::DTYPE
    }

    fn len(&self) -> usize
    {
        self.values.len()
    }

    fn has_variances(&self) -> bool
    {
        self.variances.is_some()
    }

    fn clone_box(&self) -> Box<dyn VariableConcept>
    {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any
    {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any
    {
        self
    }
}

/// Binned storage: per-bin `[begin, end)` ranges into a shared dense
/// buffer laid out along `bin_dim`.
///
/// The ranges are validated at construction unless the caller used the
/// no-validate path; the buffer's length along `bin_dim` bounds every
/// range.
#[derive(Clone, Debug)]
pub(crate) struct BinnedHolder
{
    pub indices: Vec<IndexPair>,
    pub bin_dim: Dim,
    pub buffer: Variable,
}

impl VariableConcept for BinnedHolder
{
    fn dtype(&self) -> DType
    {
        DType::Binned
    }

    fn len(&self) -> usize
    {
        self.indices.len()
    }

    fn has_variances(&self) -> bool
    {
        false
    }

    fn clone_box(&self) -> Box<dyn VariableConcept>
    {
        Box::new(BinnedHolder {
            indices: self.indices.clone(),
            bin_dim: self.bin_dim,
            buffer: self.buffer.copy(),
        })
    }

    fn as_any(&self) -> &dyn Any
    {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any
    {
        self
    }
}
