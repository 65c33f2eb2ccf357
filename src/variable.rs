// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::data_holders::{BinnedHolder, DenseHolder, VariableConcept};
use crate::dim::Dim;
use crate::dimensions::Dimensions;
use crate::dtype::{DType, Element, IndexPair};
use crate::element_view::ElementArrayView;
use crate::error::{Error, Result};
use crate::strides::Strides;
use crate::units::Unit;

/// A labeled N-dimensional array with a unit and an optional variance
/// channel.
///
/// A variable couples [`Dimensions`] with a typed element buffer held
/// behind a shared, copy-on-write handle. Slicing, transposing and
/// broadcasting return cheap views onto the same buffer; the first
/// mutation through any handle uniquifies the storage, so distinct
/// variables never observe each other's writes.
///
/// Two storage kinds exist: dense (a contiguous buffer of
/// `dims().volume()` elements, plus an optional variance buffer of the
/// same layout) and binned (per-element `[begin, end)` ranges into a
/// shared dense buffer, see [`make_bins`](Variable::make_bins)).
pub struct Variable
{
    dims: Dimensions,
    strides: Strides,
    offset: isize,
    unit: Unit,
    data: Arc<dyn VariableConcept>,
}

impl Clone for Variable
{
    fn clone(&self) -> Variable
    {
        Variable {
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            unit: self.unit,
            data: Arc::clone(&self.data),
        }
    }
}

impl Variable
{
    pub(crate) fn from_holder(dims: Dimensions, unit: Unit, holder: Box<dyn VariableConcept>)
        -> Variable
    {
        let strides = Strides::contiguous(&dims);
        Variable { dims, strides, offset: 0, unit, data: Arc::from(holder) }
    }

    pub(crate) fn from_parts<T: Element>(
        dims: Dimensions, unit: Unit, values: Vec<T>, variances: Option<Vec<T>>,
    ) -> Variable
    {
        debug_assert_eq!(values.len(), dims.volume());
        Variable::from_holder(dims, unit, Box::new(DenseHolder::new(values, variances)))
    }

    /// A dense variable owning `values`.
    ///
    /// Fails with *DimensionError* when the element count does not match
    /// `dims.volume()`.
    pub fn new<T: Element>(dims: Dimensions, unit: Unit, values: Vec<T>) -> Result<Variable>
    {
        check_buffer_len(&dims, values.len())?;
        Ok(Variable::from_parts(dims, unit, values, None))
    }

    /// A dense variable with a variance channel.
    ///
    /// Only variance-capable element types (floating point) may carry
    /// variances; anything else is *VariancesError*.
    pub fn with_variances<T: Element>(
        dims: Dimensions, unit: Unit, values: Vec<T>, variances: Vec<T>,
    ) -> Result<Variable>
    {
        if !T::SUPPORTS_VARIANCES {
            return Err(Error::Variances(format!("dtype {} cannot have variances", T::DTYPE)));
        }
        check_buffer_len(&dims, values.len())?;
        check_buffer_len(&dims, variances.len())?;
        Ok(Variable::from_parts(dims, unit, values, Some(variances)))
    }

    /// A dimensionless scalar.
    pub fn scalar<T: Element>(value: T) -> Variable
    {
        Variable::from_parts(Dimensions::empty(), Unit::DIMENSIONLESS, vec![value], None)
    }

    /// A scalar with value and variance.
    pub fn scalar_with_variance<T: Element>(value: T, variance: T) -> Result<Variable>
    {
        let (values, variances) = (vec![value], vec![variance]);
        Variable::with_variances(Dimensions::empty(), Unit::DIMENSIONLESS, values, variances)
    }

    /// Builder-style unit assignment.
    pub fn with_unit(mut self, unit: Unit) -> Variable
    {
        self.unit = unit;
        self
    }

    /// A default-initialized variable of runtime dtype, dispatched
    /// through the [factory](crate::factory).
    pub fn empty(dtype: DType, dims: Dimensions, unit: Unit, with_variances: bool)
        -> Result<Variable>
    {
        crate::factory::create(dtype, dims, unit, with_variances)
    }

    /// A default-initialized variable with the dtype, dimensions, unit
    /// and variance presence of `like`.
    pub fn empty_like(like: &Variable) -> Result<Variable>
    {
        Variable::empty(like.dtype(), like.dims().clone(), like.unit(), like.has_variances())
    }

    pub fn dims(&self) -> &Dimensions
    {
        &self.dims
    }

    pub fn dtype(&self) -> DType
    {
        self.data.dtype()
    }

    pub fn unit(&self) -> Unit
    {
        self.unit
    }

    pub fn set_unit(&mut self, unit: Unit)
    {
        self.unit = unit;
    }

    /// Number of elements addressed by this variable's dimensions.
    pub fn size(&self) -> usize
    {
        self.dims.volume()
    }

    pub fn has_variances(&self) -> bool
    {
        self.data.has_variances()
    }

    /// True when this view walks its buffer in dense row-major order.
    pub fn is_contiguous(&self) -> bool
    {
        self.strides.is_contiguous(&self.dims)
    }

    pub(crate) fn layout(&self) -> (&Dimensions, &Strides, isize)
    {
        (&self.dims, &self.strides, self.offset)
    }

    /// True when both variables view the same underlying storage.
    pub fn same_buffer(&self, other: &Variable) -> bool
    {
        Arc::ptr_eq(&self.data, &other.data)
    }

    fn dense_holder<T: Element>(&self) -> Result<&DenseHolder<T>>
    {
        self.data
            .downcast_ref::<DenseHolder<T>>()
            .ok_or_else(|| Error::dtype_mismatch(T::DTYPE, self.dtype()))
    }

    /// The value span of a contiguous variable.
    ///
    /// *TypeError* if `T` is not the element type; *DimensionError* for
    /// a non-contiguous view (slice along an inner dimension, transpose,
    /// broadcast) — take a [`copy`](Variable::copy) or iterate through
    /// [`array_view`](Variable::array_view) instead.
    pub fn values<T: Element>(&self) -> Result<&[T]>
    {
        let holder = self.dense_holder::<T>()?;
        self.check_contiguous()?;
        let begin = self.offset as usize;
        Ok(&holder.values[begin..begin + self.size()])
    }

    /// The variance span of a contiguous variable, or *VariancesError*.
    pub fn variances<T: Element>(&self) -> Result<&[T]>
    {
        let holder = self.dense_holder::<T>()?;
        self.check_contiguous()?;
        let variances = holder.variances.as_ref().ok_or_else(Error::missing_variances)?;
        let begin = self.offset as usize;
        Ok(&variances[begin..begin + self.size()])
    }

    /// Mutable value span; uniquifies shared storage first.
    pub fn values_mut<T: Element>(&mut self) -> Result<&mut [T]>
    {
        self.check_contiguous()?;
        let begin = self.offset as usize;
        let end = begin + self.size();
        let (values, _) = self.dense_parts_mut::<T>()?;
        Ok(&mut values[begin..end])
    }

    /// Mutable variance span; uniquifies shared storage first.
    pub fn variances_mut<T: Element>(&mut self) -> Result<&mut [T]>
    {
        self.check_contiguous()?;
        let begin = self.offset as usize;
        let end = begin + self.size();
        let (_, variances) = self.dense_parts_mut::<T>()?;
        let variances = variances.ok_or_else(Error::missing_variances)?;
        Ok(&mut variances[begin..end])
    }

    /// Attach, replace or drop the variance channel.
    pub fn set_variances<T: Element>(&mut self, variances: Option<Vec<T>>) -> Result<()>
    {
        if self.dtype() != T::DTYPE {
            return Err(Error::dtype_mismatch(T::DTYPE, self.dtype()));
        }
        if variances.is_some() && !T::SUPPORTS_VARIANCES {
            return Err(Error::Variances(format!("dtype {} cannot have variances", T::DTYPE)));
        }
        if !self.is_contiguous() || self.offset != 0 || self.size() != self.data.len() {
            return Err(Error::Dimension(
                "cannot set variances through a view; copy() first".into(),
            ));
        }
        if let Some(variances) = &variances {
            check_buffer_len(&self.dims, variances.len())?;
        }
        self.uniquify();
        let holder = Arc::get_mut(&mut self.data)
            .expect("storage is unique after uniquify")
            .downcast_mut::<DenseHolder<T>>()
            .expect("dtype checked above");
        holder.variances = variances;
        Ok(())
    }

    /// Full value/variance buffers for in-place transforms; uniquifies.
    pub(crate) fn dense_parts_mut<T: Element>(&mut self)
        -> Result<(&mut [T], Option<&mut [T]>)>
    {
        if self.dtype() != T::DTYPE {
            return Err(Error::dtype_mismatch(T::DTYPE, self.dtype()));
        }
        self.uniquify();
        let holder = Arc::get_mut(&mut self.data)
            .expect("storage is unique after uniquify")
            .downcast_mut::<DenseHolder<T>>()
            .expect("dtype checked above");
        Ok((&mut holder.values[..], holder.variances.as_mut().map(|v| &mut v[..])))
    }

    /// Read-only view over this variable's own dimensions.
    pub fn array_view<T: Element>(&self) -> Result<ElementArrayView<'_, T>>
    {
        let holder = self.dense_holder::<T>()?;
        Ok(ElementArrayView::new(
            &holder.values,
            self.offset,
            self.dims.clone(),
            self.strides.clone(),
        ))
    }

    /// Read-only variance view, or *VariancesError*.
    pub fn variance_view<T: Element>(&self) -> Result<ElementArrayView<'_, T>>
    {
        let holder = self.dense_holder::<T>()?;
        let variances = holder.variances.as_ref().ok_or_else(Error::missing_variances)?;
        Ok(ElementArrayView::new(variances, self.offset, self.dims.clone(), self.strides.clone()))
    }

    /// Value view broadcast to `target` (dtype already validated by the
    /// caller).
    pub(crate) fn broadcast_values<T: Element>(&self, target: &Dimensions)
        -> ElementArrayView<'_, T>
    {
        let holder = self.dense_holder::<T>().expect("dtype validated by dispatch");
        let strides = self.strides.broadcast_to(&self.dims, target);
        ElementArrayView::new(&holder.values, self.offset, target.clone(), strides)
    }

    /// Variance view broadcast to `target`, when present.
    pub(crate) fn broadcast_variances<T: Element>(&self, target: &Dimensions)
        -> Option<ElementArrayView<'_, T>>
    {
        let holder = self.dense_holder::<T>().expect("dtype validated by dispatch");
        let variances = holder.variances.as_ref()?;
        let strides = self.strides.broadcast_to(&self.dims, target);
        Some(ElementArrayView::new(variances, self.offset, target.clone(), strides))
    }

    fn check_contiguous(&self) -> Result<()>
    {
        if self.is_contiguous() {
            Ok(())
        } else {
            Err(Error::Dimension(format!(
                "view with dimensions {} is not contiguous; copy() first",
                self.dims
            )))
        }
    }

    fn uniquify(&mut self)
    {
        if Arc::strong_count(&self.data) != 1 {
            self.data = Arc::from(self.data.clone_box());
        }
    }

    fn with_layout(&self, dims: Dimensions, strides: Strides, offset: isize) -> Variable
    {
        Variable { dims, strides, offset, unit: self.unit, data: Arc::clone(&self.data) }
    }

    /// Single-index slice: removes `dim` from the result.
    pub fn slice(&self, dim: Dim, index: usize) -> Result<Variable>
    {
        let axis = self
            .dims
            .index_of(dim)
            .ok_or_else(|| Error::DimensionNotFound { dim, dims: self.dims.clone() })?;
        let dims = self.dims.slice_index(dim, index)?;
        let mut strides = self.strides.clone();
        let offset = self.offset + index as isize * strides.at(axis);
        strides.erase(axis);
        Ok(self.with_layout(dims, strides, offset))
    }

    /// Range slice: keeps `dim` with the shortened length.
    pub fn slice_range(&self, dim: Dim, range: Range<usize>) -> Result<Variable>
    {
        let axis = self
            .dims
            .index_of(dim)
            .ok_or_else(|| Error::DimensionNotFound { dim, dims: self.dims.clone() })?;
        let dims = self.dims.slice_range(dim, range.clone())?;
        let offset = self.offset + range.start as isize * self.strides.at(axis);
        Ok(self.with_layout(dims, self.strides.clone(), offset))
    }

    /// Reorder dimensions; `order` must be a permutation of the labels.
    pub fn transpose(&self, order: &[Dim]) -> Result<Variable>
    {
        if order.len() != self.dims.ndim() {
            return Err(Error::Dimension(format!(
                "transpose order {:?} does not match dimensions {}",
                order, self.dims
            )));
        }
        let mut pairs = Vec::with_capacity(order.len());
        let mut strides = Vec::with_capacity(order.len());
        for &dim in order {
            let axis = self
                .dims
                .index_of(dim)
                .ok_or_else(|| Error::DimensionNotFound { dim, dims: self.dims.clone() })?;
            pairs.push(self.dims.at(axis));
            strides.push(self.strides.at(axis));
        }
        let dims = Dimensions::new(&pairs)?;
        Ok(self.with_layout(dims, Strides::from_slice(&strides), self.offset))
    }

    /// View this variable through the larger dimension set `target`.
    ///
    /// Every dimension of `self` must occur in `target` with its length;
    /// dimensions absent from `self` become stride-0 (broadcast) axes.
    pub fn broadcast(&self, target: &Dimensions) -> Result<Variable>
    {
        for &(dim, len) in self.dims.as_pairs() {
            match target.len_of(dim) {
                Ok(target_len) if target_len == len => {}
                Ok(target_len) => {
                    return Err(Error::DimensionLength { dim, expected: len, actual: target_len })
                }
                Err(_) => {
                    return Err(Error::DimensionNotFound { dim, dims: target.clone() });
                }
            }
        }
        let strides = self.strides.broadcast_to(&self.dims, target);
        Ok(self.with_layout(target.clone(), strides, self.offset))
    }

    /// Rename a dimension label, keeping position and length.
    pub fn rename(&mut self, from: Dim, to: Dim) -> Result<()>
    {
        self.dims.rename(from, to)
    }

    /// Deep copy, re-compacted to canonical row-major layout.
    ///
    /// Dispatched by dtype through the [factory](crate::factory);
    /// **panics** for a dtype with no registered maker.
    pub fn copy(&self) -> Variable
    {
        crate::factory::copy(self)
    }

    pub(crate) fn copy_dense<T: Element>(&self) -> Variable
    {
        let view = self.array_view::<T>().expect("dtype checked by dispatch");
        let values: Vec<T> = view.iter().cloned().collect();
        let variances = self
            .variance_view::<T>()
            .ok()
            .map(|view| view.iter().cloned().collect::<Vec<T>>());
        Variable::from_parts(self.dims.clone(), self.unit, values, variances)
    }

    pub(crate) fn copy_binned(&self) -> Variable
    {
        let (indices, bin_dim, buffer) = self.binned_parts().expect("dtype checked by dispatch");
        let indices: Vec<IndexPair> = indices.iter().copied().collect();
        let holder =
            BinnedHolder { indices, bin_dim, buffer: buffer.copy() };
        Variable::from_holder(self.dims.clone(), self.unit, Box::new(holder))
    }

    // --- binned form ---

    /// A binned variable: each element of `indices` selects the
    /// `[begin, end)` range of `buffer` along `bin_dim` that makes up
    /// that bin.
    ///
    /// `indices` must be a dense `index_pair` variable and `buffer` must
    /// be one-dimensional over `bin_dim`. Every range is validated to
    /// lie within the buffer, be non-reversed, and not overlap any other
    /// range; use [`make_bins_no_validate`](Variable::make_bins_no_validate)
    /// to skip the scan when the layout is known good.
    pub fn make_bins(indices: Variable, bin_dim: Dim, buffer: Variable) -> Result<Variable>
    {
        let buffer_len = check_bin_buffer(bin_dim, &buffer)?;
        let index_view = indices.array_view::<IndexPair>()?;
        let mut ranges: Vec<IndexPair> = Vec::with_capacity(index_view.len());
        for &pair in &index_view {
            if pair.begin < 0 || pair.begin > pair.end || pair.end > buffer_len {
                return Err(Error::Slice {
                    dim: bin_dim,
                    begin: pair.begin.max(0) as usize,
                    end: pair.end.max(0) as usize,
                    len: buffer_len as usize,
                });
            }
            ranges.push(pair);
        }
        let mut sorted: Vec<IndexPair> = ranges.iter().copied().filter(|r| !r.is_empty()).collect();
        sorted.sort_by_key(|r| r.begin);
        for window in sorted.windows(2) {
            if window[0].end > window[1].begin {
                return Err(Error::Dimension(format!(
                    "overlapping bin ranges [{}, {}) and [{}, {})",
                    window[0].begin, window[0].end, window[1].begin, window[1].end
                )));
            }
        }
        Ok(Variable::bins_from_ranges(indices.dims().clone(), ranges, bin_dim, buffer))
    }

    /// As [`make_bins`](Variable::make_bins), without validating the
    /// ranges. The caller guarantees every range lies within the buffer;
    /// overlapping ranges are permitted and share buffer elements.
    pub fn make_bins_no_validate(indices: Variable, bin_dim: Dim, buffer: Variable)
        -> Result<Variable>
    {
        check_bin_buffer(bin_dim, &buffer)?;
        let index_view = indices.array_view::<IndexPair>()?;
        let ranges: Vec<IndexPair> = index_view.iter().copied().collect();
        Ok(Variable::bins_from_ranges(indices.dims().clone(), ranges, bin_dim, buffer))
    }

    pub(crate) fn bins_from_ranges(
        dims: Dimensions, ranges: Vec<IndexPair>, bin_dim: Dim, buffer: Variable,
    ) -> Variable
    {
        debug_assert_eq!(dims.volume(), ranges.len());
        let holder = BinnedHolder { indices: ranges, bin_dim, buffer };
        Variable::from_holder(dims, Unit::DIMENSIONLESS, Box::new(holder))
    }

    pub fn is_binned(&self) -> bool
    {
        self.dtype() == DType::Binned
    }

    /// The index view, bin dimension and shared buffer of a binned
    /// variable; *TypeError* for dense variables.
    pub(crate) fn binned_parts(&self)
        -> Result<(ElementArrayView<'_, IndexPair>, Dim, &Variable)>
    {
        let holder = self
            .data
            .downcast_ref::<BinnedHolder>()
            .ok_or_else(|| Error::dtype_mismatch(DType::Binned, self.dtype()))?;
        let view = ElementArrayView::new(
            &holder.indices,
            self.offset,
            self.dims.clone(),
            self.strides.clone(),
        );
        Ok((view, holder.bin_dim, &holder.buffer))
    }

    /// The `[begin, end)` pairs of a binned variable as a dense variable.
    pub fn bin_indices(&self) -> Result<Variable>
    {
        let (view, _, _) = self.binned_parts()?;
        let pairs: Vec<IndexPair> = view.iter().copied().collect();
        Variable::new(self.dims.clone(), Unit::DIMENSIONLESS, pairs)
    }

    /// The shared buffer of a binned variable.
    pub fn bin_buffer(&self) -> Result<&Variable>
    {
        let (_, _, buffer) = self.binned_parts()?;
        Ok(buffer)
    }

    /// The buffer dimension the bins of a binned variable index along.
    pub fn bin_dim(&self) -> Result<Dim>
    {
        let (_, dim, _) = self.binned_parts()?;
        Ok(dim)
    }
}

fn check_buffer_len(dims: &Dimensions, len: usize) -> Result<()>
{
    if len == dims.volume() {
        Ok(())
    } else {
        Err(Error::Dimension(format!(
            "expected {} elements for dimensions {}, got {}",
            dims.volume(),
            dims,
            len
        )))
    }
}

fn check_bin_buffer(bin_dim: Dim, buffer: &Variable) -> Result<i64>
{
    if buffer.dims().ndim() != 1 || !buffer.dims().contains(bin_dim) {
        return Err(Error::Dimension(format!(
            "bin buffer must be one-dimensional over {}, got {}",
            bin_dim,
            buffer.dims()
        )));
    }
    if buffer.is_binned() {
        return Err(Error::Type("bin buffer cannot itself be binned".into()));
    }
    Ok(buffer.dims().len_of(bin_dim)? as i64)
}

impl PartialEq for Variable
{
    /// Elementwise equality of dims (including order), unit, dtype,
    /// values and variances; binned variables compare by per-bin
    /// content. Dispatched by dtype through the factory.
    fn eq(&self, other: &Variable) -> bool
    {
        if self.dims != other.dims || self.unit != other.unit || self.dtype() != other.dtype() {
            return false;
        }
        crate::factory::equals(self, other)
    }
}

impl Variable
{
    pub(crate) fn eq_dense<T: Element>(&self, other: &Variable) -> bool
    {
        if self.has_variances() != other.has_variances() {
            return false;
        }
        let lhs = self.array_view::<T>().expect("dtype compared by caller");
        let rhs = other.array_view::<T>().expect("dtype compared by caller");
        if !lhs.iter().eq(rhs.iter()) {
            return false;
        }
        if self.has_variances() {
            let lhs = self.variance_view::<T>().expect("presence checked");
            let rhs = other.variance_view::<T>().expect("presence checked");
            if !lhs.iter().eq(rhs.iter()) {
                return false;
            }
        }
        true
    }

    pub(crate) fn eq_binned(&self, other: &Variable) -> bool
    {
        let (lhs_idx, lhs_dim, lhs_buf) = self.binned_parts().expect("binned");
        let (rhs_idx, rhs_dim, rhs_buf) = other.binned_parts().expect("binned");
        if lhs_dim != rhs_dim
            || lhs_buf.dtype() != rhs_buf.dtype()
            || lhs_buf.unit() != rhs_buf.unit()
        {
            return false;
        }
        // Bins are equal when their contents are, regardless of where
        // each bin lives in its buffer.
        lhs_idx.iter().zip(rhs_idx.iter()).all(|(a, b)| {
            a.len() == b.len()
                && crate::buckets::bin_contents_equal(lhs_buf, *a, rhs_buf, *b)
        })
    }
}

impl fmt::Debug for Variable
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Variable")
            .field("dims", &self.dims)
            .field("dtype", &self.dtype())
            .field("unit", &self.unit)
            .field("variances", &self.has_variances())
            .finish()
    }
}
