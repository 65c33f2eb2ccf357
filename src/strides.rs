use std::fmt;

use crate::dimensions::Dimensions;

/// Per-dimension memory offsets, parallel to a [`Dimensions`].
///
/// A flat coordinate tuple `(i0, .., in)` maps to the element offset
/// `sum(i_j * s_j)`. A stride of 0 encodes broadcast along that
/// dimension; strides matching [`Strides::contiguous`] describe a dense
/// row-major layout.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Strides
{
    strides: Vec<isize>,
}

impl Strides
{
    /// Canonical row-major strides for `dims`.
    pub fn contiguous(dims: &Dimensions) -> Strides
    {
        let mut strides = vec![0isize; dims.ndim()];
        let mut step = 1isize;
        for (i, len) in dims.shape().collect::<Vec<_>>().into_iter().enumerate().rev() {
            strides[i] = step;
            step *= len as isize;
        }
        Strides { strides }
    }

    /// Strides viewing data laid out contiguously over `source` through
    /// the larger dimension set `target`: dimensions absent from
    /// `source` get stride 0 (broadcast).
    pub fn broadcast(source: &Dimensions, target: &Dimensions) -> Strides
    {
        Strides::contiguous(source).broadcast_to(source, target)
    }

    /// Reinterpret `self` (parallel to `source`) as strides parallel to
    /// `target`, broadcasting over dimensions absent from `source`.
    pub fn broadcast_to(&self, source: &Dimensions, target: &Dimensions) -> Strides
    {
        let strides = target
            .labels()
            .map(|dim| source.index_of(dim).map(|i| self.strides[i]).unwrap_or(0))
            .collect();
        Strides { strides }
    }

    pub fn from_slice(strides: &[isize]) -> Strides
    {
        Strides { strides: strides.to_vec() }
    }

    pub fn ndim(&self) -> usize
    {
        self.strides.len()
    }

    pub fn as_slice(&self) -> &[isize]
    {
        &self.strides
    }

    pub fn at(&self, axis: usize) -> isize
    {
        self.strides[axis]
    }

    pub(crate) fn erase(&mut self, axis: usize)
    {
        self.strides.remove(axis);
    }

    /// True when `self` is exactly the row-major layout of `dims`.
    pub fn is_contiguous(&self, dims: &Dimensions) -> bool
    {
        *self == Strides::contiguous(dims)
    }

    /// True when some dimension of non-unit length has stride 0, i.e.
    /// distinct coordinates alias the same element.
    pub fn is_broadcast(&self, dims: &Dimensions) -> bool
    {
        self.strides
            .iter()
            .zip(dims.shape())
            .any(|(&stride, len)| stride == 0 && len > 1)
    }
}

impl fmt::Debug for Strides
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "Strides{:?}", self.strides)
    }
}
