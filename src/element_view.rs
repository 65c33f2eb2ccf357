// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::dimensions::Dimensions;
use crate::strides::Strides;
use crate::view_index::ViewIndex;

/// A read-only N-dimensional view of typed elements.
///
/// Couples a borrowed element buffer with target dimensions, per-target
/// strides and a base offset. Iteration order is the row-major walk of
/// the target dimensions; broadcast (stride 0) and transposed or sliced
/// layouts are all expressed through the strides, so one iteration path
/// serves every layout.
#[derive(Debug)]
pub struct ElementArrayView<'a, T>
{
    data: &'a [T],
    base: isize,
    dims: Dimensions,
    strides: Strides,
}

impl<'a, T> Clone for ElementArrayView<'a, T>
{
    fn clone(&self) -> Self
    {
        ElementArrayView {
            data: self.data,
            base: self.base,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
        }
    }
}

impl<'a, T> ElementArrayView<'a, T>
{
    /// `strides` parallel to `dims`; `base` is the offset of the
    /// logical first element within `data`.
    pub(crate) fn new(data: &'a [T], base: isize, dims: Dimensions, strides: Strides) -> Self
    {
        debug_assert_eq!(dims.ndim(), strides.ndim());
        ElementArrayView { data, base, dims, strides }
    }

    pub fn len(&self) -> usize
    {
        self.dims.volume()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    pub fn dims(&self) -> &Dimensions
    {
        &self.dims
    }

    /// The whole view as a slice, when it is a dense row-major window.
    pub fn as_slice(&self) -> Option<&'a [T]>
    {
        if self.strides.is_contiguous(&self.dims) {
            let begin = self.base as usize;
            Some(&self.data[begin..begin + self.len()])
        } else {
            None
        }
    }

    /// Restrict to `begin..end` of the dimension at position `axis`.
    ///
    /// The base advances by that axis' stride, so this is cheap; the
    /// parallel engine hands each worker a restriction of the outermost
    /// axis.
    pub(crate) fn restrict(&self, axis: usize, begin: usize, end: usize)
        -> ElementArrayView<'a, T>
    {
        let (dim, len) = self.dims.at(axis);
        debug_assert!(begin <= end && end <= len);
        let mut dims = self.dims.clone();
        dims.resize(dim, end - begin).expect("resize of existing dimension");
        ElementArrayView {
            data: self.data,
            base: self.base + begin as isize * self.strides.at(axis),
            dims,
            strides: self.strides.clone(),
        }
    }

    /// Rebind to the larger dimension set `target`; dimensions this
    /// view lacks become stride-0 (broadcast) axes.
    pub(crate) fn broadcast_to(&self, target: &Dimensions) -> ElementArrayView<'a, T>
    {
        let strides = self.strides.broadcast_to(&self.dims, target);
        ElementArrayView::new(self.data, self.base, target.clone(), strides)
    }

    /// Element at flat logical position `index` (row-major).
    pub fn get(&self, index: usize) -> &'a T
    {
        let mut vi = ViewIndex::new(&self.dims, &self.strides);
        vi.seek(index);
        &self.data[(self.base + vi.offset()) as usize]
    }

    pub fn iter(&self) -> Iter<'a, T>
    {
        Iter {
            data: self.data,
            base: self.base,
            vi: ViewIndex::new(&self.dims, &self.strides),
            remaining: self.len(),
        }
    }

    pub(crate) fn data(&self) -> &'a [T]
    {
        self.data
    }

    pub(crate) fn base(&self) -> isize
    {
        self.base
    }

    pub(crate) fn view_index(&self) -> ViewIndex
    {
        ViewIndex::new(&self.dims, &self.strides)
    }
}

impl<'a, T> IntoIterator for &ElementArrayView<'a, T>
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Iter<'a, T>
    {
        self.iter()
    }
}

/// Iterator over an [`ElementArrayView`] in row-major target order.
pub struct Iter<'a, T>
{
    data: &'a [T],
    base: isize,
    vi: ViewIndex,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T>
{
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T>
    {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let offset = (self.base + self.vi.offset()) as usize;
        self.vi.increment();
        debug_assert!(offset < self.data.len());
        // Offsets are in bounds by construction of the view.
        Some(unsafe { self.data.get_unchecked(offset) })
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}
