// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::dimensions::{Dimensions, NDIM_MAX};
use crate::strides::Strides;

/// Walks a target dimension set and maps successive logical positions to
/// memory offsets through a parallel set of strides.
///
/// State is kept innermost-first in fixed arrays: a per-dimension
/// coordinate, the flat logical index, and the memory offset. Each
/// `increment` advances the offset by the innermost stride; when the
/// innermost coordinate saturates, precomputed per-level deltas
/// ripple-carry into outer dimensions. Iterating a contiguous,
/// non-broadcast view this way touches memory strictly in order.
#[derive(Clone, Debug)]
pub(crate) struct ViewIndex
{
    ndim: usize,
    extent: [usize; NDIM_MAX],
    stride: [isize; NDIM_MAX],
    carry: [isize; NDIM_MAX],
    coord: [usize; NDIM_MAX],
    index: usize,
    offset: isize,
}

impl ViewIndex
{
    /// `strides` must be parallel to `target` (outermost first).
    pub fn new(target: &Dimensions, strides: &Strides) -> ViewIndex
    {
        debug_assert_eq!(target.ndim(), strides.ndim());
        let mut extent = [1usize; NDIM_MAX];
        let mut stride = [0isize; NDIM_MAX];
        let ndim = target.ndim().max(1);
        // Reverse to innermost-first; a scalar acts as a single-element
        // axis with stride 0.
        for (i, len) in target.shape().enumerate() {
            extent[target.ndim() - 1 - i] = len;
        }
        for (i, &s) in strides.as_slice().iter().enumerate() {
            stride[target.ndim() - 1 - i] = s;
        }
        let mut carry = [0isize; NDIM_MAX];
        for d in 0..ndim.saturating_sub(1) {
            carry[d] = stride[d + 1] - extent[d] as isize * stride[d];
        }
        ViewIndex {
            ndim,
            extent,
            stride,
            carry,
            coord: [0; NDIM_MAX],
            index: 0,
            offset: 0,
        }
    }

    /// Memory offset of the current position.
    #[inline(always)]
    pub fn offset(&self) -> isize
    {
        self.offset
    }

    /// Flat logical index of the current position.
    #[inline(always)]
    pub fn index(&self) -> usize
    {
        self.index
    }

    /// Advance to the next logical position.
    #[inline(always)]
    pub fn increment(&mut self)
    {
        self.index += 1;
        self.coord[0] += 1;
        self.offset += self.stride[0];
        let mut d = 0;
        while self.coord[d] == self.extent[d] && d + 1 < self.ndim {
            self.coord[d] = 0;
            self.offset += self.carry[d];
            d += 1;
            self.coord[d] += 1;
        }
    }

    /// Jump to an arbitrary flat logical index.
    ///
    /// Any overflow past the end lands in the outermost coordinate, so
    /// `seek(volume)` is a valid one-past-the-end position.
    pub fn seek(&mut self, index: usize)
    {
        let mut remaining = index;
        let mut offset = 0isize;
        for d in 0..self.ndim - 1 {
            let coord = if self.extent[d] == 0 { 0 } else { remaining % self.extent[d] };
            self.coord[d] = coord;
            offset += coord as isize * self.stride[d];
            if self.extent[d] != 0 {
                remaining /= self.extent[d];
            }
        }
        self.coord[self.ndim - 1] = remaining;
        offset += remaining as isize * self.stride[self.ndim - 1];
        self.index = index;
        self.offset = offset;
    }
}

impl PartialEq for ViewIndex
{
    fn eq(&self, other: &ViewIndex) -> bool
    {
        self.index == other.index
    }
}
