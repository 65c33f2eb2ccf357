// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::fmt;
use std::ops::Range;

use crate::dim::Dim;
use crate::error::{Error, Result};

/// Maximum supported rank.
///
/// The view iteration machinery keeps per-dimension state in fixed-size
/// arrays of this length.
pub const NDIM_MAX: usize = 6;

/// An ordered sequence of `(Dim, length)` pairs, outermost first.
///
/// All labels are distinct and the volume (product of lengths) fits in a
/// signed 64-bit integer. An empty `Dimensions` describes a scalar.
#[derive(Clone, PartialEq, Eq, Default, Hash)]
pub struct Dimensions
{
    dims: Vec<(Dim, usize)>,
}

impl Dimensions
{
    /// An empty (scalar) dimension set.
    pub fn empty() -> Dimensions
    {
        Dimensions { dims: Vec::new() }
    }

    /// Build from `(Dim, length)` pairs, outermost first.
    ///
    /// Fails with *DimensionError* on a duplicate label or rank overflow.
    pub fn new(pairs: &[(Dim, usize)]) -> Result<Dimensions>
    {
        let mut dims = Dimensions::empty();
        for &(dim, len) in pairs {
            dims.insert_inner(dim, len)?;
        }
        Ok(dims)
    }

    pub fn ndim(&self) -> usize
    {
        self.dims.len()
    }

    /// Product of all lengths; 1 for a scalar.
    pub fn volume(&self) -> usize
    {
        self.dims.iter().map(|&(_, len)| len).product()
    }

    pub fn contains(&self, dim: Dim) -> bool
    {
        self.index_of(dim).is_some()
    }

    /// Position of `dim`, 0 being outermost.
    pub fn index_of(&self, dim: Dim) -> Option<usize>
    {
        self.dims.iter().position(|&(d, _)| d == dim)
    }

    /// Length along `dim`, or *DimensionNotFoundError*.
    pub fn len_of(&self, dim: Dim) -> Result<usize>
    {
        self.index_of(dim)
            .map(|i| self.dims[i].1)
            .ok_or(Error::DimensionNotFound { dim, dims: self.clone() })
    }

    /// Labels, outermost first.
    pub fn labels(&self) -> impl ExactSizeIterator<Item = Dim> + '_
    {
        self.dims.iter().map(|&(d, _)| d)
    }

    /// Lengths, outermost first.
    pub fn shape(&self) -> impl ExactSizeIterator<Item = usize> + '_
    {
        self.dims.iter().map(|&(_, len)| len)
    }

    pub fn as_pairs(&self) -> &[(Dim, usize)]
    {
        &self.dims
    }

    /// Label and length at position `axis` (0 = outermost).
    pub fn at(&self, axis: usize) -> (Dim, usize)
    {
        self.dims[axis]
    }

    /// Outermost label, if any.
    pub fn outer(&self) -> Option<Dim>
    {
        self.dims.first().map(|&(d, _)| d)
    }

    /// Insert `dim` at position `axis`.
    pub fn insert(&mut self, axis: usize, dim: Dim, len: usize) -> Result<()>
    {
        if self.contains(dim) {
            return Err(Error::Dimension(format!("duplicate dimension {} in {}", dim, self)));
        }
        if self.ndim() == NDIM_MAX {
            return Err(rank_overflow());
        }
        self.dims.insert(axis, (dim, len));
        self.check_volume()
    }

    /// Add `dim` at the outer end.
    pub fn insert_outer(&mut self, dim: Dim, len: usize) -> Result<()>
    {
        self.insert(0, dim, len)
    }

    /// Remove `dim`; *DimensionNotFoundError* when absent.
    pub fn erase(&mut self, dim: Dim) -> Result<()>
    {
        match self.index_of(dim) {
            Some(i) => {
                self.dims.remove(i);
                Ok(())
            }
            None => Err(Error::DimensionNotFound { dim, dims: self.clone() }),
        }
    }

    /// Replace the length of an existing `dim`.
    pub fn resize(&mut self, dim: Dim, len: usize) -> Result<()>
    {
        match self.index_of(dim) {
            Some(i) => {
                self.dims[i].1 = len;
                self.check_volume()
            }
            None => Err(Error::DimensionNotFound { dim, dims: self.clone() }),
        }
    }

    /// Rename `from` to `to`, keeping its position and length.
    pub fn rename(&mut self, from: Dim, to: Dim) -> Result<()>
    {
        if from != to && self.contains(to) {
            return Err(Error::Dimension(format!("duplicate dimension {} in {}", to, self)));
        }
        match self.index_of(from) {
            Some(i) => {
                self.dims[i].0 = to;
                Ok(())
            }
            None => Err(Error::DimensionNotFound { dim: from, dims: self.clone() }),
        }
    }

    /// Dimensions of the range slice `dim, begin..end`: the label is
    /// kept with the shortened length.
    pub fn slice_range(&self, dim: Dim, range: Range<usize>) -> Result<Dimensions>
    {
        let len = self.len_of(dim)?;
        if range.start > range.end || range.end > len {
            return Err(Error::Slice { dim, begin: range.start, end: range.end, len });
        }
        let mut out = self.clone();
        out.resize(dim, range.end - range.start)?;
        Ok(out)
    }

    /// Dimensions of the single-index slice `dim, index`: the label is
    /// removed.
    pub fn slice_index(&self, dim: Dim, index: usize) -> Result<Dimensions>
    {
        let len = self.len_of(dim)?;
        if index >= len {
            return Err(Error::Slice { dim, begin: index, end: index + 1, len });
        }
        let mut out = self.clone();
        out.erase(dim)?;
        Ok(out)
    }

    /// The minimal dimension set containing `a` and `b` as subsets.
    ///
    /// Labels found only in `b` are placed at the outer end, in their
    /// relative order in `b`; shared labels keep their position in `a`.
    /// A shared label with conflicting lengths is *DimensionLengthError*.
    pub fn merge(a: &Dimensions, b: &Dimensions) -> Result<Dimensions>
    {
        for &(dim, len) in &b.dims {
            if let Some(i) = a.index_of(dim) {
                if a.dims[i].1 != len {
                    return Err(Error::DimensionLength { dim, expected: a.dims[i].1, actual: len });
                }
            }
        }
        let mut out = Dimensions::empty();
        for &(dim, len) in &b.dims {
            if !a.contains(dim) {
                out.insert_inner(dim, len)?;
            }
        }
        for &(dim, len) in &a.dims {
            out.insert_inner(dim, len)?;
        }
        Ok(out)
    }

    /// True when every label of `inner` occurs in `self` with the same
    /// length.
    pub fn includes(&self, inner: &Dimensions) -> bool
    {
        inner
            .dims
            .iter()
            .all(|&(dim, len)| self.index_of(dim).map(|i| self.dims[i].1 == len).unwrap_or(false))
    }

    fn insert_inner(&mut self, dim: Dim, len: usize) -> Result<()>
    {
        if self.contains(dim) {
            return Err(Error::Dimension(format!("duplicate dimension {} in {}", dim, self)));
        }
        if self.ndim() == NDIM_MAX {
            return Err(rank_overflow());
        }
        self.dims.push((dim, len));
        self.check_volume()
    }

    fn check_volume(&self) -> Result<()>
    {
        let mut volume = 1i64;
        for &(dim, len) in &self.dims {
            let len = i64::try_from(len)
                .ok()
                .ok_or_else(|| Error::Dimension(format!("length of {} exceeds i64", dim)))?;
            volume = volume
                .checked_mul(len)
                .ok_or_else(|| Error::Dimension(format!("volume of {} exceeds i64", self)))?;
        }
        Ok(())
    }
}

fn rank_overflow() -> Error
{
    Error::Dimension(format!("at most {} dimensions are supported", NDIM_MAX))
}

impl From<&[(Dim, usize)]> for Dimensions
{
    /// Infallible construction for statically known shapes.
    ///
    /// **Panics** on a duplicate label or rank overflow.
    fn from(pairs: &[(Dim, usize)]) -> Dimensions
    {
        Dimensions::new(pairs).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl fmt::Display for Dimensions
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{{")?;
        for (i, &(dim, len)) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{{}, {}}}", dim, len)?;
        }
        write!(f, "}}")
    }
}

impl fmt::Debug for Dimensions
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(self, f)
    }
}
