//! A variable with attached coordinates, masks and attributes.
//!
//! A coordinate whose length along its own dimension exceeds the data
//! length by one is a *bin-edge* coordinate: its values are the bin
//! boundaries rather than bin positions. The edge interpretation is
//! decided against the sibling data — a standalone length `N+1`
//! variable cannot be classified.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::dim::Dim;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::shape_ops;
use crate::variable::Variable;

#[derive(Clone, Debug, PartialEq)]
pub struct DataArray
{
    name: String,
    data: Variable,
    coords: BTreeMap<Dim, Variable>,
    masks: BTreeMap<String, Variable>,
    attrs: BTreeMap<String, Variable>,
}

impl DataArray
{
    pub fn new(data: Variable) -> DataArray
    {
        DataArray {
            name: String::new(),
            data,
            coords: BTreeMap::new(),
            masks: BTreeMap::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> DataArray
    {
        self.name = name.into();
        self
    }

    /// Builder-style coordinate attachment; **panics** on misaligned
    /// coordinates (see [`set_coord`](DataArray::set_coord)).
    pub fn with_coord(mut self, dim: Dim, coord: Variable) -> DataArray
    {
        self.set_coord(dim, coord).unwrap_or_else(|e| panic!("{}", e));
        self
    }

    pub fn with_mask(mut self, name: &str, mask: Variable) -> DataArray
    {
        self.set_mask(name, mask).unwrap_or_else(|e| panic!("{}", e));
        self
    }

    pub fn name(&self) -> &str
    {
        &self.name
    }

    pub fn set_name(&mut self, name: &str)
    {
        self.name = name.into();
    }

    pub fn data(&self) -> &Variable
    {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut Variable
    {
        &mut self.data
    }

    pub fn coords(&self) -> &BTreeMap<Dim, Variable>
    {
        &self.coords
    }

    pub fn coord(&self, dim: Dim) -> Option<&Variable>
    {
        self.coords.get(&dim)
    }

    pub fn masks(&self) -> &BTreeMap<String, Variable>
    {
        &self.masks
    }

    pub fn attrs(&self) -> &BTreeMap<String, Variable>
    {
        &self.attrs
    }

    /// Attach a coordinate for `dim`.
    ///
    /// Along every dimension shared with the data the coordinate length
    /// must match; along `dim` itself one extra entry is also accepted
    /// and marks a bin-edge coordinate.
    pub fn set_coord(&mut self, dim: Dim, coord: Variable) -> Result<()>
    {
        for &(d, len) in coord.dims().as_pairs() {
            if let Ok(data_len) = self.data.dims().len_of(d) {
                let edge_ok = d == dim && len == data_len + 1;
                if len != data_len && !edge_ok {
                    return Err(Error::DimensionLength { dim: d, expected: data_len, actual: len });
                }
            }
        }
        self.coords.insert(dim, coord);
        Ok(())
    }

    /// Attach a boolean mask; its dimensions must be a subset of the
    /// data's.
    pub fn set_mask(&mut self, name: &str, mask: Variable) -> Result<()>
    {
        if mask.dtype() != DType::Bool {
            return Err(Error::dtype_mismatch(DType::Bool, mask.dtype()));
        }
        if !self.data.dims().includes(mask.dims()) {
            return Err(Error::DimensionMismatch {
                expected: self.data.dims().clone(),
                actual: mask.dims().clone(),
            });
        }
        self.masks.insert(name.into(), mask);
        Ok(())
    }

    pub fn set_attr(&mut self, name: &str, attr: Variable)
    {
        self.attrs.insert(name.into(), attr);
    }

    /// True when the coordinate for `dim` holds bin edges (one more
    /// entry than the data along `dim`).
    pub fn is_edge_coord(&self, dim: Dim) -> bool
    {
        match (self.coord(dim), self.data.dims().len_of(dim)) {
            (Some(coord), Ok(data_len)) => {
                coord.dims().len_of(dim).map(|len| len == data_len + 1).unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Range slice along `dim`. Aligned coordinates are sliced with the
    /// data; a bin-edge coordinate keeps the trailing edge.
    pub fn slice_range(&self, dim: Dim, range: Range<usize>) -> Result<DataArray>
    {
        let data = self.data.slice_range(dim, range.clone())?;
        let mut coords = BTreeMap::new();
        for (&d, coord) in &self.coords {
            let sliced = if coord.dims().contains(dim) {
                if self.is_edge_coord(d) && d == dim {
                    coord.slice_range(dim, range.start..range.end + 1)?
                } else {
                    coord.slice_range(dim, range.clone())?
                }
            } else {
                coord.clone()
            };
            coords.insert(d, sliced);
        }
        let mut masks = BTreeMap::new();
        for (name, mask) in &self.masks {
            let sliced = if mask.dims().contains(dim) {
                mask.slice_range(dim, range.clone())?
            } else {
                mask.clone()
            };
            masks.insert(name.clone(), sliced);
        }
        let mut attrs = BTreeMap::new();
        for (name, attr) in &self.attrs {
            let sliced = if attr.dims().contains(dim) {
                attr.slice_range(dim, range.clone())?
            } else {
                attr.clone()
            };
            attrs.insert(name.clone(), sliced);
        }
        Ok(DataArray { name: self.name.clone(), data, coords, masks, attrs })
    }

    /// Single-index slice along `dim`; removes the dimension.
    ///
    /// Coordinates keyed on `dim` no longer apply and are dropped;
    /// coordinates merely spanning `dim` are sliced.
    pub fn slice(&self, dim: Dim, index: usize) -> Result<DataArray>
    {
        let data = self.data.slice(dim, index)?;
        let mut coords = BTreeMap::new();
        for (&d, coord) in &self.coords {
            if d == dim {
                continue;
            }
            let sliced = if coord.dims().contains(dim) {
                coord.slice(dim, index)?
            } else {
                coord.clone()
            };
            coords.insert(d, sliced);
        }
        let mut masks = BTreeMap::new();
        for (name, mask) in &self.masks {
            let sliced = if mask.dims().contains(dim) {
                mask.slice(dim, index)?
            } else {
                mask.clone()
            };
            masks.insert(name.clone(), sliced);
        }
        let mut attrs = BTreeMap::new();
        for (name, attr) in &self.attrs {
            let sliced = if attr.dims().contains(dim) {
                attr.slice(dim, index)?
            } else {
                attr.clone()
            };
            attrs.insert(name.clone(), sliced);
        }
        Ok(DataArray { name: self.name.clone(), data, coords, masks, attrs })
    }
}

/// Concatenate two data arrays along `dim`.
///
/// Coordinates spanning `dim` are concatenated; a bin-edge coordinate
/// requires the left operand's last edge to equal the right operand's
/// first edge (*BinEdgeError* otherwise) and the duplicate seam edge is
/// dropped. Coordinates not spanning `dim` must be equal. Attributes
/// follow the left operand.
pub fn concatenate(a: &DataArray, b: &DataArray, dim: Dim) -> Result<DataArray>
{
    let data = shape_ops::concatenate(a.data(), b.data(), dim)?;
    let mut coords = BTreeMap::new();
    for &d in a.coords.keys().chain(b.coords.keys()) {
        if coords.contains_key(&d) {
            continue;
        }
        let (Some(ca), Some(cb)) = (a.coord(d), b.coord(d)) else {
            return Err(Error::Dimension(format!(
                "coordinate {} is present in only one operand",
                d
            )));
        };
        let joined = if ca.dims().contains(dim) || cb.dims().contains(dim) {
            if a.is_edge_coord(d) && d == dim {
                let la = a.data.dims().len_of(dim)?;
                let lb_edges = cb.dims().len_of(dim)?;
                if ca.slice(dim, la)? != cb.slice(dim, 0)? {
                    return Err(Error::BinEdge(format!(
                        "edge coordinate {} mismatch at the concatenation seam",
                        d
                    )));
                }
                shape_ops::concatenate(ca, &cb.slice_range(dim, 1..lb_edges)?, dim)?
            } else {
                shape_ops::concatenate(ca, cb, dim)?
            }
        } else {
            if ca != cb {
                return Err(Error::Dimension(format!(
                    "coordinate {} differs between the operands",
                    d
                )));
            }
            ca.clone()
        };
        coords.insert(d, joined);
    }
    let mut masks = BTreeMap::new();
    for name in a.masks.keys().chain(b.masks.keys()) {
        if masks.contains_key(name) {
            continue;
        }
        let (Some(ma), Some(mb)) = (a.masks.get(name), b.masks.get(name)) else {
            return Err(Error::Dimension(format!("mask {} is present in only one operand", name)));
        };
        let joined = if ma.dims().contains(dim) || mb.dims().contains(dim) {
            shape_ops::concatenate(ma, mb, dim)?
        } else {
            if ma != mb {
                return Err(Error::Dimension(format!("mask {} differs between the operands", name)));
            }
            ma.clone()
        };
        masks.insert(name.clone(), joined);
    }
    Ok(DataArray {
        name: a.name.clone(),
        data,
        coords,
        masks,
        // Left-operand policy for attributes.
        attrs: a.attrs.clone(),
    })
}
