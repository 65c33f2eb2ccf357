// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use std::error;
use std::fmt;

use crate::dim::Dim;
use crate::dimensions::Dimensions;
use crate::dtype::DType;
use crate::units::Unit;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised by a variable operation.
///
/// Every variant formats the offending dimensions, dtype or unit values
/// into the message, so that `to_string()` output can be shown to a user
/// without further context.
#[derive(Clone, Debug, PartialEq)]
pub enum Error
{
    /// Generic dimension error: bad label, missing label, broadcast
    /// write, rank overflow.
    Dimension(String),
    /// Two dimension sets were required to match exactly.
    DimensionMismatch
    {
        expected: Dimensions,
        actual: Dimensions,
    },
    /// A dimension label is absent from a dimension set.
    DimensionNotFound
    {
        dim: Dim, dims: Dimensions
    },
    /// A shared dimension label has conflicting lengths.
    DimensionLength
    {
        dim: Dim,
        expected: usize,
        actual: usize,
    },
    /// Index or range out of bounds along a dimension.
    Slice
    {
        dim: Dim,
        begin: usize,
        end: usize,
        len: usize,
    },
    /// Element type not supported for the operation.
    Type(String),
    /// Unit precondition violated.
    Unit(String),
    /// Two units were required to be equal.
    UnitMismatch
    {
        left: Unit, right: Unit
    },
    /// Variance channel missing, forbidden, or inconsistent.
    Variances(String),
    /// Bin-edge precondition violated (histogram or concatenation).
    BinEdge(String),
}

impl Error
{
    pub(crate) fn unsupported_dtype(op: &str, dtype: DType) -> Error
    {
        Error::Type(format!("`{}` does not support dtype {}", op, dtype))
    }

    pub(crate) fn unsupported_dtype_pair(op: &str, a: DType, b: DType) -> Error
    {
        Error::Type(format!("`{}` does not support dtypes ({}, {})", op, a, b))
    }

    pub(crate) fn dtype_mismatch(expected: DType, actual: DType) -> Error
    {
        Error::Type(format!("expected dtype {}, got {}", expected, actual))
    }

    pub(crate) fn not_dimensionless(op: &str, unit: Unit) -> Error
    {
        Error::Unit(format!("`{}` requires a dimensionless operand, got unit {}", op, unit))
    }

    pub(crate) fn missing_variances() -> Error
    {
        Error::Variances("variances requested but the variable has none".into())
    }

    pub(crate) fn broadcast_write(dims: &Dimensions) -> Error
    {
        Error::Dimension(format!("cannot write through a broadcast view with dimensions {}", dims))
    }
}

impl fmt::Display for Error
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Error::Dimension(msg) => write!(f, "DimensionError: {}", msg),
            Error::DimensionMismatch { expected, actual } => {
                write!(f, "DimensionError: expected dimensions {}, got {}", expected, actual)
            }
            Error::DimensionNotFound { dim, dims } => {
                write!(f, "DimensionError: dimension {} not found in {}", dim, dims)
            }
            Error::DimensionLength { dim, expected, actual } => write!(
                f,
                "DimensionError: length mismatch in dimension {}: expected {}, got {}",
                dim, expected, actual
            ),
            Error::Slice { dim, begin, end, len } => write!(
                f,
                "SliceError: range [{}, {}) out of bounds for dimension {} of length {}",
                begin, end, dim, len
            ),
            Error::Type(msg) => write!(f, "TypeError: {}", msg),
            Error::Unit(msg) => write!(f, "UnitError: {}", msg),
            Error::UnitMismatch { left, right } => {
                write!(f, "UnitError: expected unit {}, got {}", left, right)
            }
            Error::Variances(msg) => write!(f, "VariancesError: {}", msg),
            Error::BinEdge(msg) => write!(f, "BinEdgeError: {}", msg),
        }
    }
}

impl error::Error for Error {}
