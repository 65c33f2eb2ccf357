//! The `ndvar` crate provides labeled, unit-aware multi-dimensional
//! arrays for scientific data.
//!
//! - [`Variable`]: an N-dimensional array addressed by dimension
//!   *labels* rather than positions, carrying a physical [`Unit`] and
//!   an optional per-element variance channel.
//! - [`DataArray`]: a variable with attached coordinate, mask and
//!   attribute dictionaries.
//! - [`buckets`]: variables whose elements are bins — `[begin, end)`
//!   slices into a shared event buffer — with bin-wise arithmetic,
//!   concatenation and histogramming.
//!
//! ## Highlights
//!
//! - Broadcasting is automatic and by dimension label: adding a
//!   `{z}` variable to a `{z, y, x}` variable repeats it over `y` and
//!   `x`; there is no positional axis matching.
//! - Units participate in every operation. Adding metres to seconds,
//!   multiplying two `counts` variables, or taking `log` of a
//!   dimensional quantity fails before any element is touched.
//! - Variances propagate through arithmetic under the first-order
//!   uncorrelated model, with the multiplicative guard that both or
//!   neither operand must carry them.
//! - Slicing, transposing and broadcasting are cheap views; storage is
//!   shared copy-on-write, and mutation never leaks into sibling views.
//! - Elementwise transforms run in parallel over blocks of the
//!   outermost output dimension.
//!
//! ## Example
//!
//! ```
//! use ndvar::{Dim, Dimensions, Unit, Variable};
//!
//! let a = Variable::new(
//!     Dimensions::from(&[(Dim::Y, 2), (Dim::X, 3)][..]),
//!     Unit::M,
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
//! )?;
//! let row = Variable::new(
//!     Dimensions::from(&[(Dim::X, 3)][..]),
//!     Unit::M,
//!     vec![0.1, 0.2, 0.3],
//! )?;
//! let shifted = &a + &row; // broadcast over y
//! assert_eq!(shifted.values::<f64>()?, &[1.1, 2.2, 3.3, 4.1, 5.2, 6.3]);
//! # Ok::<(), ndvar::Error>(())
//! ```

pub mod buckets;
mod data_array;
mod data_holders;
mod dim;
mod dimensions;
mod dtype;
mod element_view;
mod error;
pub mod factory;
mod geometry;
mod histogram;
mod impl_ops;
mod math;
mod parallel;
mod reduction;
mod shape_ops;
mod strides;
mod transform;
mod units;
mod value_variance;
mod variable;
mod view_index;

pub use crate::data_array::{concatenate as concatenate_data_arrays, DataArray};
pub use crate::dim::Dim;
pub use crate::dimensions::{Dimensions, NDIM_MAX};
pub use crate::dtype::{DType, Element, IndexPair, TimePoint};
pub use crate::element_view::ElementArrayView;
pub use crate::error::{Error, Result};
pub use crate::geometry::{Affine, Matrix3, Quaternion, Vector3};
pub use crate::histogram::histogram;
pub use crate::impl_ops::{
    divide, divide_assign, minus, minus_assign, neg, plus, plus_assign, times, times_assign,
};
pub use crate::math::{
    abs, abs_in_place, exp, exp_in_place, log, log10, log10_in_place, log_in_place, pow,
    pow_in_place, reciprocal, reciprocal_in_place, sqrt, sqrt_in_place,
};
pub use crate::reduction::{mean, sum};
pub use crate::shape_ops::{broadcast, concatenate};
pub use crate::strides::Strides;
pub use crate::units::Unit;
pub use crate::value_variance::ValueAndVariance;
pub use crate::variable::Variable;
