use std::fmt;

use crate::geometry::{Affine, Matrix3, Quaternion, Vector3};

/// Runtime identifier of an element type.
///
/// Two `DType` values compare equal iff they name the same element type.
/// `Binned` is the sentinel for variables whose elements are bins into a
/// shared buffer; the buffer's own element type is reported separately.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DType
{
    Float64,
    Float32,
    Int64,
    Int32,
    Bool,
    Str,
    Vector3,
    Matrix3,
    Affine,
    Quaternion,
    TimePoint,
    IndexPair,
    Binned,
    /// A consumer-registered element type, identified by name.
    Custom(&'static str),
}

impl fmt::Display for DType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match *self {
            DType::Float64 => "float64",
            DType::Float32 => "float32",
            DType::Int64 => "int64",
            DType::Int32 => "int32",
            DType::Bool => "bool",
            DType::Str => "string",
            DType::Vector3 => "vector3",
            DType::Matrix3 => "matrix3",
            DType::Affine => "affine",
            DType::Quaternion => "quaternion",
            DType::TimePoint => "time_point",
            DType::IndexPair => "index_pair",
            DType::Binned => "binned",
            DType::Custom(name) => name,
        };
        f.write_str(name)
    }
}

/// A point in time as nanoseconds since the epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug)]
pub struct TimePoint(pub i64);

/// A `[begin, end)` range of offsets into a bin buffer.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct IndexPair
{
    pub begin: i64,
    pub end: i64,
}

impl IndexPair
{
    pub fn new(begin: i64, end: i64) -> IndexPair
    {
        IndexPair { begin, end }
    }

    pub fn len(&self) -> i64
    {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool
    {
        self.end == self.begin
    }
}

/// A Rust type usable as the element type of a dense variable.
///
/// Consumers adding their own element types implement this together with
/// a [factory](crate::factory) registration; the transform kernels
/// enumerate supported dtypes explicitly, so new element types
/// participate in storage, slicing and concatenation but not in
/// arithmetic unless kernels are added for them.
pub trait Element: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const DTYPE: DType;
    /// Whether a variance channel may accompany values of this type.
    const SUPPORTS_VARIANCES: bool = false;
}

impl Element for f64
{
    const DTYPE: DType = DType::Float64;
    const SUPPORTS_VARIANCES: bool = true;
}

impl Element for f32
{
    const DTYPE: DType = DType::Float32;
    const SUPPORTS_VARIANCES: bool = true;
}

impl Element for i64
{
    const DTYPE: DType = DType::Int64;
}

impl Element for i32
{
    const DTYPE: DType = DType::Int32;
}

impl Element for bool
{
    const DTYPE: DType = DType::Bool;
}

impl Element for String
{
    const DTYPE: DType = DType::Str;
}

impl Element for Vector3
{
    const DTYPE: DType = DType::Vector3;
}

impl Element for Matrix3
{
    const DTYPE: DType = DType::Matrix3;
}

impl Element for Affine
{
    const DTYPE: DType = DType::Affine;
}

impl Element for Quaternion
{
    const DTYPE: DType = DType::Quaternion;
}

impl Element for TimePoint
{
    const DTYPE: DType = DType::TimePoint;
}

impl Element for IndexPair
{
    const DTYPE: DType = DType::IndexPair;
}

/// Expand a macro once per registered dense element type.
///
/// The callee receives the Rust type; used for dtype-dispatched code
/// paths such as equality, concatenation and the factory registration.
macro_rules! for_each_element_type {
    ($mac:ident) => {
        $mac!(f64);
        $mac!(f32);
        $mac!(i64);
        $mac!(i32);
        $mac!(bool);
        $mac!(String);
        $mac!($crate::geometry::Vector3);
        $mac!($crate::geometry::Matrix3);
        $mac!($crate::geometry::Affine);
        $mac!($crate::geometry::Quaternion);
        $mac!($crate::dtype::TimePoint);
        $mac!($crate::dtype::IndexPair);
    };
}

pub(crate) use for_each_element_type;

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn dtype_equality_is_by_name()
    {
        assert_eq!(<f64 as Element>::DTYPE, DType::Float64);
        assert_ne!(DType::Float64, DType::Float32);
    }

    #[test]
    fn variance_capability()
    {
        assert!(f64::SUPPORTS_VARIANCES);
        assert!(f32::SUPPORTS_VARIANCES);
        assert!(!i64::SUPPORTS_VARIANCES);
        assert!(!bool::SUPPORTS_VARIANCES);
    }

    #[test]
    fn index_pair_len()
    {
        assert_eq!(IndexPair::new(2, 5).len(), 3);
        assert!(IndexPair::new(4, 4).is_empty());
    }
}
