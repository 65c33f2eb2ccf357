//! Fixed-size geometric element types.
//!
//! Plain-data carriers registered with the variable factory. They take
//! part in storage, slicing, concatenation and equality; elementwise
//! arithmetic over them is left to consumers that register kernels.

/// A point or direction in 3-D space.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Vector3(pub [f64; 3]);

/// A 3x3 matrix, row-major.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Matrix3(pub [[f64; 3]; 3]);

impl Matrix3
{
    pub fn identity() -> Matrix3
    {
        Matrix3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }
}

/// An affine transform: linear part plus translation.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Affine
{
    pub linear: Matrix3,
    pub translation: Vector3,
}

/// A rotation as `(x, y, z, w)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Quaternion(pub [f64; 4]);

impl Default for Quaternion
{
    fn default() -> Quaternion
    {
        Quaternion([0.0, 0.0, 0.0, 1.0])
    }
}
