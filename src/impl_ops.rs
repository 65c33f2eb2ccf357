// Copyright 2014-2016 bluss and ndarray developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Arithmetic between variables.
//!
//! The fallible entry points (`plus`, `times_assign`, ...) surface the
//! engine's typed errors; the operator impls are sugar over them and
//! **panic** with the formatted error when dimensions, dtypes, units or
//! variance channels are incompatible.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::buckets;
use crate::error::Result;
use crate::transform::kernels;
use crate::transform::{transform_binary, transform_binary_in_place, transform_unary};
use crate::variable::Variable;

/// `a + b` with broadcast by dimension label; units must match.
pub fn plus(a: &Variable, b: &Variable) -> Result<Variable>
{
    transform_binary(kernels::Plus, a, b)
}

/// `a - b` with broadcast by dimension label; units must match.
pub fn minus(a: &Variable, b: &Variable) -> Result<Variable>
{
    transform_binary(kernels::Minus, a, b)
}

/// `a * b`; units compose. Multiplying a binned variable by a scalar
/// distributes into the bin buffer.
pub fn times(a: &Variable, b: &Variable) -> Result<Variable>
{
    if a.is_binned() || b.is_binned() {
        return buckets::binned_arithmetic(a, b, times);
    }
    transform_binary(kernels::Times, a, b)
}

/// `a / b`; units compose. Dividing a binned variable by a scalar
/// distributes into the bin buffer.
pub fn divide(a: &Variable, b: &Variable) -> Result<Variable>
{
    if a.is_binned() || b.is_binned() {
        return buckets::binned_arithmetic(a, b, divide);
    }
    transform_binary(kernels::Divide, a, b)
}

/// `-a`: values negate, variances are unchanged.
pub fn neg(a: &Variable) -> Result<Variable>
{
    transform_unary(kernels::Neg, a)
}

pub fn plus_assign(a: &mut Variable, b: &Variable) -> Result<()>
{
    transform_binary_in_place(kernels::Plus, a, b)
}

pub fn minus_assign(a: &mut Variable, b: &Variable) -> Result<()>
{
    transform_binary_in_place(kernels::Minus, a, b)
}

pub fn times_assign(a: &mut Variable, b: &Variable) -> Result<()>
{
    transform_binary_in_place(kernels::Times, a, b)
}

pub fn divide_assign(a: &mut Variable, b: &Variable) -> Result<()>
{
    transform_binary_in_place(kernels::Divide, a, b)
}

macro_rules! impl_binary_op {
    ($trt:ident, $mth:ident, $func:ident, $doc:expr) => {
        /// Perform elementwise
        #[doc = $doc]
        /// between `self` and `rhs`, broadcasting by dimension label.
        ///
        /// **Panics** when dimensions, dtypes, units or variance
        /// channels are incompatible.
        impl $trt<&Variable> for &Variable
        {
            type Output = Variable;
            fn $mth(self, rhs: &Variable) -> Variable
            {
                $func(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        impl $trt<Variable> for &Variable
        {
            type Output = Variable;
            fn $mth(self, rhs: Variable) -> Variable
            {
                self.$mth(&rhs)
            }
        }

        impl $trt<&Variable> for Variable
        {
            type Output = Variable;
            fn $mth(self, rhs: &Variable) -> Variable
            {
                (&self).$mth(rhs)
            }
        }

        impl $trt<Variable> for Variable
        {
            type Output = Variable;
            fn $mth(self, rhs: Variable) -> Variable
            {
                (&self).$mth(&rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, plus, "addition");
impl_binary_op!(Sub, sub, minus, "subtraction");
impl_binary_op!(Mul, mul, times, "multiplication");
impl_binary_op!(Div, div, divide, "division");

macro_rules! impl_assign_op {
    ($trt:ident, $mth:ident, $func:ident) => {
        /// **Panics** when the operands are incompatible; see the
        /// fallible form for the error conditions.
        impl $trt<&Variable> for Variable
        {
            fn $mth(&mut self, rhs: &Variable)
            {
                $func(self, rhs).unwrap_or_else(|e| panic!("{}", e))
            }
        }

        impl $trt<Variable> for Variable
        {
            fn $mth(&mut self, rhs: Variable)
            {
                self.$mth(&rhs)
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, plus_assign);
impl_assign_op!(SubAssign, sub_assign, minus_assign);
impl_assign_op!(MulAssign, mul_assign, times_assign);
impl_assign_op!(DivAssign, div_assign, divide_assign);

impl Neg for &Variable
{
    type Output = Variable;
    fn neg(self) -> Variable
    {
        neg(self).unwrap_or_else(|e| panic!("{}", e))
    }
}

impl Neg for Variable
{
    type Output = Variable;
    fn neg(self) -> Variable
    {
        -&self
    }
}

/// Scalars that may appear directly as arithmetic operands; wrapped as
/// dimensionless scalar variables.
macro_rules! impl_scalar_ops {
    ($scalar:ty) => {
        impl Mul<$scalar> for &Variable
        {
            type Output = Variable;
            fn mul(self, rhs: $scalar) -> Variable
            {
                self * &Variable::scalar(rhs)
            }
        }

        impl Mul<&Variable> for $scalar
        {
            type Output = Variable;
            fn mul(self, rhs: &Variable) -> Variable
            {
                &Variable::scalar(self) * rhs
            }
        }

        impl Div<$scalar> for &Variable
        {
            type Output = Variable;
            fn div(self, rhs: $scalar) -> Variable
            {
                self / &Variable::scalar(rhs)
            }
        }

        impl Add<$scalar> for &Variable
        {
            type Output = Variable;
            fn add(self, rhs: $scalar) -> Variable
            {
                self + &Variable::scalar(rhs)
            }
        }

        impl Sub<$scalar> for &Variable
        {
            type Output = Variable;
            fn sub(self, rhs: $scalar) -> Variable
            {
                self - &Variable::scalar(rhs)
            }
        }
    };
}

impl_scalar_ops!(f64);
impl_scalar_ops!(i64);

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::dim::Dim;
    use crate::dimensions::Dimensions;
    use crate::units::Unit;

    #[test]
    fn operator_sugar_matches_fallible_form()
    {
        let dims = Dimensions::from(&[(Dim::X, 3)][..]);
        let a = Variable::new(dims.clone(), Unit::M, vec![1.0, 2.0, 3.0]).unwrap();
        let b = Variable::new(dims, Unit::M, vec![0.5, 0.5, 0.5]).unwrap();
        assert_eq!(&a + &b, plus(&a, &b).unwrap());
        assert_eq!(&a - &b, minus(&a, &b).unwrap());
        assert_eq!(&a * &b, times(&a, &b).unwrap());
        assert_eq!(&a / &b, divide(&a, &b).unwrap());
    }

    #[test]
    fn scalar_operands()
    {
        let dims = Dimensions::from(&[(Dim::X, 2)][..]);
        let a = Variable::new(dims, Unit::M, vec![1.0, 2.0]).unwrap();
        let scaled = &a * 3.0;
        assert_eq!(scaled.values::<f64>().unwrap(), &[3.0, 6.0]);
        assert_eq!(scaled.unit(), Unit::M);
        let left = 2.0 * &a;
        assert_eq!(left.values::<f64>().unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn compound_assignment()
    {
        let dims = Dimensions::from(&[(Dim::X, 2)][..]);
        let mut a = Variable::new(dims.clone(), Unit::M, vec![1.0, 2.0]).unwrap();
        let b = Variable::new(dims, Unit::M, vec![10.0, 20.0]).unwrap();
        a += &b;
        assert_eq!(a.values::<f64>().unwrap(), &[11.0, 22.0]);
        a *= &Variable::scalar(2.0);
        assert_eq!(a.values::<f64>().unwrap(), &[22.0, 44.0]);
    }

    #[test]
    #[should_panic(expected = "UnitError")]
    fn operator_panics_with_formatted_error()
    {
        let dims = Dimensions::from(&[(Dim::X, 1)][..]);
        let a = Variable::new(dims.clone(), Unit::M, vec![1.0]).unwrap();
        let b = Variable::new(dims, Unit::S, vec![1.0]).unwrap();
        let _ = &a + &b;
    }
}
