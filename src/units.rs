//! Physical units as vectors of base-dimension exponents.
//!
//! `Unit` is a trivially copyable value type with monoidal `*`, inverse
//! `/`, integer `pow`, fallible `sqrt` and equality. `counts` is carried
//! as its own pseudo-dimension so histogram policy can distinguish
//! event-count data from dimensionless scale factors.

use std::fmt;
use std::ops::{Div, Mul};

use crate::error::{Error, Result};

const NBASE: usize = 8;

static SYMBOLS: [&str; NBASE] = ["m", "kg", "s", "A", "K", "mol", "cd", "counts"];

/// A physical unit: signed exponents over the seven SI base dimensions
/// plus `counts`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit
{
    powers: [i16; NBASE],
}

macro_rules! base_unit {
    ($(#[$attr:meta])* $name:ident, $index:expr) => {
        $(#[$attr])*
        pub const $name: Unit = {
            let mut powers = [0i16; NBASE];
            powers[$index] = 1;
            Unit { powers }
        };
    };
}

impl Unit
{
    /// The multiplicative identity.
    pub const DIMENSIONLESS: Unit = Unit { powers: [0; NBASE] };

    base_unit!(/// Metre.
        M, 0);
    base_unit!(/// Kilogram.
        KG, 1);
    base_unit!(/// Second.
        S, 2);
    base_unit!(/// Ampere.
        A, 3);
    base_unit!(/// Kelvin.
        K, 4);
    base_unit!(/// Mole.
        MOL, 5);
    base_unit!(/// Candela.
        CD, 6);
    base_unit!(/// Event counts (histogram weights).
        COUNTS, 7);

    pub fn is_dimensionless(&self) -> bool
    {
        *self == Unit::DIMENSIONLESS
    }

    pub fn is_counts(&self) -> bool
    {
        *self == Unit::COUNTS
    }

    /// Raise to an integer power.
    pub fn pow(&self, n: i32) -> Unit
    {
        let mut powers = [0i16; NBASE];
        for i in 0..NBASE {
            powers[i] = self.powers[i] * n as i16;
        }
        Unit { powers }
    }

    /// Square root; *UnitError* unless every exponent is even.
    pub fn sqrt(&self) -> Result<Unit>
    {
        let mut powers = [0i16; NBASE];
        for i in 0..NBASE {
            if self.powers[i] % 2 != 0 {
                return Err(Error::Unit(format!("{} is not a perfect square", self)));
            }
            powers[i] = self.powers[i] / 2;
        }
        Ok(Unit { powers })
    }
}

impl Mul for Unit
{
    type Output = Unit;
    fn mul(self, rhs: Unit) -> Unit
    {
        let mut powers = [0i16; NBASE];
        for i in 0..NBASE {
            powers[i] = self.powers[i] + rhs.powers[i];
        }
        Unit { powers }
    }
}

impl Div for Unit
{
    type Output = Unit;
    fn div(self, rhs: Unit) -> Unit
    {
        let mut powers = [0i16; NBASE];
        for i in 0..NBASE {
            powers[i] = self.powers[i] - rhs.powers[i];
        }
        Unit { powers }
    }
}

impl Default for Unit
{
    fn default() -> Unit
    {
        Unit::DIMENSIONLESS
    }
}

impl fmt::Display for Unit
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.is_dimensionless() {
            return f.write_str("dimensionless");
        }
        let mut first = true;
        for (i, &symbol) in SYMBOLS.iter().enumerate() {
            let power = self.powers[i];
            if power == 0 {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            if power == 1 {
                f.write_str(symbol)?;
            } else {
                write!(f, "{}^{}", symbol, power)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Unit
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::Display::fmt(self, f)
    }
}
