use std::fmt;

/// A dimension label naming an axis of a variable.
///
/// Order of labels inside [`Dimensions`](crate::Dimensions) is
/// significant, outermost first. Labels compare by name only; the same
/// label in two variables refers to the same logical axis regardless of
/// its position.
///
/// Consumers with axes beyond the built-in set use `Dim::Other`:
///
/// ```
/// use ndvar::Dim;
/// const WAVELENGTH: Dim = Dim::Other("wavelength");
/// assert_ne!(WAVELENGTH, Dim::X);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Dim
{
    Event,
    Position,
    Row,
    Temperature,
    Time,
    X,
    Y,
    Z,
    /// A consumer-defined axis label.
    Other(&'static str),
}

impl Dim
{
    /// The label's name as written by `Display`.
    pub fn name(&self) -> &'static str
    {
        match *self {
            Dim::Event => "event",
            Dim::Position => "position",
            Dim::Row => "row",
            Dim::Temperature => "temperature",
            Dim::Time => "time",
            Dim::X => "x",
            Dim::Y => "y",
            Dim::Z => "z",
            Dim::Other(name) => name,
        }
    }
}

impl fmt::Display for Dim
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}
