use core::fmt;

/// A pair of observed and expected values carried by mismatch errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GotExpected<T> {
    /// The value observed.
    pub got: T,
    /// The value expected.
    pub expected: T,
}

impl<T: fmt::Display> fmt::Display for GotExpected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "got {}, expected {}", self.got, self.expected)
    }
}

impl<T> From<(T, T)> for GotExpected<T> {
    fn from((got, expected): (T, T)) -> Self {
        Self { got, expected }
    }
}
