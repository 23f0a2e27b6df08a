use std::fmt;

/// Integer level forwarded to the display program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i64);

impl Level {
    /// Wraps an integer level.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the wrapped integer.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Parses measurement output as a float and truncates it toward zero.
    ///
    /// Returns `None` for text that is not a number and for NaN or infinite
    /// values. Out-of-range values saturate at the `i64` bounds.
    #[must_use]
    pub fn parse(output: &str) -> Option<Self> {
        let value: f64 = output.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self(value.trunc() as i64))
    }

    /// Wire form written into the display pipe.
    #[must_use]
    pub fn to_line(self) -> String {
        format!("{}\n", self.0)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("42.7", 42)]
    #[case("7", 7)]
    #[case(" 100\n", 100)]
    #[case("-3.9", -3)]
    #[case("0.99", 0)]
    #[case("1e2", 100)]
    fn truncates_toward_zero(#[case] output: &str, #[case] expected: i64) {
        assert_eq!(Level::parse(output), Some(Level::new(expected)));
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("55%")]
    #[case("NaN")]
    #[case("inf")]
    fn rejects_malformed_output(#[case] output: &str) {
        assert_eq!(Level::parse(output), None);
    }

    #[test]
    fn line_is_newline_terminated() {
        assert_eq!(Level::new(42).to_line(), "42\n");
    }
}
