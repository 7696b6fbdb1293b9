use std::fmt;

/// An error in the syntax of a cell expression.
///
/// It is composed of a message and the position (in characters, starting from 0) where the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct SyntaxError {
    position: usize,
    message: String,
}

impl SyntaxError {
    pub(crate) fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// The position of the error inside of the expression, in characters.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SyntaxError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parser error at column {}: {}",
            self.position + 1,
            self.message
        )
    }
}
