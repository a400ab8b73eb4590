//! Error types for the numeric engine.

use std::fmt;

// ============================================================================
// Error Kinds
// ============================================================================

/// Categories of numeric errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericErrorKind {
    /// Result exceeds the fixed-width representable range
    Overflow,
    /// Mathematically undefined operation (division by zero, ln of a
    /// non-positive number)
    Undefined,
    /// Malformed input string to a parsing constructor
    Format,
    /// Invalid argument supplied by the caller (negative shift count,
    /// radix outside 2-36)
    InvalidArgument,
}

impl fmt::Display for NumericErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NumericErrorKind::Overflow => "overflow",
            NumericErrorKind::Undefined => "undefined",
            NumericErrorKind::Format => "format",
            NumericErrorKind::InvalidArgument => "invalid argument",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// A numeric error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericError {
    /// The category of error
    pub kind: NumericErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The offending input, for parse errors
    pub input: Option<String>,
}

impl NumericError {
    /// Create a new numeric error.
    pub fn new(kind: NumericErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            input: None,
        }
    }

    /// Attach the offending input to the error.
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Create an overflow error.
    pub fn overflow(what: impl Into<String>) -> Self {
        Self::new(NumericErrorKind::Overflow, what)
    }

    /// Create an undefined-operation error.
    pub fn undefined(what: impl Into<String>) -> Self {
        Self::new(NumericErrorKind::Undefined, what)
    }

    /// Create a format error carrying the offending input.
    pub fn format(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(NumericErrorKind::Format, reason).with_input(input)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(what: impl Into<String>) -> Self {
        Self::new(NumericErrorKind::InvalidArgument, what)
    }

    /// True if this error reports a range overflow.
    pub fn is_overflow(&self) -> bool {
        self.kind == NumericErrorKind::Overflow
    }
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(input) = &self.input {
            write!(f, " (input: {input:?})")?;
        }
        Ok(())
    }
}

impl std::error::Error for NumericError {}

/// Result alias used across the crate.
pub type NumericResult<T> = Result<T, NumericError>;
