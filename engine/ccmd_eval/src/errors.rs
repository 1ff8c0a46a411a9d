//! Error types.
//!
//! Two layers, mirroring how failures are handled:
//!
//! - [`FnError`] is a failure inside one function call. It is contained at
//!   the directive boundary and rendered inline as `[name: message]`; the
//!   rest of the template keeps evaluating.
//! - [`EngineError`] aborts the whole evaluation: a quota was exceeded or
//!   the inputs were unusable.
//!
//! Factory functions (`wrong_arg_type()`, `division_by_zero()`, ...) are
//! the way to build an `FnError`; they fill in both kind and message.

use std::fmt;

use ccmd_value::{ContextError, Value};

use crate::host::HostError;
use crate::registry::Arity;

/// Result of a function call.
pub type FnResult = Result<Value, FnError>;

/// Typed category of a function failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FnErrorKind {
    // Arithmetic
    DivisionByZero,
    ModuloByZero,
    IntegerOverflow { operation: &'static str },
    NotFinite,

    // Arguments
    ArityMismatch { expected: Arity, got: usize },
    TypeMismatch {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },
    IndexOutOfBounds { index: i64, len: usize },
    InvalidArgument { message: String },
    InvalidPattern { message: String },

    // Collaborators
    Host(HostError),
    PolicyViolation { message: String },
    Timeout { millis: u64 },

    /// Anything not worth its own variant.
    Custom { message: String },
}

impl fmt::Display for FnErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ModuloByZero => write!(f, "modulo by zero"),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::NotFinite => write!(f, "result is not a finite number"),

            Self::ArityMismatch { expected, got } => write!(f, "expected {expected}, got {got}"),
            Self::TypeMismatch {
                index,
                expected,
                got,
            } => write!(f, "argument {} must be {expected}, got {got}", index + 1),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::InvalidArgument { message } | Self::Custom { message } => {
                write!(f, "{message}")
            }
            Self::InvalidPattern { message } => write!(f, "invalid pattern: {message}"),

            Self::Host(err) => write!(f, "{err}"),
            Self::PolicyViolation { message } => write!(f, "not allowed: {message}"),
            Self::Timeout { millis } => write!(f, "timed out after {millis}ms"),
        }
    }
}

/// A contained failure of one function call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnError {
    pub kind: FnErrorKind,
    pub message: String,
}

impl FnError {
    fn from_kind(kind: FnErrorKind) -> Self {
        let message = kind.to_string();
        FnError { kind, message }
    }

    /// An uncategorized failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(FnErrorKind::Custom {
            message: message.into(),
        })
    }
}

impl fmt::Display for FnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FnError {}

impl From<HostError> for FnError {
    fn from(err: HostError) -> Self {
        FnError::from_kind(FnErrorKind::Host(err))
    }
}

#[cold]
pub fn division_by_zero() -> FnError {
    FnError::from_kind(FnErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> FnError {
    FnError::from_kind(FnErrorKind::ModuloByZero)
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> FnError {
    FnError::from_kind(FnErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn not_finite() -> FnError {
    FnError::from_kind(FnErrorKind::NotFinite)
}

#[cold]
pub fn wrong_arg_count(expected: Arity, got: usize) -> FnError {
    FnError::from_kind(FnErrorKind::ArityMismatch { expected, got })
}

/// Argument `index` (zero-based) had the wrong type.
#[cold]
pub fn wrong_arg_type(index: usize, expected: &'static str, got: &Value) -> FnError {
    FnError::from_kind(FnErrorKind::TypeMismatch {
        index,
        expected,
        got: got.type_name(),
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, len: usize) -> FnError {
    FnError::from_kind(FnErrorKind::IndexOutOfBounds { index, len })
}

#[cold]
pub fn invalid_argument(message: impl Into<String>) -> FnError {
    FnError::from_kind(FnErrorKind::InvalidArgument {
        message: message.into(),
    })
}

#[cold]
pub fn invalid_pattern(err: &regex::Error) -> FnError {
    FnError::from_kind(FnErrorKind::InvalidPattern {
        message: err.to_string(),
    })
}

#[cold]
pub fn policy_violation(message: impl Into<String>) -> FnError {
    FnError::from_kind(FnErrorKind::PolicyViolation {
        message: message.into(),
    })
}

#[cold]
pub fn timed_out(millis: u64) -> FnError {
    FnError::from_kind(FnErrorKind::Timeout { millis })
}

/// A failure that aborts the whole evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("malformed context: {0}")]
    MalformedContext(#[from] ContextError),
    #[error("template is {len} bytes, limit is {limit}")]
    TemplateTooLarge { len: usize, limit: usize },
    #[error("template has more than {limit} directives")]
    DirectiveQuotaExceeded { limit: usize },
    #[error("expression nesting deeper than {limit}")]
    NestingTooDeep { limit: usize },
    #[error("more than {limit} effecting calls")]
    EffectQuotaExceeded { limit: usize },
    #[error("output exceeds {limit} bytes")]
    OutputTooLarge { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_factory_messages() {
        assert_eq!(division_by_zero().to_string(), "division by zero");
        assert_eq!(
            wrong_arg_type(1, "a number", &Value::string("x")).to_string(),
            "argument 2 must be a number, got string"
        );
        assert_eq!(
            wrong_arg_count(Arity::Exact(2), 1).to_string(),
            "expected 2 arguments, got 1"
        );
        assert_eq!(
            wrong_arg_count(Arity::Between(1, 3), 0).to_string(),
            "expected 1 to 3 arguments, got 0"
        );
    }

    #[test]
    fn test_host_error_is_wrapped() {
        let err = FnError::from(HostError::NotFound("member 9".into()));
        assert_eq!(err.kind, FnErrorKind::Host(HostError::NotFound("member 9".into())));
        assert_eq!(err.to_string(), "not found: member 9");
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::NestingTooDeep { limit: 16 };
        assert_eq!(err.to_string(), "expression nesting deeper than 16");
    }
}
