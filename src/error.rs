//! Error classification for reader and evaluator failures.
//!
//! Mirrors the teacher's `EvalError`: a `thiserror` enum plus small helper
//! constructors so call sites never hand-build a message string. The
//! variants themselves follow the error-kind table (spec §7) rather than
//! the teacher's Lisp-flavored set.

use crate::value::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JoyError {
    #[error("{0}")]
    ParseError(String),

    #[error("{op}: needs {needed} item{}, has {have}", if *needed == 1 { "" } else { "s" })]
    StackUnderflow {
        op: String,
        needed: usize,
        have: usize,
    },

    #[error("{op}: expected {expected}, got {actual}")]
    TypeError {
        op: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    UndefinedSymbol(String),

    #[error("{op}: {detail}")]
    DomainError { op: String, detail: String },

    #[error("{op}: {detail}")]
    FileError { op: String, detail: String },

    #[error("abort")]
    AbortRequested,

    #[error("quit")]
    QuitRequested(i32),
}

impl JoyError {
    pub fn parse_error(detail: impl Into<String>) -> Self {
        JoyError::ParseError(detail.into())
    }

    pub fn stack_underflow(op: &str, needed: usize, have: usize) -> Self {
        JoyError::StackUnderflow {
            op: op.to_string(),
            needed,
            have,
        }
    }

    pub fn type_error(op: &str, expected: &str, actual: &Value) -> Self {
        JoyError::TypeError {
            op: op.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn type_error_tag(op: &str, expected: &str, actual_tag: &str) -> Self {
        JoyError::TypeError {
            op: op.to_string(),
            expected: expected.to_string(),
            actual: actual_tag.to_string(),
        }
    }

    pub fn undefined_symbol(name: &str) -> Self {
        JoyError::UndefinedSymbol(name.to_string())
    }

    pub fn domain_error(op: &str, detail: impl Into<String>) -> Self {
        JoyError::DomainError {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    pub fn file_error(op: &str, detail: impl Into<String>) -> Self {
        JoyError::FileError {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    /// The error-kind tag used in diagnostics (spec §7's table header).
    pub fn kind(&self) -> &'static str {
        match self {
            JoyError::ParseError(_) => "ParseError",
            JoyError::StackUnderflow { .. } => "StackUnderflow",
            JoyError::TypeError { .. } => "TypeError",
            JoyError::UndefinedSymbol(_) => "UndefinedSymbol",
            JoyError::DomainError { .. } => "DomainError",
            JoyError::FileError { .. } => "FileError",
            JoyError::AbortRequested => "AbortRequested",
            JoyError::QuitRequested(_) => "QuitRequested",
        }
    }
}
