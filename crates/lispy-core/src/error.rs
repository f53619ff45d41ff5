use std::fmt;
use std::rc::Rc;

use crate::value::{ErrorValue, Value};

/// Check arity of a native procedure's arguments, returning
/// `LispyError::InvalidArgument` on mismatch.
///
/// # Forms
///
/// ```ignore
/// check_arity!(args, "proc-name", 2);        // exactly 2
/// check_arity!(args, "proc-name", 1..=3);    // 1 to 3 inclusive
/// check_arity!(args, "proc-name", 2..);      // 2 or more
/// ```
#[macro_export]
macro_rules! check_arity {
    ($args:expr, $name:expr, $exact:literal) => {
        if $args.len() != $exact {
            return Err($crate::LispyError::arity(
                $name,
                stringify!($exact),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..= $hi:literal) => {
        if $args.len() < $lo || $args.len() > $hi {
            return Err($crate::LispyError::arity(
                $name,
                concat!(stringify!($lo), "-", stringify!($hi)),
                $args.len(),
            ));
        }
    };
    ($args:expr, $name:expr, $lo:literal ..) => {
        if $args.len() < $lo {
            return Err($crate::LispyError::arity(
                $name,
                concat!(stringify!($lo), "+"),
                $args.len(),
            ));
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn point(line: usize, col: usize) -> Self {
        Span { line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LispyError {
    #[error("Parse error at {span}: {message}")]
    Parser { message: String, span: Span },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unexpected input: {0}")]
    UnexpectedInput(String),

    #[error("IO error: {0}")]
    Io(String),

    /// A value raised by the `error` primitive (or re-raised `Error` value).
    #[error("{0}")]
    Raised(Value),

    /// An error annotated with the call stack captured where it was first
    /// observed by the evaluator.
    #[error("{inner}")]
    WithStack {
        inner: Box<LispyError>,
        stack: String,
    },
}

impl LispyError {
    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        LispyError::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn key_not_found(name: impl Into<String>) -> Self {
        LispyError::KeyNotFound(name.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        LispyError::InvalidArgument(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        LispyError::InvalidOperation(msg.into())
    }

    pub fn unexpected_input(msg: impl Into<String>) -> Self {
        LispyError::UnexpectedInput(msg.into())
    }

    pub fn arity(name: impl fmt::Display, expected: impl fmt::Display, got: usize) -> Self {
        LispyError::InvalidArgument(format!("{name} expects {expected} args, got {got}"))
    }

    /// The error taxonomy tag exposed to Lispy code via `error:name`.
    pub fn tag(&self) -> &'static str {
        match self.inner() {
            LispyError::Parser { .. } => "ParserError",
            LispyError::KeyNotFound(_) => "KeyNotFound",
            LispyError::InvalidArgument(_) => "InvalidArgument",
            LispyError::InvalidOperation(_) => "InvalidOperation",
            LispyError::UnexpectedInput(_) => "UnexpectedInput",
            LispyError::Io(_) => "IOError",
            LispyError::Raised(_) => "Error",
            LispyError::WithStack { .. } => unreachable!("inner() unwraps WithStack"),
        }
    }

    /// Attach a stack trace (no-op if one is already attached).
    pub fn with_stack(self, stack: String) -> Self {
        match self {
            LispyError::WithStack { .. } => self,
            other => LispyError::WithStack {
                inner: Box::new(other),
                stack,
            },
        }
    }

    pub fn stack_trace(&self) -> Option<&str> {
        match self {
            LispyError::WithStack { stack, .. } => Some(stack),
            _ => None,
        }
    }

    /// Strip any stack annotation.
    pub fn inner(&self) -> &LispyError {
        match self {
            LispyError::WithStack { inner, .. } => inner.inner(),
            other => other,
        }
    }
}

/// Convert a raised error into an `Error` value for `try` handlers and
/// top-level reporting. A `Raised` payload that already is an `Error`
/// value passes through unchanged; any other raised value is wrapped with
/// the original value preserved in `data`.
pub fn error_to_value(err: &LispyError) -> Value {
    let stack = err.stack_trace().map(|s| s.to_string());
    match err.inner() {
        LispyError::Raised(Value::Error(e)) => {
            if stack.is_some() && e.stack.is_none() {
                Value::Error(Rc::new(ErrorValue {
                    name: e.name.clone(),
                    message: e.message.clone(),
                    stack,
                    code: e.code.clone(),
                    data: e.data.clone(),
                }))
            } else {
                Value::Error(Rc::clone(e))
            }
        }
        LispyError::Raised(other) => Value::Error(Rc::new(ErrorValue {
            name: "Error".to_string(),
            message: other.to_display_string(),
            stack,
            code: None,
            data: Some(other.clone()),
        })),
        other => Value::Error(Rc::new(ErrorValue {
            name: other.tag().to_string(),
            message: other.to_string(),
            stack,
            code: None,
            data: None,
        })),
    }
}
