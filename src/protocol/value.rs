//! Response values
//!
//! The typed, possibly nested value carried by every response, plus its
//! human-readable rendering.

use std::fmt;

/// Type tag of an encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Nil = 0,
    Err = 1,
    Str = 2,
    Int = 3,
    Dbl = 4,
    Arr = 5,
}

impl Tag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Tag::Nil),
            1 => Some(Tag::Err),
            2 => Some(Tag::Str),
            3 => Some(Tag::Int),
            4 => Some(Tag::Dbl),
            5 => Some(Tag::Arr),
            _ => None,
        }
    }
}

/// Error codes carried by `Err` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    UnknownCommand,
    TooBig,
    WrongType,
    BadArgument,
    WrongArity,
    /// A code this build does not know about
    Other(u32),
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        match self {
            ErrorCode::UnknownCommand => 1,
            ErrorCode::TooBig => 2,
            ErrorCode::WrongType => 3,
            ErrorCode::BadArgument => 4,
            ErrorCode::WrongArity => 5,
            ErrorCode::Other(code) => code,
        }
    }

    pub fn from_u32(code: u32) -> Self {
        match code {
            1 => ErrorCode::UnknownCommand,
            2 => ErrorCode::TooBig,
            3 => ErrorCode::WrongType,
            4 => ErrorCode::BadArgument,
            5 => ErrorCode::WrongArity,
            other => ErrorCode::Other(other),
        }
    }
}

/// A response value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Err { code: ErrorCode, message: String },
    Str(Vec<u8>),
    Int(i64),
    Dbl(f64),
    Arr(Vec<Value>),
}

impl Value {
    /// Build an `Err` value
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Value::Err {
            code,
            message: message.into(),
        }
    }

    /// Build a `Str` value
    pub fn str(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Str(bytes.into())
    }

    pub fn tag(&self) -> Tag {
        match self {
            Value::Nil => Tag::Nil,
            Value::Err { .. } => Tag::Err,
            Value::Str(_) => Tag::Str,
            Value::Int(_) => Tag::Int,
            Value::Dbl(_) => Tag::Dbl,
            Value::Arr(_) => Tag::Arr,
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self, Value::Err { .. })
    }
}

/// Renders the form printed by the CLI:
///
/// ```text
/// (arr) len=2
/// (str) n2
/// (dbl) 2
/// (arr) end
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "(nil)"),
            Value::Err { code, message } => write!(f, "(err) {} {}", code.as_u32(), message),
            Value::Str(bytes) => write!(f, "(str) {}", String::from_utf8_lossy(bytes)),
            Value::Int(n) => write!(f, "(int) {}", n),
            Value::Dbl(n) => write!(f, "(dbl) {}", n),
            Value::Arr(items) => {
                write!(f, "(arr) len={}", items.len())?;
                for item in items {
                    write!(f, "\n{}", item)?;
                }
                write!(f, "\n(arr) end")
            }
        }
    }
}
