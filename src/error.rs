//! Error types for RankKV
//!
//! Provides a unified error type for all operations. Command-level errors
//! (the ones a client caused) carry a wire [`ErrorCode`] and are sent back
//! as `Err` responses; everything else is a transport or setup failure.

use thiserror::Error;

use crate::protocol::ErrorCode;

/// Result type alias using RankError
pub type Result<T> = std::result::Result<T, RankError>;

/// Unified error type for RankKV operations
#[derive(Debug, Error)]
pub enum RankError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Command Errors (reported to the client, never fatal)
    // -------------------------------------------------------------------------
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{command}': expected {expected}, got {got}")]
    WrongArity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{0}")]
    WrongType(&'static str),

    #[error("{0}")]
    BadArgument(&'static str),

    #[error("response too big")]
    TooBig,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RankError {
    /// Wire error code for errors that are answered with an `Err` response.
    ///
    /// Returns `None` for transport failures, which close the connection
    /// instead.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            RankError::UnknownCommand(_) => Some(ErrorCode::UnknownCommand),
            RankError::WrongArity { .. } => Some(ErrorCode::WrongArity),
            RankError::WrongType(_) => Some(ErrorCode::WrongType),
            RankError::BadArgument(_) => Some(ErrorCode::BadArgument),
            RankError::TooBig => Some(ErrorCode::TooBig),
            RankError::Io(_)
            | RankError::Network(_)
            | RankError::Protocol(_)
            | RankError::Config(_) => None,
        }
    }
}
