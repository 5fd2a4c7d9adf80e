//! Command definitions
//!
//! A request is an ordered list of byte-string arguments; the first names
//! the command. [`Command::parse`] validates arity and argument types so that
//! execution never sees a malformed command.

use crate::error::{RankError, Result};

/// Raw request: command name followed by its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub args: Vec<Vec<u8>>,
}

impl Request {
    pub fn new(args: Vec<Vec<u8>>) -> Self {
        Self { args }
    }

    /// Build a request from string-like arguments
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self {
            args: parts.into_iter().map(|p| p.as_ref().to_vec()).collect(),
        }
    }
}

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Set,
    Del,
    Keys,
    ZAdd,
    ZScore,
    ZRem,
    ZQuery,
}

impl CommandType {
    /// Look up a command by its (case-sensitive) name
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"get" => Some(CommandType::Get),
            b"set" => Some(CommandType::Set),
            b"del" => Some(CommandType::Del),
            b"keys" => Some(CommandType::Keys),
            b"zadd" => Some(CommandType::ZAdd),
            b"zscore" => Some(CommandType::ZScore),
            b"zrem" => Some(CommandType::ZRem),
            b"zquery" => Some(CommandType::ZQuery),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandType::Get => "get",
            CommandType::Set => "set",
            CommandType::Del => "del",
            CommandType::Keys => "keys",
            CommandType::ZAdd => "zadd",
            CommandType::ZScore => "zscore",
            CommandType::ZRem => "zrem",
            CommandType::ZQuery => "zquery",
        }
    }

    /// Number of arguments after the command name
    pub fn arity(self) -> usize {
        match self {
            CommandType::Keys => 0,
            CommandType::Get | CommandType::Del => 1,
            CommandType::Set | CommandType::ZScore | CommandType::ZRem => 2,
            CommandType::ZAdd => 3,
            CommandType::ZQuery => 5,
        }
    }
}

/// A validated command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Read a scalar
    Get { key: Vec<u8> },

    /// Write a scalar
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Remove a key of either kind
    Del { key: Vec<u8> },

    /// List all keys
    Keys,

    /// Add or re-score a sorted-set member
    ZAdd {
        key: Vec<u8>,
        score: f64,
        member: Vec<u8>,
    },

    /// Read a member's score
    ZScore { key: Vec<u8>, member: Vec<u8> },

    /// Remove a member
    ZRem { key: Vec<u8>, member: Vec<u8> },

    /// Seek to `(score, member)`, skip `offset`, return up to `limit` pairs
    ZQuery {
        key: Vec<u8>,
        score: f64,
        member: Vec<u8>,
        offset: usize,
        limit: usize,
    },
}

impl Command {
    /// Validate a raw request.
    ///
    /// Fails with `UnknownCommand`, `WrongArity` or `BadArgument`; no
    /// numeric argument is ever silently defaulted.
    pub fn parse(request: Request) -> Result<Self> {
        let mut args = request.args.into_iter();
        let name = args.next().unwrap_or_default();
        let command_type = CommandType::from_name(&name).ok_or_else(|| {
            RankError::UnknownCommand(String::from_utf8_lossy(&name).into_owned())
        })?;

        let args: Vec<Vec<u8>> = args.collect();
        if args.len() != command_type.arity() {
            return Err(RankError::WrongArity {
                command: command_type.name(),
                expected: command_type.arity(),
                got: args.len(),
            });
        }

        // arity was checked, so every `next()` below yields a real argument
        let mut args = args.into_iter();
        let mut next = || args.next().unwrap_or_default();

        let command = match command_type {
            CommandType::Get => Command::Get { key: next() },
            CommandType::Set => Command::Set {
                key: next(),
                value: next(),
            },
            CommandType::Del => Command::Del { key: next() },
            CommandType::Keys => Command::Keys,
            CommandType::ZAdd => Command::ZAdd {
                key: next(),
                score: parse_score(&next())?,
                member: next(),
            },
            CommandType::ZScore => Command::ZScore {
                key: next(),
                member: next(),
            },
            CommandType::ZRem => Command::ZRem {
                key: next(),
                member: next(),
            },
            CommandType::ZQuery => Command::ZQuery {
                key: next(),
                score: parse_score(&next())?,
                member: next(),
                offset: parse_count(&next())?,
                limit: parse_count(&next())?,
            },
        };

        Ok(command)
    }

    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Set { .. } => CommandType::Set,
            Command::Del { .. } => CommandType::Del,
            Command::Keys => CommandType::Keys,
            Command::ZAdd { .. } => CommandType::ZAdd,
            Command::ZScore { .. } => CommandType::ZScore,
            Command::ZRem { .. } => CommandType::ZRem,
            Command::ZQuery { .. } => CommandType::ZQuery,
        }
    }

    /// Render back into a raw request (used by clients)
    pub fn to_request(&self) -> Request {
        let name = self.command_type().name().as_bytes().to_vec();
        let mut args = vec![name];
        match self {
            Command::Get { key } | Command::Del { key } => args.push(key.clone()),
            Command::Set { key, value } => args.extend([key.clone(), value.clone()]),
            Command::Keys => {}
            Command::ZAdd { key, score, member } => {
                args.extend([key.clone(), score.to_string().into_bytes(), member.clone()])
            }
            Command::ZScore { key, member } | Command::ZRem { key, member } => {
                args.extend([key.clone(), member.clone()])
            }
            Command::ZQuery {
                key,
                score,
                member,
                offset,
                limit,
            } => args.extend([
                key.clone(),
                score.to_string().into_bytes(),
                member.clone(),
                offset.to_string().into_bytes(),
                limit.to_string().into_bytes(),
            ]),
        }
        Request::new(args)
    }
}

/// Decimal floating point; NaN is refused because it has no place in the
/// ordering.
fn parse_score(arg: &[u8]) -> Result<f64> {
    std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|score| !score.is_nan())
        .ok_or(RankError::BadArgument("expect fp number"))
}

/// Non-negative decimal integer
fn parse_count(arg: &[u8]) -> Result<usize> {
    let value = std::str::from_utf8(arg)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(RankError::BadArgument("expect int"))?;
    usize::try_from(value).map_err(|_| RankError::BadArgument("expect non-negative int"))
}
