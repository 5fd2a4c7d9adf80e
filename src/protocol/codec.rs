//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol. All integers are
//! little-endian.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬─────┬──────────┬──────────┐
//! │ Len (4)  │ NArgs(4) │ Len1 (4) │  Arg 1   │ ... │ LenN (4) │  Arg N   │
//! └──────────┴──────────┴──────────┴──────────┴─────┴──────────┴──────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │        Value                │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Value Format
//! ```text
//!  nil       int64           str                   array
//! ┌─────┐   ┌─────┬─────┐   ┌─────┬─────┬─────┐   ┌─────┬─────┬─────┐
//! │ tag │   │ tag │ int │   │ tag │ len │ ... │   │ tag │ len │ ... │
//! └─────┘   └─────┴─────┘   └─────┴─────┴─────┘   └─────┴─────┴─────┘
//!    1B        1B    8B        1B    4B   ...        1B    4B   ...
//! ```
//! `dbl` is laid out like `int` (8 bytes of IEEE-754), and `err` is
//! `tag | code (4) | len (4) | message`.

use std::io::{Read, Write};

use bytes::{Buf, BufMut};

use super::{ErrorCode, Request, Tag, Value};
use crate::config::Config;
use crate::error::{RankError, Result};

/// Frame header size: 4 bytes body length
pub const HEADER_SIZE: usize = 4;

/// Deepest array nesting accepted when decoding
pub const MAX_NESTING: usize = 64;

/// Size limits applied while framing
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Largest request or response body (bytes)
    pub max_message_size: usize,

    /// Largest argument count in one request
    pub max_args: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for Limits {
    fn from(config: &Config) -> Self {
        Self {
            max_message_size: config.max_message_size,
            max_args: config.max_args,
        }
    }
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: body_len (4) + nargs (4) + { arg_len (4) + arg }*
pub fn encode_request(request: &Request) -> Vec<u8> {
    let body_len = 4 + request.args.iter().map(|a| 4 + a.len()).sum::<usize>();

    let mut message = Vec::with_capacity(HEADER_SIZE + body_len);
    message.put_u32_le(body_len as u32);
    message.put_u32_le(request.args.len() as u32);
    for arg in &request.args {
        message.put_u32_le(arg.len() as u32);
        message.put_slice(arg);
    }

    message
}

/// Decode a request from a complete frame (header included)
pub fn decode_request(bytes: &[u8], limits: &Limits) -> Result<Request> {
    let body = frame_body(bytes, limits, "request")?;
    parse_request_body(body, limits)
}

/// Parse a request body (everything after the length header)
fn parse_request_body(mut body: &[u8], limits: &Limits) -> Result<Request> {
    let nargs = take_u32(&mut body, "argument count")? as usize;
    if nargs > limits.max_args {
        return Err(RankError::Protocol(format!(
            "Too many arguments: {} (max {})",
            nargs, limits.max_args
        )));
    }

    // each argument needs at least its 4-byte length
    let mut args = Vec::with_capacity(nargs.min(body.remaining() / 4));
    for _ in 0..nargs {
        let len = take_u32(&mut body, "argument length")? as usize;
        args.push(take_bytes(&mut body, len, "argument")?);
    }

    if body.has_remaining() {
        return Err(RankError::Protocol(format!(
            "Trailing bytes after request: {}",
            body.remaining()
        )));
    }

    Ok(Request::new(args))
}

// =============================================================================
// Value Encoding/Decoding
// =============================================================================

/// Append the encoding of `value` to `buf`
pub fn encode_value<B: BufMut>(buf: &mut B, value: &Value) {
    buf.put_u8(value.tag() as u8);
    match value {
        Value::Nil => {}
        Value::Err { code, message } => {
            buf.put_u32_le(code.as_u32());
            buf.put_u32_le(message.len() as u32);
            buf.put_slice(message.as_bytes());
        }
        Value::Str(bytes) => {
            buf.put_u32_le(bytes.len() as u32);
            buf.put_slice(bytes);
        }
        Value::Int(n) => buf.put_i64_le(*n),
        Value::Dbl(n) => buf.put_f64_le(*n),
        Value::Arr(items) => {
            buf.put_u32_le(items.len() as u32);
            for item in items {
                encode_value(buf, item);
            }
        }
    }
}

/// Decode one value from the front of `bytes`
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_value(bytes: &[u8]) -> Result<(Value, usize)> {
    let mut cur = bytes;
    let value = read_value(&mut cur, 0)?;
    Ok((value, bytes.len() - cur.remaining()))
}

fn read_value(cur: &mut &[u8], depth: usize) -> Result<Value> {
    if depth > MAX_NESTING {
        return Err(RankError::Protocol(format!(
            "Value nested deeper than {}",
            MAX_NESTING
        )));
    }
    if !cur.has_remaining() {
        return Err(RankError::Protocol("Missing value tag".to_string()));
    }

    let tag_byte = cur.get_u8();
    let tag = Tag::from_u8(tag_byte).ok_or_else(|| {
        RankError::Protocol(format!("Unknown value tag: 0x{:02x}", tag_byte))
    })?;

    let value = match tag {
        Tag::Nil => Value::Nil,
        Tag::Err => {
            let code = ErrorCode::from_u32(take_u32(cur, "error code")?);
            let len = take_u32(cur, "error length")? as usize;
            let message = take_bytes(cur, len, "error message")?;
            Value::Err {
                code,
                message: String::from_utf8_lossy(&message).into_owned(),
            }
        }
        Tag::Str => {
            let len = take_u32(cur, "string length")? as usize;
            Value::Str(take_bytes(cur, len, "string")?)
        }
        Tag::Int => {
            ensure(cur, 8, "int")?;
            Value::Int(cur.get_i64_le())
        }
        Tag::Dbl => {
            ensure(cur, 8, "double")?;
            Value::Dbl(cur.get_f64_le())
        }
        Tag::Arr => {
            let n = take_u32(cur, "array length")? as usize;
            // every element needs at least its tag byte
            let mut items = Vec::with_capacity(n.min(cur.remaining()));
            for _ in 0..n {
                items.push(read_value(cur, depth + 1)?);
            }
            Value::Arr(items)
        }
    };

    Ok(value)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response frame
///
/// A body larger than `max_message_size` is replaced by a `TooBig` error.
pub fn encode_response(value: &Value, max_message_size: usize) -> Vec<u8> {
    let mut message = Vec::with_capacity(64);
    message.put_u32_le(0); // patched below
    encode_value(&mut message, value);

    if message.len() - HEADER_SIZE > max_message_size {
        message.truncate(HEADER_SIZE);
        encode_value(
            &mut message,
            &Value::error(ErrorCode::TooBig, RankError::TooBig.to_string()),
        );
    }

    let body_len = (message.len() - HEADER_SIZE) as u32;
    message[..HEADER_SIZE].copy_from_slice(&body_len.to_le_bytes());
    message
}

/// Decode a response from a complete frame (header included)
pub fn decode_response(bytes: &[u8], limits: &Limits) -> Result<Value> {
    let body = frame_body(bytes, limits, "response")?;
    parse_response_body(body)
}

fn parse_response_body(body: &[u8]) -> Result<Value> {
    let (value, used) = decode_value(body)?;
    if used != body.len() {
        return Err(RankError::Protocol(format!(
            "Trailing bytes after response: {}",
            body.len() - used
        )));
    }
    Ok(value)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete request is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R, limits: &Limits) -> Result<Request> {
    let body = read_frame(reader, limits, "request")?;
    parse_request_body(&body, limits)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R, limits: &Limits) -> Result<Value> {
    let body = read_frame(reader, limits, "response")?;
    parse_response_body(&body)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, value: &Value, limits: &Limits) -> Result<()> {
    let bytes = encode_response(value, limits.max_message_size);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Read the length header and the body it announces
fn read_frame<R: Read>(reader: &mut R, limits: &Limits, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let body_len = u32::from_le_bytes(header) as usize;
    check_body_len(body_len, limits, what)?;

    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body)?;
    Ok(body)
}

/// Validate a complete in-memory frame and return its body
fn frame_body<'a>(bytes: &'a [u8], limits: &Limits, what: &str) -> Result<&'a [u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(RankError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let body_len = header.get_u32_le() as usize;
    check_body_len(body_len, limits, what)?;

    let total_len = HEADER_SIZE + body_len;
    if bytes.len() != total_len {
        return Err(RankError::Protocol(format!(
            "Bad {} frame: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok(&bytes[HEADER_SIZE..])
}

fn check_body_len(body_len: usize, limits: &Limits, what: &str) -> Result<()> {
    if body_len > limits.max_message_size {
        return Err(RankError::Protocol(format!(
            "{} too large: {} bytes (max {})",
            what, body_len, limits.max_message_size
        )));
    }
    Ok(())
}

fn ensure(cur: &&[u8], n: usize, what: &str) -> Result<()> {
    if cur.remaining() < n {
        return Err(RankError::Protocol(format!(
            "Incomplete {}: expected {} bytes, got {}",
            what,
            n,
            cur.remaining()
        )));
    }
    Ok(())
}

fn take_u32(cur: &mut &[u8], what: &str) -> Result<u32> {
    ensure(cur, 4, what)?;
    Ok(cur.get_u32_le())
}

fn take_bytes(cur: &mut &[u8], len: usize, what: &str) -> Result<Vec<u8>> {
    ensure(cur, len, what)?;
    let bytes = cur[..len].to_vec();
    cur.advance(len);
    Ok(bytes)
}
