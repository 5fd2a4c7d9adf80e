//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬──────────────────────────────────┐
//! │ Len (4)  │ NArgs(4) │ NArgs × (Len (4) + Arg bytes)    │
//! └──────────┴──────────┴──────────────────────────────────┘
//! ```
//!
//! ### Commands
//! - `get key`, `set key value`, `del key`, `keys`
//! - `zadd key score member`, `zscore key member`, `zrem key member`
//! - `zquery key score member offset limit`
//!
//! ### Response Format
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (4)  │ Tagged value                │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! ### Value Tags
//! - 0x00: NIL
//! - 0x01: ERR (code + message)
//! - 0x02: STR
//! - 0x03: INT
//! - 0x04: DBL
//! - 0x05: ARR

mod codec;
mod command;
mod value;

pub use codec::{
    decode_request, decode_response, decode_value, encode_request, encode_response,
    encode_value, read_request, read_response, write_request, write_response, Limits,
    HEADER_SIZE, MAX_NESTING,
};
pub use command::{Command, CommandType, Request};
pub use value::{ErrorCode, Tag, Value};
