//! Engine Module
//!
//! The command dispatcher in front of the keyspace.
//!
//! ## Responsibilities
//! - Validate raw requests into commands (arity, numeric arguments)
//! - Run each command against the keyspace inside one critical section
//! - Translate results and command errors into response values

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Command, ErrorCode, Request, Value};
use crate::store::Keyspace;

/// The data engine
///
/// ## Concurrency Model
///
/// Every command holds `keyspace` for its whole duration, so commands from
/// concurrent connections are fully serialized. No command blocks or does
/// I/O, which keeps the critical section short.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// All keys and values
    keyspace: Mutex<Keyspace>,
}

impl Engine {
    /// Create an engine with an empty keyspace
    pub fn new(config: Config) -> Self {
        Self {
            config,
            keyspace: Mutex::new(Keyspace::new()),
        }
    }

    /// Validate and run a raw request, always producing a response value.
    ///
    /// Command errors become `Err` values; the keyspace is never touched
    /// when validation fails.
    pub fn handle(&self, request: Request) -> Value {
        match Command::parse(request).and_then(|command| self.execute(command)) {
            Ok(value) => value,
            Err(e) => {
                let code = e.code().unwrap_or(ErrorCode::UnknownCommand);
                Value::error(code, e.to_string())
            }
        }
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Value> {
        let mut keyspace = self.keyspace.lock();

        let value = match command {
            Command::Get { key } => match keyspace.get(&key) {
                Some(value) => Value::str(value),
                None => Value::Nil,
            },
            Command::Set { key, value } => {
                keyspace.set(&key, value)?;
                Value::Nil
            }
            Command::Del { key } => Value::Int(keyspace.del(&key) as i64),
            Command::Keys => Value::Arr(keyspace.keys().map(Value::str).collect()),
            Command::ZAdd { key, score, member } => {
                Value::Int(keyspace.zadd(&key, score, &member)? as i64)
            }
            Command::ZScore { key, member } => match keyspace.zscore(&key, &member) {
                Some(score) => Value::Dbl(score),
                None => Value::Nil,
            },
            Command::ZRem { key, member } => Value::Int(keyspace.zrem(&key, &member) as i64),
            Command::ZQuery {
                key,
                score,
                member,
                offset,
                limit,
            } => Value::Arr(
                keyspace
                    .zquery(&key, score, &member, offset, limit)
                    .into_iter()
                    .flat_map(|(name, score)| [Value::Str(name), Value::Dbl(score)])
                    .collect(),
            ),
        };

        Ok(value)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of keys currently stored
    pub fn key_count(&self) -> usize {
        self.keyspace.lock().len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
