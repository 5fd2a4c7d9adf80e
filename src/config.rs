//! Configuration for RankKV
//!
//! Centralized configuration with sensible defaults.

use crate::error::{RankError, Result};

/// Main configuration for a RankKV server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Limits
    // -------------------------------------------------------------------------
    /// Largest accepted request body and largest emitted response body (bytes)
    pub max_message_size: usize,

    /// Largest number of arguments in one request
    pub max_args: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:6379".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_message_size: 32 << 20, // 32 MB
            max_args: 200_000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(RankError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        // Smallest useful body: the argument count plus one length prefix.
        if self.max_message_size < 8 {
            return Err(RankError::Config(format!(
                "max_message_size too small: {} bytes (min 8)",
                self.max_message_size
            )));
        }
        if self.max_args == 0 {
            return Err(RankError::Config("max_args must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the request/response body limit (in bytes)
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.config.max_message_size = bytes;
        self
    }

    /// Set the per-request argument limit
    pub fn max_args(mut self, count: usize) -> Self {
        self.config.max_args = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
