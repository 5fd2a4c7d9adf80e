//! # RankKV
//!
//! An in-memory data store served over a typed binary protocol, with:
//! - A flat key → string namespace
//! - Named sorted sets ordered by `(score, member)`
//! - Rank-based range queries backed by an order-statistics AVL tree
//! - TCP server, blocking client and CLI
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │               (one thread per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ request frames
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Wire Codec                                │
//! │         (length-prefixed args / tagged values)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Engine (dispatcher)                          │
//! │        (validate, then run under one global Mutex)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                ┌──────▼──────┐
//!                │  Keyspace   │
//!                │  (HashMap)  │
//!                └──┬───────┬──┘
//!                   │       │
//!                   ▼       ▼
//!            ┌────────┐ ┌───────────────────┐
//!            │ Scalar │ │    SortedSet      │
//!            └────────┘ │ (hash + AVL rank) │
//!                       └───────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod engine;
pub mod network;
pub mod protocol;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use engine::Engine;
pub use error::{RankError, Result};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of RankKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
