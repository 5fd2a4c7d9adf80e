//! Store Module
//!
//! In-memory data structures behind the engine.
//!
//! ## Responsibilities
//! - Map keys to values of a fixed kind (scalar or sorted set)
//! - Keep sorted sets ordered by `(score, member)` with rank queries
//!
//! ## Data Structure Choice
//! - Keyspace: `HashMap`, since `keys` order is unspecified
//! - Sorted set: hash map for member lookups plus an arena-backed
//!   order-statistics AVL tree for `O(log n)` seek-by-value and rank offset

mod avl;
mod keyspace;
mod zset;

pub use avl::{Iter, OrderStatTree};
pub use keyspace::Keyspace;
pub use zset::{ScoreKey, SortedSet};

/// Value stored under a key
#[derive(Debug)]
pub enum Entry {
    /// A plain byte string
    Scalar(Vec<u8>),

    /// A sorted set
    ZSet(SortedSet),
}
