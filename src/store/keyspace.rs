//! Keyspace
//!
//! The flat key → value map holding scalars and sorted sets.

use std::collections::HashMap;

use crate::error::{RankError, Result};

use super::{Entry, SortedSet};

/// All data of one store instance.
///
/// Not synchronized; the engine serializes access.
#[derive(Debug, Default)]
pub struct Keyspace {
    entries: HashMap<Vec<u8>, Entry>,
}

impl Keyspace {
    /// Create an empty keyspace
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Scalar operations
    // =========================================================================

    /// Scalar value of `key`; `None` if absent or a sorted set
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        match self.entries.get(key)? {
            Entry::Scalar(value) => Some(value.as_slice()),
            Entry::ZSet(_) => None,
        }
    }

    /// Insert or overwrite a scalar.
    ///
    /// Fails with `WrongType` if `key` holds a sorted set.
    pub fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        match self.entries.get_mut(key) {
            Some(Entry::Scalar(existing)) => *existing = value,
            Some(Entry::ZSet(_)) => return Err(RankError::WrongType("expect string")),
            None => {
                self.entries.insert(key.to_vec(), Entry::Scalar(value));
            }
        }
        Ok(())
    }

    /// Remove a key of either kind; returns whether it existed
    pub fn del(&mut self, key: &[u8]) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Every key currently present, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.entries.keys().map(|key| key.as_slice())
    }

    // =========================================================================
    // Sorted-set operations
    // =========================================================================

    /// Add or re-score `member` in the sorted set at `key`, creating it if
    /// needed. Returns `true` if the member is new.
    pub fn zadd(&mut self, key: &[u8], score: f64, member: &[u8]) -> Result<bool> {
        match self.entries.get_mut(key) {
            Some(Entry::ZSet(zset)) => Ok(zset.add(member, score)),
            Some(Entry::Scalar(_)) => Err(RankError::WrongType("expect zset")),
            None => {
                let mut zset = SortedSet::new();
                zset.add(member, score);
                self.entries.insert(key.to_vec(), Entry::ZSet(zset));
                Ok(true)
            }
        }
    }

    /// Sorted set at `key`, if `key` holds one
    pub fn zset(&self, key: &[u8]) -> Option<&SortedSet> {
        match self.entries.get(key)? {
            Entry::ZSet(zset) => Some(zset),
            Entry::Scalar(_) => None,
        }
    }

    /// Score of `member`; `None` if the key is absent, not a sorted set, or
    /// lacks the member
    pub fn zscore(&self, key: &[u8], member: &[u8]) -> Option<f64> {
        self.zset(key)?.score(member)
    }

    /// Remove `member`; returns whether it was removed.
    ///
    /// A sorted set left empty is deleted together with its key.
    pub fn zrem(&mut self, key: &[u8], member: &[u8]) -> bool {
        let Some(Entry::ZSet(zset)) = self.entries.get_mut(key) else {
            return false;
        };
        let removed = zset.remove(member);
        if zset.is_empty() {
            self.entries.remove(key);
        }
        removed
    }

    /// Seek-and-scan query (see [`SortedSet::range`]); empty for an absent
    /// or scalar key
    pub fn zquery(
        &self,
        key: &[u8],
        score: f64,
        member: &[u8],
        offset: usize,
        limit: usize,
    ) -> Vec<(Vec<u8>, f64)> {
        match self.zset(key) {
            Some(zset) => zset
                .range(score, member, offset, limit)
                .map(|(name, score)| (name.to_vec(), score))
                .collect(),
            None => Vec::new(),
        }
    }
}
