//! Sorted set
//!
//! Members are unique byte strings, each with an `f64` score. Two indexes are
//! kept in step:
//! - a hash map from member to score, for O(1) `score` lookups
//! - an [`OrderStatTree`] over `(score, member)`, for ordered rank queries
//!
//! Both indexes share the member bytes through an `Arc<[u8]>`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use super::avl::OrderStatTree;

/// Ordering key of the index: score first, then member bytes.
///
/// Scores are never NaN (the command layer rejects them), which makes the
/// comparison a total order.
#[derive(Debug, Clone)]
pub struct ScoreKey {
    pub score: f64,
    pub member: Arc<[u8]>,
}

impl ScoreKey {
    pub fn new(score: f64, member: impl Into<Arc<[u8]>>) -> Self {
        Self {
            score,
            member: member.into(),
        }
    }
}

impl Ord for ScoreKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Equal) | None => self.member.cmp(&other.member),
            Some(ord) => ord,
        }
    }
}

impl PartialOrd for ScoreKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoreKey {}

/// A set of scored members ordered by `(score, member)`
#[derive(Debug, Default)]
pub struct SortedSet {
    index: OrderStatTree<ScoreKey>,
    scores: HashMap<Arc<[u8]>, f64>,
}

impl SortedSet {
    /// Create an empty sorted set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Add `member` or move it to a new score.
    ///
    /// Returns `true` only when the member was not present before.
    pub fn add(&mut self, member: &[u8], score: f64) -> bool {
        if let Some((name, old)) = self.scores.get_key_value(member) {
            let (name, old) = (Arc::clone(name), *old);
            if old != score {
                self.index.remove(&ScoreKey::new(old, Arc::clone(&name)));
                self.index.insert(ScoreKey::new(score, Arc::clone(&name)));
                self.scores.insert(name, score);
            }
            return false;
        }

        let name: Arc<[u8]> = Arc::from(member);
        self.index.insert(ScoreKey::new(score, Arc::clone(&name)));
        self.scores.insert(name, score);
        true
    }

    /// Score of `member`, if present
    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    /// Remove `member`; returns whether it was present
    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.scores.remove_entry(member) {
            Some((name, score)) => {
                self.index.remove(&ScoreKey::new(score, name));
                true
            }
            None => false,
        }
    }

    /// Seek-and-scan range query.
    ///
    /// Positions at the first member `>= (score, member)`, skips `offset`
    /// further members and yields at most `limit` `(member, score)` pairs in
    /// ascending order.
    pub fn range(
        &self,
        score: f64,
        member: &[u8],
        offset: usize,
        limit: usize,
    ) -> impl Iterator<Item = (&[u8], f64)> + '_ {
        let (seek_rank, _) = self.index.lower_bound(&ScoreKey::new(score, member));
        let start = seek_rank.saturating_add(offset);
        self.index
            .iter_from(start)
            .take(limit)
            .map(|key| (&key.member[..], key.score))
    }

    /// Rank of `member` in ascending order, if present
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = self.score(member)?;
        let (rank, found) = self.index.lower_bound(&ScoreKey::new(score, member));
        found.map(|_| rank)
    }

    /// All members in ascending `(score, member)` order
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], f64)> + '_ {
        self.index.iter().map(|key| (&key.member[..], key.score))
    }
}
