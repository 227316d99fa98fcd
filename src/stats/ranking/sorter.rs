use std::cmp::Ordering;

use super::super::{Rankable, ScoreMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry<K> {
    pub key: K,
    pub score: i64,
}

impl<K> RankingEntry<K> {
    pub fn new(key: K, score: i64) -> Self {
        Self { key, score }
    }
}

/// Ascending by score, then ascending by tie-break key.
pub fn compare_entries<K: Ord>(a: &RankingEntry<K>, b: &RankingEntry<K>) -> Ordering {
    a.score.cmp(&b.score).then_with(|| a.key.cmp(&b.key))
}

/// Whole population of one entity kind, sorted ascending by
/// [`compare_entries`]. The best entity sits at the tail.
#[derive(Debug, Clone)]
pub struct Ranking<K> {
    pub(super) entries: Vec<RankingEntry<K>>,
}

impl<K: Ord + Clone> Ranking<K> {
    /// Builds the ranking with one entry per entity. Entities missing from
    /// `scores` rank with a score of zero.
    pub fn build<E>(population: &[E], scores: &ScoreMap) -> Self
    where
        E: Rankable<Key = K>,
    {
        let mut entries: Vec<RankingEntry<K>> = population
            .iter()
            .map(|entity| {
                let score = scores.get(&entity.id()).copied().unwrap_or_default();
                RankingEntry::new(entity.tie_break_key(), score)
            })
            .collect();

        entries.sort_unstable_by(compare_entries);

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending order, worst first.
    pub fn entries(&self) -> &[RankingEntry<K>] {
        &self.entries
    }
}
