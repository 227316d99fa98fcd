use tracing::error;

use super::super::StatsError;
use super::sorter::{Ranking, RankingEntry};

impl<K: Ord + Clone + std::fmt::Debug> Ranking<K> {
    /// 1-based rank of `key`, where rank 1 is the tail of the ascending
    /// sequence. Equal scores never share a rank: the larger key wins.
    pub fn rank_of(&self, key: &K) -> Result<i64, StatsError> {
        let mut rank: i64 = 1;
        for entry in self.entries.iter().rev() {
            if &entry.key == key {
                return Ok(rank);
            }
            rank += 1;
        }

        error!(?key, population = self.entries.len(), "Rank requested for key outside ranking");
        Err(StatsError::Precondition(format!(
            "key {:?} is not part of the ranked population",
            key
        )))
    }

    /// Best-first iterator of `(rank, entry)` pairs.
    pub fn ranked(&self) -> impl Iterator<Item = (i64, &RankingEntry<K>)> {
        self.entries
            .iter()
            .rev()
            .enumerate()
            .map(|(index, entry)| (index as i64 + 1, entry))
    }
}
