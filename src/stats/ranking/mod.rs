pub mod aggregator;
pub mod resolver;
pub mod sorter;

pub use aggregator::aggregate_scores;
pub use sorter::{compare_entries, Ranking, RankingEntry};
