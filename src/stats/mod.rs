pub mod assembler;
pub mod handlers;
pub mod ranking;
pub mod service;

mod errors;
pub mod models;
pub mod repository;

pub use errors::StatsError;
pub use models::*;
pub use ranking::{Ranking, RankingEntry};
pub use repository::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository};
pub use service::StatsService;

/// An entity that can be placed in a ranking.
///
/// The id joins the entity to its facts, the tie-break key orders entities
/// whose scores are equal. Keys must be unique within one population.
pub trait Rankable {
    type Key: Ord + Clone;

    fn id(&self) -> i64;

    fn tie_break_key(&self) -> Self::Key;
}

impl Rankable for UserIdentity {
    type Key = String;

    fn id(&self) -> i64 {
        self.id
    }

    fn tie_break_key(&self) -> String {
        self.name.clone()
    }
}

impl Rankable for LivestreamIdentity {
    type Key = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn tie_break_key(&self) -> i64 {
        self.id
    }
}
