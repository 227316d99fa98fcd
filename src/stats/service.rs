use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::{
    assembler::{assemble_livestream_statistics, assemble_user_statistics},
    repository::StatsRepository,
    LivestreamStatistics, StatsError, UserStatistics,
};

/// Computes statistics from a fresh snapshot on every call. Nothing is cached
/// between requests.
pub struct StatsService {
    repository: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn StatsRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn compute_user_statistics(
        &self,
        username: &str,
    ) -> Result<UserStatistics, StatsError> {
        let snapshot = self
            .repository
            .user_snapshot(username)
            .await?
            .ok_or_else(|| {
                StatsError::NotFound("not found user that has the given username".to_string())
            })?;

        debug!(population = snapshot.users.len(), "Ranking users");
        let stats = assemble_user_statistics(&snapshot)?;

        info!(username = %username, rank = stats.rank, "User statistics computed");
        Ok(stats)
    }

    #[instrument(skip(self))]
    pub async fn compute_livestream_statistics(
        &self,
        livestream_id: i64,
    ) -> Result<LivestreamStatistics, StatsError> {
        let snapshot = self
            .repository
            .livestream_snapshot(livestream_id)
            .await?
            .ok_or_else(|| {
                StatsError::NotFound("cannot get stats of not found livestream".to_string())
            })?;

        debug!(population = snapshot.livestreams.len(), "Ranking livestreams");
        let stats = assemble_livestream_statistics(&snapshot)?;

        info!(livestream_id, rank = stats.rank, "Livestream statistics computed");
        Ok(stats)
    }
}
