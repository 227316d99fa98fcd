use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    EmojiCount, LivestreamIdentity, LivestreamStatsSnapshot, ScoreMap, StatsError, UserIdentity,
    UserStatsSnapshot,
};

/// Read side of the statistics engine. Each call returns facts taken from a
/// single consistent view, or `None` when the target does not exist.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn user_snapshot(&self, username: &str) -> Result<Option<UserStatsSnapshot>, StatsError>;

    async fn livestream_snapshot(
        &self,
        livestream_id: i64,
    ) -> Result<Option<LivestreamStatsSnapshot>, StatsError>;
}

#[derive(Debug, Clone)]
struct LivestreamRecord {
    id: i64,
    owner_id: i64,
}

#[derive(Debug, Clone)]
struct ReactionRecord {
    livestream_id: i64,
    emoji_name: String,
}

#[derive(Debug, Clone)]
struct LivecommentRecord {
    livestream_id: i64,
    tip: i64,
}

#[derive(Debug, Default)]
struct FactTables {
    users: Vec<UserIdentity>,
    livestreams: Vec<LivestreamRecord>,
    reactions: Vec<ReactionRecord>,
    livecomments: Vec<LivecommentRecord>,
    viewer_history: Vec<i64>,
    reports: Vec<i64>,
}

impl FactTables {
    fn owner_of(&self, livestream_id: i64) -> Option<i64> {
        self.livestreams
            .iter()
            .find(|l| l.id == livestream_id)
            .map(|l| l.owner_id)
    }

    fn user_reaction_counts(&self) -> ScoreMap {
        let mut counts = ScoreMap::new();
        for reaction in &self.reactions {
            if let Some(owner_id) = self.owner_of(reaction.livestream_id) {
                *counts.entry(owner_id).or_default() += 1;
            }
        }
        counts
    }

    fn user_tip_sums(&self) -> ScoreMap {
        let mut sums = ScoreMap::new();
        for comment in &self.livecomments {
            if let Some(owner_id) = self.owner_of(comment.livestream_id) {
                *sums.entry(owner_id).or_default() += comment.tip;
            }
        }
        sums
    }

    fn livestream_reaction_counts(&self) -> ScoreMap {
        let mut counts = ScoreMap::new();
        for reaction in &self.reactions {
            *counts.entry(reaction.livestream_id).or_default() += 1;
        }
        counts
    }

    fn livestream_tip_sums(&self) -> ScoreMap {
        let mut sums = ScoreMap::new();
        for comment in &self.livecomments {
            *sums.entry(comment.livestream_id).or_default() += comment.tip;
        }
        sums
    }

    fn owned_by(&self, user_id: i64, livestream_id: i64) -> bool {
        self.owner_of(livestream_id) == Some(user_id)
    }
}

/// In-memory implementation of StatsRepository for development and testing
///
/// Facts are seeded through the `add_*` helpers and lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStatsRepository {
    tables: Arc<RwLock<FactTables>>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(FactTables::default())),
        }
    }

    pub async fn add_user(&self, id: i64, name: &str) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == id || u.name == name) {
            return Err(StatsError::Repository(format!(
                "user {} ({}) already exists",
                name, id
            )));
        }
        tables.users.push(UserIdentity::new(id, name));
        Ok(())
    }

    pub async fn add_livestream(&self, id: i64, owner_id: i64) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == owner_id) {
            return Err(StatsError::NotFound(format!("user {}", owner_id)));
        }
        if tables.livestreams.iter().any(|l| l.id == id) {
            return Err(StatsError::Repository(format!(
                "livestream {} already exists",
                id
            )));
        }
        tables.livestreams.push(LivestreamRecord { id, owner_id });
        Ok(())
    }

    pub async fn add_reaction(&self, livestream_id: i64, emoji_name: &str) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        ensure_livestream(&tables, livestream_id)?;
        tables.reactions.push(ReactionRecord {
            livestream_id,
            emoji_name: emoji_name.to_string(),
        });
        Ok(())
    }

    pub async fn add_livecomment(&self, livestream_id: i64, tip: i64) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        ensure_livestream(&tables, livestream_id)?;
        tables
            .livecomments
            .push(LivecommentRecord { livestream_id, tip });
        Ok(())
    }

    pub async fn add_viewer(&self, livestream_id: i64) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        ensure_livestream(&tables, livestream_id)?;
        tables.viewer_history.push(livestream_id);
        Ok(())
    }

    pub async fn add_report(&self, livestream_id: i64) -> Result<(), StatsError> {
        let mut tables = self.tables.write().await;
        ensure_livestream(&tables, livestream_id)?;
        tables.reports.push(livestream_id);
        Ok(())
    }
}

fn ensure_livestream(tables: &FactTables, livestream_id: i64) -> Result<(), StatsError> {
    if tables.owner_of(livestream_id).is_none() {
        return Err(StatsError::NotFound(format!(
            "livestream {}",
            livestream_id
        )));
    }
    Ok(())
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    #[instrument(skip(self))]
    async fn user_snapshot(&self, username: &str) -> Result<Option<UserStatsSnapshot>, StatsError> {
        let tables = self.tables.read().await;

        let Some(target) = tables.users.iter().find(|u| u.name == username).cloned() else {
            debug!(username = %username, "User not found in memory");
            return Ok(None);
        };

        let viewers_count = tables
            .viewer_history
            .iter()
            .filter(|livestream_id| tables.owned_by(target.id, **livestream_id))
            .count() as i64;
        let total_livecomments = tables
            .livecomments
            .iter()
            .filter(|c| tables.owned_by(target.id, c.livestream_id))
            .count() as i64;

        let mut emoji_totals: HashMap<&str, i64> = HashMap::new();
        for reaction in &tables.reactions {
            if tables.owned_by(target.id, reaction.livestream_id) {
                *emoji_totals.entry(reaction.emoji_name.as_str()).or_default() += 1;
            }
        }
        let emoji_counts = emoji_totals
            .into_iter()
            .map(|(name, count)| EmojiCount::new(name, count))
            .collect();

        Ok(Some(UserStatsSnapshot {
            users: tables.users.clone(),
            reaction_counts: tables.user_reaction_counts(),
            tip_sums: tables.user_tip_sums(),
            viewers_count,
            total_livecomments,
            emoji_counts,
            target,
        }))
    }

    #[instrument(skip(self))]
    async fn livestream_snapshot(
        &self,
        livestream_id: i64,
    ) -> Result<Option<LivestreamStatsSnapshot>, StatsError> {
        let tables = self.tables.read().await;

        if tables.owner_of(livestream_id).is_none() {
            debug!(livestream_id, "Livestream not found in memory");
            return Ok(None);
        }

        let tips = tables
            .livecomments
            .iter()
            .filter(|c| c.livestream_id == livestream_id)
            .map(|c| c.tip);

        Ok(Some(LivestreamStatsSnapshot {
            target: LivestreamIdentity { id: livestream_id },
            livestreams: tables
                .livestreams
                .iter()
                .map(|l| LivestreamIdentity { id: l.id })
                .collect(),
            reaction_counts: tables.livestream_reaction_counts(),
            tip_sums: tables.livestream_tip_sums(),
            viewers_count: tables
                .viewer_history
                .iter()
                .filter(|id| **id == livestream_id)
                .count() as i64,
            max_tip: tips.max().unwrap_or_default(),
            total_reports: tables.reports.iter().filter(|id| **id == livestream_id).count() as i64,
        }))
    }
}

/// PostgreSQL implementation of stats repository
///
/// Every snapshot is read inside one repeatable-read transaction so that the
/// population and its facts agree with each other.
pub struct PostgresStatsRepository {
    pool: PgPool,
}

impl PostgresStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, StatsError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(fetch_failed("begin transaction"))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(fetch_failed("set isolation level"))?;
        Ok(tx)
    }
}

fn fetch_failed(what: &'static str) -> impl FnOnce(sqlx::Error) -> StatsError {
    move |e| {
        warn!(error = %e, step = what, "Statistics fetch failed");
        StatsError::Repository(format!("failed to {}: {}", what, e))
    }
}

fn into_score_map(rows: Vec<(i64, i64)>) -> ScoreMap {
    rows.into_iter().collect()
}

#[async_trait]
impl StatsRepository for PostgresStatsRepository {
    #[instrument(skip(self))]
    async fn user_snapshot(&self, username: &str) -> Result<Option<UserStatsSnapshot>, StatsError> {
        let mut tx = self.begin_snapshot().await?;

        let target = sqlx::query_as::<_, UserIdentity>("SELECT id, name FROM users WHERE name = $1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(fetch_failed("get user"))?;
        let Some(target) = target else {
            debug!(username = %username, "User not found in database");
            return Ok(None);
        };

        let users = sqlx::query_as::<_, UserIdentity>("SELECT id, name FROM users")
            .fetch_all(&mut *tx)
            .await
            .map_err(fetch_failed("get users"))?;

        let reaction_counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT u.id, COUNT(r.id)
            FROM users u
            INNER JOIN livestreams l ON l.user_id = u.id
            INNER JOIN reactions r ON r.livestream_id = l.id
            GROUP BY u.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(fetch_failed("count reactions"))?;

        let tip_sums = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT u.id, COALESCE(SUM(lc.tip), 0)::BIGINT
            FROM users u
            INNER JOIN livestreams ls ON ls.user_id = u.id
            INNER JOIN livecomments lc ON lc.livestream_id = ls.id
            GROUP BY u.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(fetch_failed("sum tips"))?;

        let total_livecomments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(lc.id) FROM livecomments lc INNER JOIN livestreams ls ON lc.livestream_id = ls.id WHERE ls.user_id = $1",
        )
        .bind(target.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(fetch_failed("count livecomments"))?;

        let viewers_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(lvh.id) FROM livestream_viewers_history lvh INNER JOIN livestreams ls ON lvh.livestream_id = ls.id WHERE ls.user_id = $1",
        )
        .bind(target.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(fetch_failed("count viewers"))?;

        let emoji_counts = sqlx::query_as::<_, EmojiCount>(
            r#"
            SELECT r.emoji_name, COUNT(*) AS count
            FROM livestreams l
            INNER JOIN reactions r ON r.livestream_id = l.id
            WHERE l.user_id = $1
            GROUP BY r.emoji_name
            "#,
        )
        .bind(target.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(fetch_failed("count emoji"))?;

        tx.commit().await.map_err(fetch_failed("commit"))?;

        debug!(
            username = %username,
            population = users.len(),
            "User statistics snapshot loaded from database"
        );

        Ok(Some(UserStatsSnapshot {
            target,
            users,
            reaction_counts: into_score_map(reaction_counts),
            tip_sums: into_score_map(tip_sums),
            viewers_count,
            total_livecomments,
            emoji_counts,
        }))
    }

    #[instrument(skip(self))]
    async fn livestream_snapshot(
        &self,
        livestream_id: i64,
    ) -> Result<Option<LivestreamStatsSnapshot>, StatsError> {
        let mut tx = self.begin_snapshot().await?;

        let target = sqlx::query_as::<_, LivestreamIdentity>("SELECT id FROM livestreams WHERE id = $1")
            .bind(livestream_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(fetch_failed("get livestream"))?;
        let Some(target) = target else {
            debug!(livestream_id, "Livestream not found in database");
            return Ok(None);
        };

        let livestreams = sqlx::query_as::<_, LivestreamIdentity>("SELECT id FROM livestreams")
            .fetch_all(&mut *tx)
            .await
            .map_err(fetch_failed("get livestreams"))?;

        let reaction_counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT l.id, COUNT(r.id)
            FROM livestreams l
            INNER JOIN reactions r ON l.id = r.livestream_id
            GROUP BY l.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(fetch_failed("count reactions"))?;

        let tip_sums = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT l.id, COALESCE(SUM(lc.tip), 0)::BIGINT
            FROM livestreams l
            INNER JOIN livecomments lc ON l.id = lc.livestream_id
            GROUP BY l.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(fetch_failed("sum tips"))?;

        let viewers_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(h.id) FROM livestream_viewers_history h WHERE h.livestream_id = $1",
        )
        .bind(livestream_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(fetch_failed("count viewers"))?;

        let max_tip = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(lc.tip), 0)::BIGINT FROM livecomments lc WHERE lc.livestream_id = $1",
        )
        .bind(livestream_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(fetch_failed("find max tip"))?;

        let total_reports = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(r.id) FROM livecomment_reports r WHERE r.livestream_id = $1",
        )
        .bind(livestream_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(fetch_failed("count reports"))?;

        tx.commit().await.map_err(fetch_failed("commit"))?;

        debug!(
            livestream_id,
            population = livestreams.len(),
            "Livestream statistics snapshot loaded from database"
        );

        Ok(Some(LivestreamStatsSnapshot {
            target,
            livestreams,
            reaction_counts: into_score_map(reaction_counts),
            tip_sums: into_score_map(tip_sums),
            viewers_count,
            max_tip,
            total_reports,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_repo() -> InMemoryStatsRepository {
        let repo = InMemoryStatsRepository::new();
        repo.add_user(1, "alice").await.unwrap();
        repo.add_user(2, "bob").await.unwrap();
        repo.add_livestream(10, 1).await.unwrap();
        repo.add_livestream(11, 1).await.unwrap();
        repo.add_livestream(20, 2).await.unwrap();

        repo.add_reaction(10, "fire").await.unwrap();
        repo.add_reaction(11, "fire").await.unwrap();
        repo.add_reaction(11, "heart").await.unwrap();
        repo.add_reaction(20, "clap").await.unwrap();

        repo.add_livecomment(10, 100).await.unwrap();
        repo.add_livecomment(10, 50).await.unwrap();
        repo.add_livecomment(20, 0).await.unwrap();

        repo.add_viewer(10).await.unwrap();
        repo.add_viewer(11).await.unwrap();
        repo.add_viewer(20).await.unwrap();

        repo.add_report(10).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn user_snapshot_aggregates_over_owned_livestreams() {
        let repo = seeded_repo().await;

        let snapshot = repo.user_snapshot("alice").await.unwrap().unwrap();

        assert_eq!(snapshot.target, UserIdentity::new(1, "alice"));
        assert_eq!(snapshot.users.len(), 2);
        assert_eq!(snapshot.reaction_counts.get(&1), Some(&3));
        assert_eq!(snapshot.reaction_counts.get(&2), Some(&1));
        assert_eq!(snapshot.tip_sums.get(&1), Some(&150));
        assert_eq!(snapshot.tip_sums.get(&2), Some(&0));
        assert_eq!(snapshot.viewers_count, 2);
        assert_eq!(snapshot.total_livecomments, 2);

        let mut emoji = snapshot.emoji_counts.clone();
        emoji.sort_by(|a, b| a.emoji_name.cmp(&b.emoji_name));
        assert_eq!(
            emoji,
            vec![EmojiCount::new("fire", 2), EmojiCount::new("heart", 1)]
        );
    }

    #[tokio::test]
    async fn user_snapshot_missing_user_is_none() {
        let repo = seeded_repo().await;
        assert!(repo.user_snapshot("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn livestream_snapshot_reads_side_metrics() {
        let repo = seeded_repo().await;

        let snapshot = repo.livestream_snapshot(10).await.unwrap().unwrap();

        assert_eq!(snapshot.target, LivestreamIdentity { id: 10 });
        assert_eq!(snapshot.livestreams.len(), 3);
        assert_eq!(snapshot.reaction_counts.get(&10), Some(&1));
        assert_eq!(snapshot.tip_sums.get(&10), Some(&150));
        assert_eq!(snapshot.max_tip, 100);
        assert_eq!(snapshot.viewers_count, 1);
        assert_eq!(snapshot.total_reports, 1);
    }

    #[tokio::test]
    async fn livestream_without_comments_has_zero_max_tip() {
        let repo = seeded_repo().await;

        let snapshot = repo.livestream_snapshot(11).await.unwrap().unwrap();

        assert_eq!(snapshot.max_tip, 0);
        assert_eq!(snapshot.tip_sums.get(&11), None);
        assert_eq!(snapshot.total_reports, 0);
    }

    #[tokio::test]
    async fn livestream_snapshot_missing_livestream_is_none() {
        let repo = seeded_repo().await;
        assert!(repo.livestream_snapshot(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_users_and_unknown_livestreams() {
        let repo = seeded_repo().await;

        let duplicate = repo.add_user(3, "alice").await;
        assert!(matches!(duplicate, Err(StatsError::Repository(_))));

        let orphan = repo.add_livestream(30, 42).await;
        assert!(matches!(orphan, Err(StatsError::NotFound(_))));

        let reaction = repo.add_reaction(404, "fire").await;
        assert!(matches!(reaction, Err(StatsError::NotFound(_))));
    }
}
