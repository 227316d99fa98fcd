use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entity id -> aggregate value (reaction count, tip sum or final score)
pub type ScoreMap = HashMap<i64, i64>;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserIdentity {
    pub id: i64,
    pub name: String,
}

impl UserIdentity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct LivestreamIdentity {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmojiCount {
    pub emoji_name: String,
    pub count: i64,
}

impl EmojiCount {
    pub fn new(emoji_name: impl Into<String>, count: i64) -> Self {
        Self {
            emoji_name: emoji_name.into(),
            count,
        }
    }
}

/// Everything needed to build one user's statistics, read from a single
/// consistent view of the data.
#[derive(Debug, Clone)]
pub struct UserStatsSnapshot {
    pub target: UserIdentity,
    pub users: Vec<UserIdentity>,
    pub reaction_counts: ScoreMap,
    pub tip_sums: ScoreMap,
    pub viewers_count: i64,
    pub total_livecomments: i64,
    pub emoji_counts: Vec<EmojiCount>,
}

#[derive(Debug, Clone)]
pub struct LivestreamStatsSnapshot {
    pub target: LivestreamIdentity,
    pub livestreams: Vec<LivestreamIdentity>,
    pub reaction_counts: ScoreMap,
    pub tip_sums: ScoreMap,
    pub viewers_count: i64,
    pub max_tip: i64,
    pub total_reports: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_livecomments: i64,
    pub total_tip: i64,
    pub favorite_emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivestreamStatistics {
    pub rank: i64,
    pub viewers_count: i64,
    pub total_reactions: i64,
    pub total_reports: i64,
    pub max_tip: i64,
}
