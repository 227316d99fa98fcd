use super::{
    ranking::{aggregate_scores, Ranking},
    EmojiCount, LivestreamStatistics, LivestreamStatsSnapshot, Rankable, StatsError,
    UserStatistics, UserStatsSnapshot,
};

/// Most frequent emoji, ties going to the lexicographically largest name.
/// Empty when there are no reactions at all.
pub fn favorite_emoji(candidates: &[EmojiCount]) -> String {
    candidates
        .iter()
        .filter(|candidate| candidate.count > 0)
        .max_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then_with(|| a.emoji_name.cmp(&b.emoji_name))
        })
        .map(|candidate| candidate.emoji_name.clone())
        .unwrap_or_default()
}

pub fn assemble_user_statistics(snapshot: &UserStatsSnapshot) -> Result<UserStatistics, StatsError> {
    let scores = aggregate_scores(&snapshot.reaction_counts, &snapshot.tip_sums);
    let ranking = Ranking::build(&snapshot.users, &scores);
    let rank = ranking.rank_of(&snapshot.target.tie_break_key())?;

    let target_id = snapshot.target.id;
    Ok(UserStatistics {
        rank,
        viewers_count: snapshot.viewers_count,
        total_reactions: snapshot
            .reaction_counts
            .get(&target_id)
            .copied()
            .unwrap_or_default(),
        total_livecomments: snapshot.total_livecomments,
        total_tip: snapshot.tip_sums.get(&target_id).copied().unwrap_or_default(),
        favorite_emoji: favorite_emoji(&snapshot.emoji_counts),
    })
}

pub fn assemble_livestream_statistics(
    snapshot: &LivestreamStatsSnapshot,
) -> Result<LivestreamStatistics, StatsError> {
    let scores = aggregate_scores(&snapshot.reaction_counts, &snapshot.tip_sums);
    let ranking = Ranking::build(&snapshot.livestreams, &scores);
    let rank = ranking.rank_of(&snapshot.target.tie_break_key())?;

    Ok(LivestreamStatistics {
        rank,
        viewers_count: snapshot.viewers_count,
        total_reactions: snapshot
            .reaction_counts
            .get(&snapshot.target.id)
            .copied()
            .unwrap_or_default(),
        total_reports: snapshot.total_reports,
        max_tip: snapshot.max_tip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{LivestreamIdentity, ScoreMap, UserIdentity};

    fn users() -> Vec<UserIdentity> {
        vec![
            UserIdentity::new(1, "alice"),
            UserIdentity::new(2, "bob"),
            UserIdentity::new(3, "carol"),
        ]
    }

    fn user_snapshot(target: UserIdentity) -> UserStatsSnapshot {
        UserStatsSnapshot {
            target,
            users: users(),
            reaction_counts: ScoreMap::new(),
            tip_sums: ScoreMap::new(),
            viewers_count: 0,
            total_livecomments: 0,
            emoji_counts: vec![],
        }
    }

    #[test]
    fn favorite_emoji_prefers_highest_count() {
        let candidates = vec![
            EmojiCount::new("smile", 5),
            EmojiCount::new("fire", 2),
            EmojiCount::new("zzz", 1),
        ];
        assert_eq!(favorite_emoji(&candidates), "smile");
    }

    #[test]
    fn favorite_emoji_tie_goes_to_larger_name() {
        let candidates = vec![EmojiCount::new("fire", 3), EmojiCount::new("heart", 3)];
        assert_eq!(favorite_emoji(&candidates), "heart");

        let reversed = vec![EmojiCount::new("heart", 3), EmojiCount::new("fire", 3)];
        assert_eq!(favorite_emoji(&reversed), "heart");
    }

    #[test]
    fn favorite_emoji_empty_without_reactions() {
        assert_eq!(favorite_emoji(&[]), "");
    }

    #[test]
    fn user_statistics_combine_rank_and_side_metrics() {
        let mut snapshot = user_snapshot(UserIdentity::new(2, "bob"));
        snapshot.reaction_counts = [(1, 4), (2, 3)].into_iter().collect();
        snapshot.tip_sums = [(2, 100), (3, 50)].into_iter().collect();
        snapshot.viewers_count = 12;
        snapshot.total_livecomments = 6;
        snapshot.emoji_counts = vec![EmojiCount::new("fire", 2), EmojiCount::new("clap", 1)];

        let stats = assemble_user_statistics(&snapshot).unwrap();

        assert_eq!(
            stats,
            UserStatistics {
                rank: 1,
                viewers_count: 12,
                total_reactions: 3,
                total_livecomments: 6,
                total_tip: 100,
                favorite_emoji: "fire".to_string(),
            }
        );
    }

    #[test]
    fn inactive_user_gets_zero_metrics_and_a_rank() {
        let mut snapshot = user_snapshot(UserIdentity::new(1, "alice"));
        snapshot.reaction_counts = [(2, 1)].into_iter().collect();

        let stats = assemble_user_statistics(&snapshot).unwrap();

        assert_eq!(stats.total_reactions, 0);
        assert_eq!(stats.total_tip, 0);
        assert_eq!(stats.favorite_emoji, "");
        // alice and carol both score 0, carol wins the tie
        assert_eq!(stats.rank, 3);
    }

    #[test]
    fn target_outside_population_is_rejected() {
        let snapshot = user_snapshot(UserIdentity::new(9, "mallory"));

        let result = assemble_user_statistics(&snapshot);
        assert!(matches!(result, Err(StatsError::Precondition(_))));
    }

    #[test]
    fn livestream_max_tip_is_independent_of_tip_sum() {
        let snapshot = LivestreamStatsSnapshot {
            target: LivestreamIdentity { id: 1 },
            livestreams: vec![LivestreamIdentity { id: 1 }, LivestreamIdentity { id: 2 }],
            reaction_counts: [(1, 2), (2, 7)].into_iter().collect(),
            tip_sums: [(1, 150)].into_iter().collect(),
            viewers_count: 3,
            max_tip: 100,
            total_reports: 4,
        };

        let stats = assemble_livestream_statistics(&snapshot).unwrap();

        assert_eq!(
            stats,
            LivestreamStatistics {
                rank: 1,
                viewers_count: 3,
                total_reactions: 2,
                total_reports: 4,
                max_tip: 100,
            }
        );
    }
}
