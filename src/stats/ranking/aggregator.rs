use super::super::ScoreMap;

/// Folds per-entity event counts and monetary sums into one score per entity.
///
/// Every id present in either input gets exactly one entry; a value missing
/// from one side counts as zero.
pub fn aggregate_scores(event_counts: &ScoreMap, monetary_sums: &ScoreMap) -> ScoreMap {
    let mut scores = ScoreMap::with_capacity(event_counts.len().max(monetary_sums.len()));

    for (id, count) in event_counts {
        *scores.entry(*id).or_default() += count;
    }
    for (id, sum) in monetary_sums {
        *scores.entry(*id).or_default() += sum;
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(i64, i64)]) -> ScoreMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn adds_counts_and_sums() {
        let scores = aggregate_scores(&map(&[(1, 3), (2, 5)]), &map(&[(1, 100), (2, 0)]));

        assert_eq!(scores.get(&1), Some(&103));
        assert_eq!(scores.get(&2), Some(&5));
    }

    #[test]
    fn covers_ids_present_on_only_one_side() {
        let scores = aggregate_scores(&map(&[(1, 4)]), &map(&[(2, 50)]));

        assert_eq!(scores.len(), 2);
        assert_eq!(scores.get(&1), Some(&4));
        assert_eq!(scores.get(&2), Some(&50));
    }

    #[test]
    fn empty_inputs_yield_empty_scores() {
        let scores = aggregate_scores(&ScoreMap::new(), &ScoreMap::new());
        assert!(scores.is_empty());
    }

    #[test]
    fn does_not_assume_non_negative_values() {
        let scores = aggregate_scores(&map(&[(7, 2)]), &map(&[(7, -5)]));
        assert_eq!(scores.get(&7), Some(&-3));
    }

    #[test]
    fn insertion_order_does_not_change_scores() {
        let forward = aggregate_scores(
            &map(&[(1, 1), (2, 2), (3, 3)]),
            &map(&[(1, 10), (2, 20), (3, 30)]),
        );
        let reversed = aggregate_scores(
            &map(&[(3, 3), (2, 2), (1, 1)]),
            &map(&[(3, 30), (2, 20), (1, 10)]),
        );

        assert_eq!(forward, reversed);
    }
}
