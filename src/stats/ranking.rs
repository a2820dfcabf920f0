//! Group Ranking Module
//! Ranks groups by the median of a value field, keeping only groups above a minimum size.

use crate::data::{GroupKey, Listing, ValueField};
use crate::stats::{MissingPolicy, StatsCalculator, StatsError};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// A group that survived the size threshold, with its position in the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGroup {
    /// 1-based position.
    pub rank: usize,
    pub group: String,
    pub count: usize,
    pub median: f64,
}

/// Rank groups by descending median of `field`.
///
/// Groups with fewer than `min_group_size` valid rows are excluded before
/// ranking. Equal medians are ordered by ascending group name, so the result
/// is deterministic. At most `top_n` groups are returned; empty input or no
/// surviving group yields an empty list.
pub fn rank_groups_by_median(
    rows: &[Listing],
    key: GroupKey,
    field: ValueField,
    min_group_size: usize,
    top_n: usize,
    policy: MissingPolicy,
) -> Result<Vec<RankedGroup>, StatsError> {
    if min_group_size == 0 {
        return Err(StatsError::InvalidParameter(
            "minimum group size must be at least 1".to_string(),
        ));
    }

    let grouped = StatsCalculator::group_values(rows, key, field, policy)?;
    let total_groups = grouped.len();

    let mut ranked: Vec<RankedGroup> = grouped
        .into_iter()
        .filter(|(_, values)| values.len() >= min_group_size)
        .filter_map(|(group, values)| {
            let median = StatsCalculator::median(&values)?;
            Some(RankedGroup {
                rank: 0,
                group,
                count: values.len(),
                median,
            })
        })
        .collect();

    debug!(
        "{} of {} {} groups have at least {} rows",
        ranked.len(),
        total_groups,
        key,
        min_group_size
    );

    ranked.sort_by(compare_ranked);
    ranked.truncate(top_n);
    for (i, group) in ranked.iter_mut().enumerate() {
        group.rank = i + 1;
    }

    Ok(ranked)
}

/// Identifiers of the top `top_n` groups by descending median of `field`.
pub fn top_n_groups_by_median(
    rows: &[Listing],
    key: GroupKey,
    field: ValueField,
    min_group_size: usize,
    top_n: usize,
    policy: MissingPolicy,
) -> Result<Vec<String>, StatsError> {
    Ok(
        rank_groups_by_median(rows, key, field, min_group_size, top_n, policy)?
            .into_iter()
            .map(|g| g.group)
            .collect(),
    )
}

fn compare_ranked(a: &RankedGroup, b: &RankedGroup) -> Ordering {
    b.median
        .total_cmp(&a.median)
        .then_with(|| a.group.cmp(&b.group))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(&str, f64)]) -> Vec<Listing> {
        data.iter()
            .enumerate()
            .map(|(i, (group, price))| Listing {
                id: i.to_string(),
                neighborhood: Some(group.to_string()),
                price: Some(*price),
                ..Default::default()
            })
            .collect()
    }

    fn repeat(group: &str, price: f64, n: usize) -> Vec<(&str, f64)> {
        vec![(group, price); n]
    }

    fn top(rows: &[Listing], min: usize, n: usize) -> Vec<String> {
        top_n_groups_by_median(
            rows,
            GroupKey::Neighborhood,
            ValueField::Price,
            min,
            n,
            MissingPolicy::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_single_group_median() {
        let data = rows(&[("X", 100.0), ("X", 200.0), ("X", 300.0)]);
        let ranked = rank_groups_by_median(
            &data,
            GroupKey::Neighborhood,
            ValueField::Price,
            1,
            1,
            MissingPolicy::Strict,
        )
        .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].group, "X");
        assert_eq!(ranked[0].median, 200.0);
        assert_eq!(ranked[0].count, 3);
        assert_eq!(ranked[0].rank, 1);
    }

    #[test]
    fn test_all_groups_below_threshold() {
        let mut data = repeat("A", 500.0, 5);
        data.extend(repeat("B", 900.0, 49));
        assert!(top(&rows(&data), 50, 5).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(top(&[], 1, 3).is_empty());
    }

    #[test]
    fn test_orders_by_descending_median() {
        let data = rows(&[
            ("Low", 50.0),
            ("Low", 70.0),
            ("High", 400.0),
            ("High", 600.0),
            ("Mid", 150.0),
            ("Mid", 250.0),
        ]);
        assert_eq!(top(&data, 1, 10), vec!["High", "Mid", "Low"]);
        assert_eq!(top(&data, 1, 2), vec!["High", "Mid"]);
        assert!(top(&data, 1, 0).is_empty());
    }

    #[test]
    fn test_ties_break_by_name() {
        let data = rows(&[("Beta", 100.0), ("Alpha", 100.0), ("Gamma", 100.0)]);
        assert_eq!(top(&data, 1, 3), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_threshold_excludes_small_groups() {
        let mut data = repeat("Big", 100.0, 3);
        data.push(("Small", 1000.0));
        assert_eq!(top(&rows(&data), 2, 5), vec!["Big"]);
    }

    #[test]
    fn test_zero_min_group_size_rejected() {
        let err = rank_groups_by_median(
            &rows(&[("X", 1.0)]),
            GroupKey::Neighborhood,
            ValueField::Price,
            0,
            1,
            MissingPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::InvalidParameter(_)));
    }

    #[test]
    fn test_strict_rejects_non_finite() {
        let mut data = rows(&[("X", 1.0), ("X", 2.0)]);
        data[1].price = Some(f64::NAN);
        let err = rank_groups_by_median(
            &data,
            GroupKey::Neighborhood,
            ValueField::Price,
            1,
            1,
            MissingPolicy::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::InvalidInput { .. }));
    }

    #[test]
    fn test_drop_policy_counts_only_valid_rows() {
        let mut data = rows(&[("X", 1.0), ("X", 2.0), ("Y", 5.0)]);
        data[1].price = None;
        let ranked = rank_groups_by_median(
            &data,
            GroupKey::Neighborhood,
            ValueField::Price,
            2,
            5,
            MissingPolicy::Drop,
        )
        .unwrap();
        // X has only one valid row left
        assert!(ranked.is_empty());
    }
}
