//! Daily created/claimed series and category breakdowns.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::buckets::{BucketWidth, Buckets};
use crate::Item;

/// Category label for items without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Per-day counts of items becoming ready ("created") and being claimed.
///
/// All three vectors have the same length.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DailySeries {
    pub labels: Vec<String>,
    pub created: Vec<usize>,
    pub claimed: Vec<usize>,
}

impl DailySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// `days` daily buckets ending on `today` inclusive.
///
/// An item counts as created on the UTC date of its `ready_at` and as claimed
/// on the UTC date of its `claimed_at`; items missing the timestamp are
/// skipped for that series.
#[must_use]
pub fn daily_series(items: &[Item], today: NaiveDate, days: usize) -> DailySeries {
    let buckets = Buckets::ending_on(today, BucketWidth::Day, days);
    DailySeries {
        labels: buckets.labels(),
        created: buckets.tally(items.iter().filter_map(|item| item.ready_at)),
        claimed: buckets.tally(items.iter().filter_map(|item| item.claimed_at)),
    }
}

/// Item counts per category, sorted by category name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CategoryBreakdown {
    pub created: BTreeMap<String, usize>,
    pub claimed: BTreeMap<String, usize>,
}

/// Count items by category over the window `[now - days, ..)`.
///
/// Created counts use `ready_at`, claimed counts use `claimed_at`. Missing
/// categories are reported as [`UNCATEGORIZED`].
#[must_use]
pub fn category_breakdown(items: &[Item], now: DateTime<Utc>, days: i64) -> CategoryBreakdown {
    let start = now - Duration::days(days);
    let mut breakdown = CategoryBreakdown::default();

    for item in items {
        let category = item.category.as_deref().unwrap_or(UNCATEGORIZED);
        if item.ready_at.is_some_and(|at| at >= start) {
            *breakdown.created.entry(category.to_owned()).or_default() += 1;
        }
        if item.claimed_at.is_some_and(|at| at >= start) {
            *breakdown.claimed.entry(category.to_owned()).or_default() += 1;
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::{at, claimed, item};

    fn ready(id: i32, at: DateTime<Utc>) -> Item {
        let mut item = item(id);
        item.ready_at = Some(at);
        item
    }

    #[test]
    fn test_series_has_requested_length() {
        let today = at(2025, 6, 14, 12).date_naive();
        let series = daily_series(&[], today, 14);
        assert_eq!(series.len(), 14);
        assert_eq!(series.labels.first().map(String::as_str), Some("2025-06-01"));
        assert_eq!(series.labels.last().map(String::as_str), Some("2025-06-14"));
        assert!(series.created.iter().all(|&c| c == 0));
        assert!(series.claimed.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_series_buckets_created_and_claimed_separately() {
        let today = at(2025, 6, 3, 12).date_naive();
        let items = vec![
            ready(1, at(2025, 6, 1, 8)),
            ready(2, at(2025, 6, 1, 22)),
            claimed(ready(3, at(2025, 6, 2, 9)), at(2025, 6, 3, 10)),
            ready(4, at(2025, 5, 31, 23)),
        ];
        let series = daily_series(&items, today, 3);
        assert_eq!(series.created, vec![2, 1, 0]);
        assert_eq!(series.claimed, vec![0, 0, 1]);
    }

    #[test]
    fn test_created_total_matches_window() {
        let now = at(2025, 6, 20, 15);
        let today = now.date_naive();
        let items: Vec<_> = (0..40)
            .map(|i| ready(i, now - Duration::hours(i64::from(i) * 11)))
            .collect();

        for days in [1_usize, 3, 7, 14] {
            let series = daily_series(&items, today, days);
            let window_start = today - Duration::days(i64::try_from(days).expect("small") - 1);
            let window_end = today + Duration::days(1);
            let expected = items
                .iter()
                .filter_map(|item| item.ready_at)
                .filter(|at| {
                    let date = at.date_naive();
                    date >= window_start && date < window_end
                })
                .count();
            assert_eq!(series.created.iter().sum::<usize>(), expected);
        }
    }

    #[test]
    fn test_missing_category_is_uncategorized() {
        let now = at(2025, 6, 20, 12);
        let mut produce = ready(1, at(2025, 6, 19, 12));
        produce.category = Some("Produce".to_string());
        let unknown = claimed(ready(2, at(2025, 6, 18, 12)), at(2025, 6, 19, 9));

        let breakdown = category_breakdown(&[produce, unknown], now, 30);
        assert_eq!(breakdown.created.get("Produce"), Some(&1));
        assert_eq!(breakdown.created.get(UNCATEGORIZED), Some(&1));
        assert_eq!(breakdown.claimed.get(UNCATEGORIZED), Some(&1));
        assert_eq!(breakdown.claimed.get("Produce"), None);
    }

    #[test]
    fn test_category_window_excludes_older_items() {
        let now = at(2025, 6, 20, 12);
        let old = ready(1, now - Duration::days(31));
        let edge = ready(2, now - Duration::days(30));

        let breakdown = category_breakdown(&[old, edge], now, 30);
        assert_eq!(breakdown.created.get(UNCATEGORIZED), Some(&1));
    }

    #[test]
    fn test_repeated_aggregation_is_identical() {
        let now = at(2025, 6, 20, 12);
        let items: Vec<_> = (0..10)
            .map(|i| ready(i, now - Duration::hours(i64::from(i) * 30)))
            .collect();
        assert_eq!(
            daily_series(&items, now.date_naive(), 14),
            daily_series(&items, now.date_naive(), 14)
        );
        assert_eq!(
            category_breakdown(&items, now, 30),
            category_breakdown(&items, now, 30)
        );
    }
}
