//! Weekly donor retention cohorts.
//!
//! A donor's cohort is the week of their first donation inside the window.
//! Cell `matrix[i][j]` is the share of cohort `i` that donated again `j`
//! weeks after joining.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::buckets::{BucketWidth, Buckets};
use super::round_to;
use crate::{Item, UserId};

/// Widest retention grid, in weeks.
pub const MAX_OFFSETS: usize = 12;

/// Retention grid.
///
/// `labels[i]` is the ISO date of the first day of cohort week `i`; every row
/// of `matrix` has `offsets.len()` cells in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CohortMatrix {
    pub labels: Vec<String>,
    pub offsets: Vec<usize>,
    pub matrix: Vec<Vec<f64>>,
}

/// Build donor cohorts over the last `weeks` weeks ending on `today`.
///
/// Donations are items with both `ready_at` and `donated_by_user_id`, whose
/// ready date falls in `[today - 7 * weeks days, today]`. Week offsets are
/// floor-divided day counts from the window start.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn donor_cohorts(items: &[Item], today: NaiveDate, weeks: usize) -> CohortMatrix {
    let start = today - Duration::days(weeks as i64 * BucketWidth::Week.days());
    // `today - start` is exactly `weeks` weeks, so offsets run 0..=weeks.
    let week_buckets = Buckets::new(start, BucketWidth::Week, weeks + 1);

    let mut active_weeks: BTreeMap<UserId, BTreeSet<usize>> = BTreeMap::new();
    for item in items {
        let (Some(ready_at), Some(donor)) = (item.ready_at, item.donated_by_user_id) else {
            continue;
        };
        let date = ready_at.date_naive();
        if date > today {
            continue;
        }
        if let Some(week) = week_buckets.index_of_date(date) {
            active_weeks.entry(donor).or_default().insert(week);
        }
    }

    let mut cohorts: BTreeMap<usize, Vec<UserId>> = BTreeMap::new();
    for (&donor, weeks_active) in &active_weeks {
        if let Some(&first) = weeks_active.first() {
            cohorts.entry(first).or_default().push(donor);
        }
    }

    let offsets: Vec<usize> = (0..weeks.min(MAX_OFFSETS)).collect();

    let mut labels = Vec::with_capacity(cohorts.len());
    let mut matrix = Vec::with_capacity(cohorts.len());
    for (&cohort_week, members) in &cohorts {
        labels.push(week_buckets.bucket_start(cohort_week).to_string());

        let size = members.len().max(1) as f64;
        let row = offsets
            .iter()
            .map(|&offset| {
                let week = cohort_week + offset;
                let active = members
                    .iter()
                    .filter(|donor| {
                        active_weeks
                            .get(donor)
                            .is_some_and(|active| active.contains(&week))
                    })
                    .count();
                round_to(active as f64 / size, 4)
            })
            .collect();
        matrix.push(row);
    }

    CohortMatrix {
        labels,
        offsets,
        matrix,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::analytics::fixtures::{at, item};

    fn donation(id: i32, donor: i32, ready_at: DateTime<Utc>) -> Item {
        let mut item = item(id);
        item.ready_at = Some(ready_at);
        item.donated_by_user_id = Some(UserId::new(donor));
        item
    }

    #[test]
    fn test_empty_window() {
        let today = at(2025, 6, 30, 12).date_naive();
        let cohorts = donor_cohorts(&[], today, 12);
        assert!(cohorts.labels.is_empty());
        assert!(cohorts.matrix.is_empty());
        assert_eq!(cohorts.offsets, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_offsets_capped_at_twelve() {
        let today = at(2025, 6, 30, 12).date_naive();
        assert_eq!(donor_cohorts(&[], today, 4).offsets.len(), 4);
        assert_eq!(donor_cohorts(&[], today, 52).offsets.len(), 12);
    }

    #[test]
    fn test_single_week_donor_does_not_retain() {
        let today = at(2025, 6, 30, 12).date_naive();
        // Window start is 2025-04-07 for 12 weeks.
        let items = vec![
            donation(1, 10, at(2025, 4, 8, 9)),
            donation(2, 10, at(2025, 4, 10, 9)),
        ];
        let cohorts = donor_cohorts(&items, today, 12);

        assert_eq!(cohorts.labels, ["2025-04-07"]);
        assert_eq!(cohorts.matrix.len(), 1);
        assert!((cohorts.matrix[0][0] - 1.0).abs() < f64::EPSILON);
        assert!(cohorts.matrix[0][1].abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_retention() {
        let today = at(2025, 6, 30, 12).date_naive();
        let items = vec![
            donation(1, 1, at(2025, 4, 7, 9)),
            donation(2, 2, at(2025, 4, 9, 9)),
            donation(3, 3, at(2025, 4, 12, 9)),
            // donor 1 returns in week 1, donor 2 in week 2
            donation(4, 1, at(2025, 4, 15, 9)),
            donation(5, 2, at(2025, 4, 22, 9)),
            // donor 4 joins in week 2
            donation(6, 4, at(2025, 4, 21, 9)),
        ];
        let cohorts = donor_cohorts(&items, today, 12);

        assert_eq!(cohorts.labels, ["2025-04-07", "2025-04-21"]);
        assert_eq!(cohorts.matrix[0][..3], [1.0, 0.3333, 0.3333]);
        assert_eq!(cohorts.matrix[1][..2], [1.0, 0.0]);
    }

    #[test]
    fn test_donations_outside_window_are_ignored() {
        let today = at(2025, 6, 30, 12).date_naive();
        let items = vec![
            donation(1, 1, at(2025, 4, 6, 23)),
            donation(2, 2, at(2025, 7, 1, 0)),
            donation(3, 3, at(2025, 6, 30, 23)),
        ];
        let cohorts = donor_cohorts(&items, today, 12);
        // Only donor 3, in week 12 (the partial week containing today).
        assert_eq!(cohorts.labels, ["2025-06-30"]);
    }

    #[test]
    fn test_items_without_donor_are_ignored() {
        let today = at(2025, 6, 30, 12).date_naive();
        let mut anonymous = item(1);
        anonymous.ready_at = Some(at(2025, 6, 1, 9));
        assert!(donor_cohorts(&[anonymous], today, 12).labels.is_empty());
    }
}
