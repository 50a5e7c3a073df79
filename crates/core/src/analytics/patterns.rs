//! Hour-of-day and day-of-week donation activity.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::Item;

/// Look-back window for activity patterns.
pub const PATTERN_WINDOW_DAYS: i64 = 30;

/// How many peak hours/days to report.
pub const TOP_PEAKS: usize = 3;

/// Reported when there is no recent activity.
pub const DEFAULT_PEAK_TIME: &str = "12:00";

/// Day names indexed by `num_days_from_sunday`.
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourCount {
    pub hour: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayCount {
    pub day: String,
    /// 0 = Sunday.
    pub day_number: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeakDay {
    pub day: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeakPredictions {
    pub best_donation_hours: Vec<HourCount>,
    pub best_donation_days: Vec<PeakDay>,
    /// `HH:00` of the busiest hour.
    pub next_peak_time: String,
}

/// Donation activity over the last [`PATTERN_WINDOW_DAYS`] days.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityPatterns {
    /// Always 24 entries, hour 0 first.
    pub hourly_patterns: Vec<HourCount>,
    /// Always 7 entries, Sunday first.
    pub daily_patterns: Vec<DayCount>,
    pub predictions: PeakPredictions,
}

/// Indices of the `TOP_PEAKS` largest non-zero counts; ties go to the lower index.
fn peaks(counts: &[usize]) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..counts.len())
        .filter(|&i| counts.get(i).is_some_and(|&c| c > 0))
        .collect();
    ranked.sort_by(|&a, &b| counts.get(b).cmp(&counts.get(a)));
    ranked.truncate(TOP_PEAKS);
    ranked
}

/// Bucket recent `ready_at` times by UTC hour and weekday.
#[must_use]
pub fn activity_patterns(items: &[Item], now: DateTime<Utc>) -> ActivityPatterns {
    let since = now - Duration::days(PATTERN_WINDOW_DAYS);

    let mut by_hour = [0_usize; 24];
    let mut by_day = [0_usize; 7];
    for ready_at in items.iter().filter_map(|item| item.ready_at) {
        if ready_at < since {
            continue;
        }
        if let Some(slot) = by_hour.get_mut(ready_at.hour() as usize) {
            *slot += 1;
        }
        if let Some(slot) = by_day.get_mut(ready_at.weekday().num_days_from_sunday() as usize) {
            *slot += 1;
        }
    }

    let hour_count = |hour: usize| HourCount {
        hour: u32::try_from(hour).unwrap_or_default(),
        count: by_hour.get(hour).copied().unwrap_or_default(),
    };
    let day_name = |day: usize| DAY_NAMES.get(day).copied().unwrap_or_default().to_owned();

    let best_hours: Vec<HourCount> = peaks(&by_hour).into_iter().map(hour_count).collect();
    let best_days = peaks(&by_day)
        .into_iter()
        .map(|day| PeakDay {
            day: day_name(day),
            count: by_day.get(day).copied().unwrap_or_default(),
        })
        .collect();

    let next_peak_time = best_hours.first().map_or_else(
        || DEFAULT_PEAK_TIME.to_owned(),
        |peak| format!("{:02}:00", peak.hour),
    );

    ActivityPatterns {
        hourly_patterns: (0..24).map(hour_count).collect(),
        daily_patterns: (0..7)
            .map(|day| DayCount {
                day: day_name(day),
                day_number: u32::try_from(day).unwrap_or_default(),
                count: by_day.get(day).copied().unwrap_or_default(),
            })
            .collect(),
        predictions: PeakPredictions {
            best_donation_hours: best_hours,
            best_donation_days: best_days,
            next_peak_time,
        },
    }
}
