//! Offline analytics report.
//!
//! Loads one snapshot and prints every analytics output as a single JSON
//! document on stdout, using rule-based insights only.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::Serialize;

use foodbridge_core::analytics::insights::{self, InsightInputs, InsightReport};
use foodbridge_core::analytics::{
    ActivityPatterns, CategoryBreakdown, CohortMatrix, ContributorLeaderboard, DailySeries,
    Forecast, LocationLeaderboard, RiskItem, Snapshot, Summary, activity_patterns,
    category_breakdown, daily_series, donor_cohorts, forecast_series, score_items, summarize,
    top_contributors, top_locations,
};
use foodbridge_core::{Clock, SystemClock};
use foodbridge_server::db::SnapshotRepository;

use super::{CommandError, connect};

const CATEGORY_DAYS: i64 = 30;
const LEADERBOARD_LIMIT: usize = 10;

/// Validated report parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub days: usize,
    pub horizon: usize,
    pub weeks: usize,
}

impl ReportOptions {
    /// # Errors
    ///
    /// Returns `InvalidArgument` when a value is outside the range the HTTP
    /// API accepts for it. `days` also sizes the forecast fit, so it takes
    /// the forecast endpoint's 7..=90 rather than the series endpoint's 1..=90.
    pub fn new(days: usize, horizon: usize, weeks: usize) -> Result<Self, CommandError> {
        Ok(Self {
            days: within("days", days, 7..=90)?,
            horizon: within("horizon", horizon, 1..=30)?,
            weeks: within("weeks", weeks, 4..=52)?,
        })
    }
}

fn within(name: &str, value: usize, range: RangeInclusive<usize>) -> Result<usize, CommandError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(CommandError::InvalidArgument(format!(
            "{name} must be between {} and {}",
            range.start(),
            range.end()
        )))
    }
}

/// Everything the analytics endpoints would return, computed at one instant.
#[derive(Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    pub series: DailySeries,
    pub categories: CategoryBreakdown,
    pub forecast: Forecast,
    pub risk: Vec<RiskItem>,
    pub cohorts: CohortMatrix,
    pub patterns: ActivityPatterns,
    pub locations: LocationLeaderboard,
    pub contributors: ContributorLeaderboard,
    pub insights: InsightReport,
}

/// Build the report from a snapshot.
#[must_use]
pub fn build(snapshot: &Snapshot, now: DateTime<Utc>, options: &ReportOptions) -> Report {
    let today = now.date_naive();
    let series = daily_series(&snapshot.items, today, options.days);
    let forecast = forecast_series(&series, today, options.horizon);
    let inputs = InsightInputs::from_snapshot(snapshot, now);

    Report {
        generated_at: now,
        summary: summarize(&snapshot.items, &snapshot.users, now),
        categories: category_breakdown(&snapshot.items, now, CATEGORY_DAYS),
        forecast,
        series,
        risk: score_items(&snapshot.items, now, LEADERBOARD_LIMIT),
        cohorts: donor_cohorts(&snapshot.items, today, options.weeks),
        patterns: activity_patterns(&snapshot.items, now),
        locations: top_locations(&snapshot.organizations, &snapshot.items, LEADERBOARD_LIMIT),
        contributors: top_contributors(&snapshot.users, &snapshot.items, LEADERBOARD_LIMIT),
        insights: insights::explain(&inputs, None),
    }
}

/// Load a snapshot and print the report as pretty JSON.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or serialized.
pub async fn print(options: &ReportOptions) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let snapshot = SnapshotRepository::new(&pool).load().await?;
    tracing::info!(
        items = snapshot.items.len(),
        users = snapshot.users.len(),
        organizations = snapshot.organizations.len(),
        "Snapshot loaded"
    );

    let report = build(&snapshot, SystemClock.now(), options);
    let json = serde_json::to_string_pretty(&report)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
