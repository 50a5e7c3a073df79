//! Retrospective analytics over a point-in-time snapshot.
//!
//! Every function here is pure: it takes borrowed records plus an explicit
//! `now`/`today` and recomputes its output from scratch. Nothing is cached,
//! so repeating a call against an unchanged snapshot yields identical output.
//! Empty inputs degrade to zero or empty results; nothing divides by zero.
//!
//! # Modules
//!
//! - [`summary`] - Platform-wide counts and claim rate
//! - [`buckets`] - Fixed-width day/week buckets
//! - [`series`] - Daily created/claimed series and category breakdowns
//! - [`forecast`] - OLS trend projection
//! - [`risk`] - Expiry/quantity urgency scoring
//! - [`cohorts`] - Donor retention by first-donation week
//! - [`patterns`] - Hour-of-day and day-of-week donation activity
//! - [`leaderboard`] - Top locations and contributors
//! - [`insights`] - Human-readable insights, rule-based or model-generated

pub mod buckets;
pub mod cohorts;
pub mod forecast;
pub mod insights;
pub mod leaderboard;
pub mod patterns;
pub mod risk;
pub mod series;
pub mod summary;

pub use buckets::{BucketWidth, Buckets};
pub use cohorts::{CohortMatrix, donor_cohorts};
pub use forecast::{Forecast, LinearFit, forecast_series, linear_forecast};
pub use leaderboard::{ContributorLeaderboard, LocationLeaderboard, top_contributors, top_locations};
pub use patterns::{ActivityPatterns, activity_patterns};
pub use risk::{RiskItem, RiskReport, risk_score, score_items};
pub use series::{CategoryBreakdown, DailySeries, category_breakdown, daily_series};
pub use summary::{Summary, summarize};

use crate::{Item, Organization, User};

/// The records an analytics request reads.
///
/// Loaded once per request (inside a read-only transaction on the server) and
/// dropped afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub items: Vec<Item>,
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Test fixtures shared by the analytics modules.
#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::{Email, Item, ItemId, ItemStatus, OrganizationId, User, UserId, UserRole};

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub fn item(id: i32) -> Item {
        Item {
            id: ItemId::new(id),
            org_id: OrganizationId::new(1),
            title: format!("Item {id}"),
            description: None,
            category: None,
            allergens: Vec::new(),
            storage_type: None,
            quantity: None,
            ready_at: None,
            expires_at: None,
            pickup_window: None,
            status: ItemStatus::Listed,
            photo_url: None,
            claimed_at: None,
            claimed_by_name: None,
            claimed_by_phone: None,
            claimed_by_email: None,
            claimed_by_user_id: None,
            donated_by_user_id: None,
        }
    }

    pub fn claimed(mut item: Item, at: DateTime<Utc>) -> Item {
        item.status = ItemStatus::Claimed;
        item.claimed_at = Some(at);
        item
    }

    pub fn user(id: i32, role: UserRole) -> User {
        User {
            id: UserId::new(id),
            name: format!("User {id}"),
            email: Email::from_trusted(format!("user{id}@example.org")),
            phone: None,
            role,
            verified: true,
            created_at: at(2025, 1, 1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::round_to;

    #[test]
    fn test_round_to() {
        assert!((round_to(0.333_33, 4) - 0.3333).abs() < f64::EPSILON);
        assert!((round_to(2.005_1, 2) - 2.01).abs() < f64::EPSILON);
        assert!((round_to(-1.26, 1) - -1.3).abs() < f64::EPSILON);
    }
}
