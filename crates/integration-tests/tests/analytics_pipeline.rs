//! The analytics core end to end on one hand-built snapshot.
//!
//! The snapshot is what `SnapshotRepository::load` would return for a small
//! marketplace; every endpoint's computation runs against it at a fixed
//! instant (Sunday 2025-06-15 12:00 UTC).

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use foodbridge_core::analytics::insights::{
    InsightContext, InsightError, InsightGenerator, InsightInputs, explain, explain_detailed,
    rule_based_insights,
};
use foodbridge_core::analytics::{
    Snapshot, activity_patterns, category_breakdown, daily_series, donor_cohorts,
    forecast_series, score_items, summarize, top_contributors, top_locations,
};
use foodbridge_core::{
    Email, Item, ItemId, ItemStatus, Organization, OrganizationId, User, UserId, UserRole,
};
use foodbridge_integration_tests::fixed_now;

fn at(m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, m, d, h, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn item(id: i32, org: i32, donor: i32, ready_at: DateTime<Utc>, category: Option<&str>) -> Item {
    Item {
        id: ItemId::new(id),
        org_id: OrganizationId::new(org),
        title: format!("Item {id}"),
        description: None,
        category: category.map(str::to_owned),
        allergens: Vec::new(),
        storage_type: None,
        quantity: None,
        ready_at: Some(ready_at),
        expires_at: None,
        pickup_window: None,
        status: ItemStatus::Listed,
        photo_url: None,
        claimed_at: None,
        claimed_by_name: None,
        claimed_by_phone: None,
        claimed_by_email: None,
        claimed_by_user_id: None,
        donated_by_user_id: Some(UserId::new(donor)),
    }
}

fn claim(mut item: Item, claimer: i32, claimed_at: DateTime<Utc>) -> Item {
    item.status = ItemStatus::Claimed;
    item.claimed_at = Some(claimed_at);
    item.claimed_by_name = Some(format!("User {claimer}"));
    item.claimed_by_user_id = Some(UserId::new(claimer));
    item
}

fn user(id: i32, role: UserRole) -> User {
    User {
        id: UserId::new(id),
        name: format!("User {id}"),
        email: Email::from_trusted(format!("person{id}@example.org")),
        phone: None,
        role,
        verified: true,
        created_at: at(1, 1, 0),
    }
}

fn org(id: i32, address: Option<&str>) -> Organization {
    Organization {
        id: OrganizationId::new(id),
        name: format!("Org {id}"),
        kind: "pantry".to_owned(),
        address: address.map(str::to_owned),
        lat: None,
        lng: None,
        phone: None,
        email: None,
    }
}

fn snapshot() -> Snapshot {
    let mut expiring_soon = item(1, 1, 1, at(6, 14, 9), Some("Bakery"));
    expiring_soon.expires_at = Some(at(6, 15, 18));
    expiring_soon.quantity = Some(10.0);

    let claimed_recent = claim(item(2, 1, 1, at(6, 13, 10), Some("Produce")), 3, at(6, 13, 15));
    let claimed_early = claim(item(3, 2, 2, at(6, 1, 9), Some("Dairy")), 3, at(6, 2, 9));
    let no_expiry = item(4, 2, 2, at(6, 15, 8), None);

    let mut already_expired = item(5, 2, 2, at(6, 8, 8), Some("Produce"));
    already_expired.expires_at = Some(at(6, 10, 0));

    Snapshot {
        items: vec![
            expiring_soon,
            claimed_recent,
            claimed_early,
            no_expiry,
            already_expired,
        ],
        users: vec![
            user(1, UserRole::Donor),
            user(2, UserRole::Donor),
            user(3, UserRole::User),
            user(4, UserRole::Admin),
        ],
        organizations: vec![
            org(1, Some("120 Elm St")),
            org(2, Some("8 Mill Rd")),
            org(3, None),
        ],
    }
}

#[test]
fn test_summary() {
    let snap = snapshot();
    let summary = summarize(&snap.items, &snap.users, fixed_now());

    assert_eq!(summary.total_items, 5);
    assert_eq!(summary.total_claimed, 2);
    assert_eq!(summary.total_unclaimed, 3);
    assert!((summary.claim_rate - 0.4).abs() < f64::EPSILON);
    assert_eq!(summary.donors, 2);
    assert_eq!(summary.recipients, 2);
    // Expiring tonight plus the one already past expiry
    assert_eq!(summary.items_expiring_next_24h, 2);
}

#[test]
fn test_daily_series_and_forecast() {
    let snap = snapshot();
    let today = fixed_now().date_naive();
    let series = daily_series(&snap.items, today, 14);

    assert_eq!(series.labels.len(), 14);
    assert_eq!(series.labels.first().map(String::as_str), Some("2025-06-02"));
    assert_eq!(series.labels.last().map(String::as_str), Some("2025-06-15"));
    // Item 3 became ready on 06-01, outside the window; its claim on 06-02 is inside
    assert_eq!(series.created.iter().sum::<usize>(), 4);
    assert_eq!(series.claimed.iter().sum::<usize>(), 2);
    assert_eq!(series.claimed.first(), Some(&1));

    let forecast = forecast_series(&series, today, 3);
    assert_eq!(
        forecast.labels,
        vec!["2025-06-16", "2025-06-17", "2025-06-18"]
    );
    assert_eq!(forecast.created.len(), 3);
    assert!(forecast.created.iter().chain(&forecast.claimed).all(|v| *v >= 0.0));
}

#[test]
fn test_category_breakdown() {
    let snap = snapshot();
    let breakdown = category_breakdown(&snap.items, fixed_now(), 30);

    let created: Vec<(&str, usize)> = breakdown
        .created
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    assert_eq!(
        created,
        vec![("Bakery", 1), ("Dairy", 1), ("Produce", 2), ("Uncategorized", 1)]
    );
    assert_eq!(breakdown.claimed.get("Produce"), Some(&1));
    assert_eq!(breakdown.claimed.get("Dairy"), Some(&1));
    assert_eq!(breakdown.claimed.len(), 2);
}

#[test]
fn test_risk_skips_claimed_and_expired() {
    let snap = snapshot();
    let risk = score_items(&snap.items, fixed_now(), 10);

    let ids: Vec<i32> = risk.iter().map(|r| r.id.as_i32()).collect();
    assert_eq!(ids, vec![1, 4]);

    let first = risk.first().expect("one risky item");
    assert_eq!(first.hours_left, Some(6.0));
    // 1 / (1 + 6) + 0.05 * 10
    assert!((first.risk_score - 0.6429).abs() < 1e-9);

    let last = risk.last().expect("two risky items");
    assert_eq!(last.category, "Unknown");
    assert_eq!(last.hours_left, None);
    assert!((last.risk_score - 0.0501).abs() < 1e-9);

    assert_eq!(score_items(&snap.items, fixed_now(), 1).len(), 1);
}

#[test]
fn test_donor_cohorts() {
    let snap = snapshot();
    let cohorts = donor_cohorts(&snap.items, fixed_now().date_naive(), 4);

    assert_eq!(cohorts.offsets, vec![0, 1, 2, 3]);
    assert_eq!(cohorts.labels, vec!["2025-06-01", "2025-06-08"]);
    // Donor 2 joined the week of 06-01 and donated in the next two weeks
    assert_eq!(cohorts.matrix, vec![vec![1.0, 1.0, 1.0, 0.0], vec![1.0, 0.0, 0.0, 0.0]]);
}

#[test]
fn test_activity_patterns() {
    let snap = snapshot();
    let patterns = activity_patterns(&snap.items, fixed_now());

    assert_eq!(patterns.hourly_patterns.len(), 24);
    assert_eq!(patterns.daily_patterns.len(), 7);
    assert_eq!(
        patterns.hourly_patterns.iter().map(|h| h.count).sum::<usize>(),
        5
    );

    let peak_hours: Vec<u32> = patterns
        .predictions
        .best_donation_hours
        .iter()
        .map(|h| h.hour)
        .collect();
    assert_eq!(peak_hours, vec![8, 9, 10]);
    assert_eq!(patterns.predictions.next_peak_time, "08:00");
}

#[test]
fn test_leaderboards() {
    let snap = snapshot();

    let locations = top_locations(&snap.organizations, &snap.items, 10);
    let donations: Vec<(&str, usize)> = locations
        .top_donation_locations
        .iter()
        .map(|l| (l.address.as_str(), l.count))
        .collect();
    assert_eq!(donations, vec![("8 Mill Rd", 3), ("120 Elm St", 2)]);
    let claims: Vec<(&str, usize)> = locations
        .top_claim_locations
        .iter()
        .map(|l| (l.address.as_str(), l.count))
        .collect();
    assert_eq!(claims, vec![("120 Elm St", 1), ("8 Mill Rd", 1)]);

    let contributors = top_contributors(&snap.users, &snap.items, 10);
    let donors: Vec<(&str, usize)> = contributors
        .top_donors
        .iter()
        .map(|d| (d.name.as_str(), d.donations))
        .collect();
    assert_eq!(donors, vec![("User 2", 3), ("User 1", 2)]);
    assert_eq!(contributors.top_recipients.len(), 1);
    for entry in &contributors.top_donors {
        assert!(!entry.email.starts_with("person"), "{}", entry.email);
        assert!(entry.email.ends_with("@example.org"));
    }
}

#[test]
fn test_recomputation_is_deterministic() {
    let snap = snapshot();
    let first = InsightInputs::from_snapshot(&snap, fixed_now());
    let second = InsightInputs::from_snapshot(&snap, fixed_now());
    assert_eq!(first, second);
    assert_eq!(explain(&first, None), explain(&second, None));
}

// ============================================================================
// Insights with a stand-in model
// ============================================================================

struct StubModel {
    fail: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl InsightGenerator for StubModel {
    fn available(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    async fn generate(&self, _context: &InsightContext) -> Result<Vec<String>, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(InsightError::RateLimited("quota exceeded".to_owned()))
        } else {
            Ok(vec!["Bakery items are claimed fastest on weekends".to_owned()])
        }
    }
}

#[tokio::test]
async fn test_detailed_insights_use_model() {
    let inputs = InsightInputs::from_snapshot(&snapshot(), fixed_now());
    let model = StubModel {
        fail: false,
        calls: AtomicUsize::new(0),
    };

    let report = explain_detailed(&inputs, Some(&model)).await;

    assert!(report.ai_powered);
    assert_eq!(report.model.as_deref(), Some("stub-model"));
    assert_eq!(
        report.insights,
        vec!["Bakery items are claimed fastest on weekends"]
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_detailed_insights_fall_back_to_rules() {
    let inputs = InsightInputs::from_snapshot(&snapshot(), fixed_now());
    let model = StubModel {
        fail: true,
        calls: AtomicUsize::new(0),
    };

    let report = explain_detailed(&inputs, Some(&model)).await;

    assert!(!report.ai_powered);
    assert_eq!(report.insights, rule_based_insights(&inputs));
    assert!(
        report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("quota exceeded"))
    );

    // The rule-based endpoint never calls the model
    let plain = explain(&inputs, Some(&model));
    assert_eq!(plain.model_available, Some(true));
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);
}
