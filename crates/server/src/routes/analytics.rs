//! Analytics API handlers.
//!
//! Query parameters are range-checked before the store is touched; each
//! request then loads a fresh snapshot and computes in memory.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use foodbridge_core::analytics::insights::{self, InsightInputs, InsightReport};
use foodbridge_core::analytics::{
    ActivityPatterns, CategoryBreakdown, CohortMatrix, ContributorLeaderboard, DailySeries,
    Forecast, LocationLeaderboard, RiskReport, Snapshot, Summary, activity_patterns,
    category_breakdown, daily_series, donor_cohorts, forecast_series, score_items, summarize,
    top_contributors, top_locations,
};
use foodbridge_core::{Event, NewEvent};

use super::bounded;
use crate::db::{EventRepository, SnapshotRepository};
use crate::error::AppError;
use crate::middleware::ClientContext;
use crate::state::AppState;

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics/events", post(log_event))
        .route("/analytics/summary", get(summary))
        .route("/analytics/series", get(series))
        .route("/analytics/categories", get(categories))
        .route("/analytics/forecast", get(forecast))
        .route("/analytics/risk", get(risk))
        .route("/analytics/cohorts", get(cohorts))
        .route("/analytics/explain", get(explain))
        .route("/analytics/explain/detailed", get(explain_detailed))
        .route("/analytics/locations", get(locations))
        .route("/analytics/contributors", get(contributors))
        .route("/analytics/predictions", get(predictions))
}

#[derive(Debug, Deserialize)]
pub struct DaysParams {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub days: Option<i64>,
    pub horizon: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CohortParams {
    pub weeks: Option<i64>,
}

async fn snapshot(state: &AppState) -> Result<Snapshot, AppError> {
    Ok(SnapshotRepository::new(state.pool()).load().await?)
}

/// Append an event to the audit log.
///
/// # Errors
///
/// Returns 400 for an invalid event and 409 if it references a missing record.
pub async fn log_event(
    State(state): State<AppState>,
    client: ClientContext,
    Json(event): Json<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = event.with_request(client.ip_address, client.user_agent);
    event.validate()?;

    let saved = EventRepository::new(state.pool())
        .append(&event, state.clock().now())
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// Platform-wide counts and claim rate.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub async fn summary(State(state): State<AppState>) -> Result<Json<Summary>, AppError> {
    let snapshot = snapshot(&state).await?;
    Ok(Json(summarize(
        &snapshot.items,
        &snapshot.users,
        state.clock().now(),
    )))
}

/// Daily created/claimed counts ending today.
///
/// # Errors
///
/// Returns 400 if `days` is outside 1..=90.
pub async fn series(
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> Result<Json<DailySeries>, AppError> {
    let days = bounded("days", params.days, 14, 1..=90)?;
    let snapshot = snapshot(&state).await?;
    Ok(Json(daily_series(
        &snapshot.items,
        state.clock().today(),
        days,
    )))
}

/// Created/claimed counts by category.
///
/// # Errors
///
/// Returns 400 if `days` is outside 1..=365.
pub async fn categories(
    State(state): State<AppState>,
    Query(params): Query<DaysParams>,
) -> Result<Json<CategoryBreakdown>, AppError> {
    let days = bounded("days", params.days, 30, 1..=365)?;
    let snapshot = snapshot(&state).await?;
    #[allow(clippy::cast_possible_wrap)]
    let days = days as i64;
    Ok(Json(category_breakdown(
        &snapshot.items,
        state.clock().now(),
        days,
    )))
}

/// Linear projection of the daily series.
///
/// # Errors
///
/// Returns 400 if `days` is outside 7..=90 or `horizon` outside 1..=30.
pub async fn forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<Forecast>, AppError> {
    let days = bounded("days", params.days, 14, 7..=90)?;
    let horizon = bounded("horizon", params.horizon, 7, 1..=30)?;
    let snapshot = snapshot(&state).await?;

    let today = state.clock().today();
    let series = daily_series(&snapshot.items, today, days);
    Ok(Json(forecast_series(&series, today, horizon)))
}

/// Listed items most at risk of expiring unclaimed.
///
/// # Errors
///
/// Returns 400 if `limit` is outside 1..=50.
pub async fn risk(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<RiskReport>, AppError> {
    let limit = bounded("limit", params.limit, 10, 1..=50)?;
    let snapshot = snapshot(&state).await?;
    Ok(Json(RiskReport {
        items: score_items(&snapshot.items, state.clock().now(), limit),
    }))
}

/// Donor retention by first-donation week.
///
/// # Errors
///
/// Returns 400 if `weeks` is outside 4..=52.
pub async fn cohorts(
    State(state): State<AppState>,
    Query(params): Query<CohortParams>,
) -> Result<Json<CohortMatrix>, AppError> {
    let weeks = bounded("weeks", params.weeks, 12, 4..=52)?;
    let snapshot = snapshot(&state).await?;
    Ok(Json(donor_cohorts(
        &snapshot.items,
        state.clock().today(),
        weeks,
    )))
}

/// Rule-based insights.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub async fn explain(State(state): State<AppState>) -> Result<Json<InsightReport>, AppError> {
    let snapshot = snapshot(&state).await?;
    let inputs = InsightInputs::from_snapshot(&snapshot, state.clock().now());
    Ok(Json(insights::explain(&inputs, state.insights())))
}

/// Model-written insights with rule-based fallback.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded. Model failures are
/// reported inside the response instead.
pub async fn explain_detailed(
    State(state): State<AppState>,
) -> Result<Json<InsightReport>, AppError> {
    let snapshot = snapshot(&state).await?;
    let inputs = InsightInputs::from_snapshot(&snapshot, state.clock().now());
    Ok(Json(
        insights::explain_detailed(&inputs, state.insights()).await,
    ))
}

/// Busiest donation and claim locations.
///
/// # Errors
///
/// Returns 400 if `limit` is outside 1..=50.
pub async fn locations(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<LocationLeaderboard>, AppError> {
    let limit = bounded("limit", params.limit, 10, 1..=50)?;
    let snapshot = snapshot(&state).await?;
    Ok(Json(top_locations(
        &snapshot.organizations,
        &snapshot.items,
        limit,
    )))
}

/// Top donors and recipients, emails masked.
///
/// # Errors
///
/// Returns 400 if `limit` is outside 1..=50.
pub async fn contributors(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ContributorLeaderboard>, AppError> {
    let limit = bounded("limit", params.limit, 10, 1..=50)?;
    let snapshot = snapshot(&state).await?;
    Ok(Json(top_contributors(
        &snapshot.users,
        &snapshot.items,
        limit,
    )))
}

/// Hour-of-day and day-of-week donation activity.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub async fn predictions(
    State(state): State<AppState>,
) -> Result<Json<ActivityPatterns>, AppError> {
    let snapshot = snapshot(&state).await?;
    Ok(Json(activity_patterns(
        &snapshot.items,
        state.clock().now(),
    )))
}
