//! HTTP routes.
//!
//! # Route Structure
//!
//! - `/health` - Liveness probe
//! - `/health/ready` - Readiness probe (checks the database)
//! - `/api/v1/analytics/*` - Analytics over a fresh snapshot
//! - `/api/v1/items/*` - Item listing, creation and claims
//! - `/api/v1/orgs` - Organizations

mod analytics;
mod health;
mod items;
mod orgs;

use std::ops::RangeInclusive;

use axum::{Router, http::HeaderValue, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::CorsOrigins;
use crate::error::AppError;
use crate::state::AppState;

/// Build the `/api/v1` router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(analytics::router())
        .merge(items::router())
        .merge(orgs::router())
}

/// Build the complete application router with tracing and CORS.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/v1", api_router())
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Validate an optional numeric query parameter against an inclusive range.
fn bounded(
    name: &str,
    value: Option<i64>,
    default: usize,
    range: RangeInclusive<usize>,
) -> Result<usize, AppError> {
    let Some(value) = value else {
        return Ok(default);
    };

    usize::try_from(value)
        .ok()
        .filter(|v| range.contains(v))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "{name} must be between {} and {}",
                range.start(),
                range.end()
            ))
        })
}
