//! Human-readable insights over the analytics outputs.
//!
//! Rule-based insights are always available and are the default. A model
//! behind [`InsightGenerator`] is an optional, strictly additive path: when it
//! is missing or fails, callers still get the rule-based output.

mod context;
mod generator;
mod parse;
mod rules;

pub use context::{
    CategoryHighlights, HIGH_RISK_SCORE, InsightContext, PlatformStats, RiskHighlights,
    TrendDirection, Trends, analytics_prompt,
};
pub use generator::{InsightError, InsightGenerator};
pub use parse::{EMPTY_RESPONSE_INSIGHT, MAX_PARSED_INSIGHTS, parse_model_response};
pub use rules::{MAX_RULE_INSIGHTS, fallback_insights, rule_based_insights};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CategoryBreakdown, DailySeries, RiskItem, Snapshot, Summary, category_breakdown, daily_series,
    score_items, summarize,
};

/// Days of daily series fed to insights.
pub const SERIES_DAYS: usize = 14;
/// Days of category breakdown fed to insights.
pub const CATEGORY_DAYS: i64 = 30;
/// Riskiest items fed to insights.
pub const RISK_LIMIT: usize = 10;

/// Longest upstream error message echoed back to clients.
const MAX_ERROR_CHARS: usize = 100;

/// Everything the insight rules and the model look at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightInputs {
    pub summary: Summary,
    pub series: DailySeries,
    pub categories: CategoryBreakdown,
    pub risk: Vec<RiskItem>,
}

impl InsightInputs {
    /// Compute the standard inputs (14-day series, 30-day categories, top 10
    /// risk) from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        Self {
            summary: summarize(&snapshot.items, &snapshot.users, now),
            series: daily_series(&snapshot.items, now.date_naive(), SERIES_DAYS),
            categories: category_breakdown(&snapshot.items, now, CATEGORY_DAYS),
            risk: score_items(&snapshot.items, now, RISK_LIMIT),
        }
    }
}

/// Response of the explain endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightReport {
    pub insights: Vec<String>,
    /// Whether `insights` came from the model.
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsightReport {
    fn rule_based(insights: Vec<String>) -> Self {
        Self {
            insights,
            ai_powered: false,
            model_available: None,
            model: None,
            note: None,
            error: None,
        }
    }
}

fn usable(generator: Option<&dyn InsightGenerator>) -> Option<&dyn InsightGenerator> {
    generator.filter(|g| g.available())
}

fn truncate_error(message: &str) -> String {
    let head: String = message.chars().take(MAX_ERROR_CHARS).collect();
    format!("model error: {head}...")
}

/// Rule-based insights, reporting whether a model could have been used.
#[must_use]
pub fn explain(inputs: &InsightInputs, generator: Option<&dyn InsightGenerator>) -> InsightReport {
    InsightReport {
        model_available: Some(usable(generator).is_some()),
        ..InsightReport::rule_based(rule_based_insights(inputs))
    }
}

/// Model-generated insights, falling back to rules.
///
/// Without an available generator the report holds a single explanatory
/// insight and an error. When the model call fails the rule-based insights are
/// returned along with the error truncated to 100 characters. An empty model
/// answer yields the basic [`fallback_insights`].
pub async fn explain_detailed(
    inputs: &InsightInputs,
    generator: Option<&dyn InsightGenerator>,
) -> InsightReport {
    let Some(generator) = usable(generator) else {
        return InsightReport {
            error: Some("model not available".to_owned()),
            ..InsightReport::rule_based(vec![
                "Detailed analysis needs a configured language model. Use the rule-based insights instead."
                    .to_owned(),
            ])
        };
    };

    let context = InsightContext::prepare(inputs);
    match generator.generate(&context).await {
        Ok(insights) if insights.is_empty() => {
            tracing::warn!(model = generator.model(), "model returned no insights");
            InsightReport {
                error: Some("model returned no insights".to_owned()),
                ..InsightReport::rule_based(fallback_insights(&inputs.summary))
            }
        }
        Ok(insights) => InsightReport {
            insights,
            ai_powered: true,
            model_available: Some(true),
            model: Some(generator.model().to_owned()),
            note: Some("Detailed model analysis".to_owned()),
            error: None,
        },
        Err(e) => {
            tracing::warn!(model = generator.model(), error = %e, "model insight generation failed");
            InsightReport {
                error: Some(truncate_error(&e.to_string())),
                ..InsightReport::rule_based(rule_based_insights(inputs))
            }
        }
    }
}
