//! Structured context and prompt text for model-generated insights.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::InsightInputs;
use crate::analytics::round_to;

/// Risk score above which an item counts as high risk in the context.
pub const HIGH_RISK_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlatformStats {
    pub total_items: usize,
    /// Percentage, 1 decimal.
    pub claim_rate: f64,
    pub total_claimed: usize,
    pub total_unclaimed: usize,
    pub donors: usize,
    pub recipients: usize,
    pub items_expiring_24h: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trends {
    pub direction: TrendDirection,
    /// Claims in the last 7 buckets.
    pub recent_claims: usize,
    /// Claims in the first 7 buckets.
    pub earlier_claims: usize,
    pub daily_average_created: f64,
    pub daily_average_claimed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryHighlights {
    pub top_created_category: Option<String>,
    pub top_created_count: usize,
    pub top_claimed_category: Option<String>,
    pub top_claimed_count: usize,
    /// Distinct categories across created and claimed.
    pub total_categories: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskHighlights {
    pub high_risk_items: usize,
    pub total_risk_items: usize,
    pub most_critical_item: Option<String>,
}

/// Everything a model sees about the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightContext {
    pub platform_stats: PlatformStats,
    pub trends: Trends,
    pub categories: CategoryHighlights,
    pub risk_analysis: RiskHighlights,
}

/// Largest entry; ties keep the alphabetically first category.
fn top_entry(counts: &BTreeMap<String, usize>) -> Option<(&str, usize)> {
    counts.iter().fold(None, |best, (name, &count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((name.as_str(), count)),
    })
}

impl InsightContext {
    /// Condense the analytics inputs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn prepare(inputs: &InsightInputs) -> Self {
        let summary = &inputs.summary;
        let claimed = &inputs.series.claimed;
        let created = &inputs.series.created;

        let recent_claims: usize = claimed.iter().rev().take(7).sum();
        let earlier_claims: usize = claimed.iter().take(7).sum();
        let direction = match recent_claims.cmp(&earlier_claims) {
            std::cmp::Ordering::Greater => TrendDirection::Increasing,
            std::cmp::Ordering::Less => TrendDirection::Decreasing,
            std::cmp::Ordering::Equal => TrendDirection::Stable,
        };
        let days = inputs.series.len().max(1) as f64;

        let top_created = top_entry(&inputs.categories.created);
        let top_claimed = top_entry(&inputs.categories.claimed);
        let total_categories = inputs
            .categories
            .created
            .keys()
            .chain(inputs.categories.claimed.keys())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            platform_stats: PlatformStats {
                total_items: summary.total_items,
                claim_rate: round_to(summary.claim_rate * 100.0, 1),
                total_claimed: summary.total_claimed,
                total_unclaimed: summary.total_unclaimed,
                donors: summary.donors,
                recipients: summary.recipients,
                items_expiring_24h: summary.items_expiring_next_24h,
            },
            trends: Trends {
                direction,
                recent_claims,
                earlier_claims,
                daily_average_created: created.iter().sum::<usize>() as f64 / days,
                daily_average_claimed: claimed.iter().sum::<usize>() as f64 / days,
            },
            categories: CategoryHighlights {
                top_created_category: top_created.map(|(name, _)| name.to_owned()),
                top_created_count: top_created.map_or(0, |(_, count)| count),
                top_claimed_category: top_claimed.map(|(name, _)| name.to_owned()),
                top_claimed_count: top_claimed.map_or(0, |(_, count)| count),
                total_categories,
            },
            risk_analysis: RiskHighlights {
                high_risk_items: inputs
                    .risk
                    .iter()
                    .filter(|item| item.risk_score > HIGH_RISK_SCORE)
                    .count(),
                total_risk_items: inputs.risk.len(),
                most_critical_item: inputs.risk.first().map(|item| item.title.clone()),
            },
        }
    }
}

/// Render the user prompt sent to the model.
#[must_use]
pub fn analytics_prompt(context: &InsightContext) -> String {
    let stats = &context.platform_stats;
    let trends = &context.trends;
    let categories = &context.categories;
    let risk = &context.risk_analysis;
    let none = "none";

    let mut prompt = String::with_capacity(1536);
    prompt.push_str(
        "Review the following FoodBridge metrics and give platform operators 4-6 concrete, \
         actionable insights.\n\n",
    );

    let _ = writeln!(prompt, "PLATFORM");
    let _ = writeln!(prompt, "- Items listed: {}", stats.total_items);
    let _ = writeln!(prompt, "- Claim rate: {}%", stats.claim_rate);
    let _ = writeln!(prompt, "- Claimed: {}", stats.total_claimed);
    let _ = writeln!(prompt, "- Unclaimed: {}", stats.total_unclaimed);
    let _ = writeln!(prompt, "- Donors: {}", stats.donors);
    let _ = writeln!(prompt, "- Recipients: {}", stats.recipients);
    let _ = writeln!(prompt, "- Expiring within 24h: {}\n", stats.items_expiring_24h);

    let _ = writeln!(prompt, "TRENDS (last 14 days)");
    let _ = writeln!(prompt, "- Claims are {}", trends.direction.as_str());
    let _ = writeln!(prompt, "- Claims in the latest week: {}", trends.recent_claims);
    let _ = writeln!(prompt, "- Claims in the week before: {}", trends.earlier_claims);
    let _ = writeln!(
        prompt,
        "- Average listed per day: {:.1}",
        trends.daily_average_created
    );
    let _ = writeln!(
        prompt,
        "- Average claimed per day: {:.1}\n",
        trends.daily_average_claimed
    );

    let _ = writeln!(prompt, "CATEGORIES");
    let _ = writeln!(
        prompt,
        "- Most listed: {} ({} items)",
        categories.top_created_category.as_deref().unwrap_or(none),
        categories.top_created_count
    );
    let _ = writeln!(
        prompt,
        "- Most claimed: {} ({} items)",
        categories.top_claimed_category.as_deref().unwrap_or(none),
        categories.top_claimed_count
    );
    let _ = writeln!(prompt, "- Active categories: {}\n", categories.total_categories);

    let _ = writeln!(prompt, "RISK");
    let _ = writeln!(
        prompt,
        "- High-risk items: {} of {}",
        risk.high_risk_items, risk.total_risk_items
    );
    let _ = writeln!(
        prompt,
        "- Most urgent item: {}\n",
        risk.most_critical_item.as_deref().unwrap_or(none)
    );

    prompt.push_str(
        "Keep each insight to one or two sentences, quantify it where the data allows, \
         and focus on reducing waste and speeding up pickups. Format the answer as bullet points.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::insights::tests::inputs;

    #[test]
    fn test_prepare_trend_and_averages() {
        let mut inputs = inputs();
        inputs.series.claimed = vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1];
        inputs.series.created = vec![2; 14];
        inputs.series.labels = vec![String::new(); 14];

        let context = InsightContext::prepare(&inputs);
        assert_eq!(context.trends.direction, TrendDirection::Increasing);
        assert_eq!(context.trends.recent_claims, 7);
        assert_eq!(context.trends.earlier_claims, 0);
        assert!((context.trends.daily_average_created - 2.0).abs() < f64::EPSILON);
        assert!((context.trends.daily_average_claimed - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prepare_categories_and_risk() {
        let mut inputs = inputs();
        inputs.categories.created = [("Bakery".to_string(), 4), ("Produce".to_string(), 4)]
            .into_iter()
            .collect();
        inputs.categories.claimed = [("Dairy".to_string(), 2)].into_iter().collect();

        let context = InsightContext::prepare(&inputs);
        assert_eq!(
            context.categories.top_created_category.as_deref(),
            Some("Bakery")
        );
        assert_eq!(context.categories.top_created_count, 4);
        assert_eq!(
            context.categories.top_claimed_category.as_deref(),
            Some("Dairy")
        );
        assert_eq!(context.categories.total_categories, 3);
        assert_eq!(context.risk_analysis.total_risk_items, inputs.risk.len());
    }

    #[test]
    fn test_claim_rate_is_a_percentage() {
        let mut inputs = inputs();
        inputs.summary.claim_rate = 0.4567;
        let context = InsightContext::prepare(&inputs);
        assert!((context.platform_stats.claim_rate - 45.7).abs() < 1e-9);
    }

    #[test]
    fn test_prompt_mentions_key_numbers() {
        let context = InsightContext::prepare(&inputs());
        let prompt = analytics_prompt(&context);
        assert!(prompt.contains("Items listed: 10"));
        assert!(prompt.contains("Claims are "));
        assert!(prompt.contains("Most listed: none (0 items)"));
        assert!(prompt.contains("bullet points"));
    }
}
