//! Rule-based insights.
//!
//! Thresholds are fixed bands over the same inputs the model sees, so the
//! output is deterministic for a given snapshot.

use super::InsightInputs;
use crate::analytics::Summary;

/// Most insights returned by [`rule_based_insights`].
pub const MAX_RULE_INSIGHTS: usize = 5;

/// Risk score above which an item is critical.
const CRITICAL_RISK: f64 = 0.7;
/// Lower bound (exclusive) of the medium-risk band.
const MEDIUM_RISK: f64 = 0.3;

fn claim_rate_insight(summary: &Summary) -> String {
    let rate = summary.claim_rate * 100.0;
    if rate >= 85.0 {
        format!(
            "Outstanding {rate:.1}% claim rate, well above the typical 60-75% range. Matching is working very well."
        )
    } else if rate >= 70.0 {
        format!(
            "Strong {rate:.1}% claim rate shows donors and recipients are connecting. Tune pickup timing to push it higher."
        )
    } else if rate >= 50.0 {
        format!(
            "Solid {rate:.1}% claim rate with room to grow. Target outreach at the weaker categories."
        )
    } else {
        format!(
            "{rate:.1}% claim rate leaves room for better matching and more recipient engagement."
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn average(values: &[usize]) -> f64 {
    values.iter().sum::<usize>() as f64 / values.len().max(1) as f64
}

/// Compare the last 7 claim buckets to the first 7 (or to whatever precedes
/// the last 7 when the series is shorter than 14).
fn trend_insight(claimed: &[usize]) -> Option<String> {
    if claimed.len() < 7 {
        return None;
    }
    let recent = claimed.get(claimed.len() - 7..)?;
    let earlier = if claimed.len() >= 14 {
        claimed.get(..7)?
    } else {
        claimed.get(..claimed.len() - 7)?
    };
    if earlier.is_empty() {
        return None;
    }

    let earlier_avg = average(earlier);
    let change = (average(recent) - earlier_avg) / earlier_avg.max(1.0) * 100.0;

    Some(if change > 20.0 {
        format!("Claims are surging ({change:+.1}%). Use the momentum to recruit more donors.")
    } else if change > 5.0 {
        format!("Claims grew steadily ({change:+.1}%), a sign of healthy adoption. Keep the current approach.")
    } else if change < -15.0 {
        format!("Claims fell {change:.1}%. Check for seasonal effects or run a re-engagement campaign.")
    } else {
        format!("Claim volume is stable ({change:+.1}%), showing consistent community engagement.")
    })
}

#[allow(clippy::cast_precision_loss)]
fn category_insights(inputs: &InsightInputs) -> Vec<String> {
    let created = &inputs.categories.created;
    let claimed = &inputs.categories.claimed;
    if created.is_empty() || claimed.is_empty() {
        return Vec::new();
    }

    let rate = |category: &str, created_count: usize| {
        claimed.get(category).copied().unwrap_or_default() as f64 / created_count as f64
    };

    let mut insights = Vec::new();

    let worst = created
        .iter()
        .filter(|&(_, &count)| count >= 3)
        .map(|(name, &count)| (name, rate(name, count)))
        .filter(|&(_, r)| r < 0.5)
        .fold(None::<(&String, f64)>, |worst, candidate| match worst {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        });
    if let Some((name, r)) = worst {
        insights.push(format!(
            "'{name}' items are claimed only {:.0}% of the time. Revisit timing, descriptions or recipient targeting.",
            r * 100.0
        ));
    }

    let best = created
        .iter()
        .filter(|&(_, &count)| count >= 2)
        .map(|(name, &count)| (name, rate(name, count)))
        .filter(|&(_, r)| r >= 0.8)
        .fold(None::<(&String, f64)>, |best, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        });
    if let Some((name, r)) = best {
        insights.push(format!(
            "'{name}' items are claimed {:.0}% of the time. Apply what works there to other categories.",
            r * 100.0
        ));
    }

    insights
}

fn risk_insight(inputs: &InsightInputs) -> Option<String> {
    if inputs.risk.is_empty() {
        return None;
    }
    let critical = inputs
        .risk
        .iter()
        .filter(|item| item.risk_score > CRITICAL_RISK)
        .count();
    let medium = inputs
        .risk
        .iter()
        .filter(|item| item.risk_score > MEDIUM_RISK && item.risk_score <= CRITICAL_RISK)
        .count();

    Some(if critical >= 3 {
        format!("{critical} critical-risk items need attention now. Send urgent pickup notifications.")
    } else if critical > 0 {
        format!("{critical} high-risk items found. Prioritize them over the next 4-6 hours to prevent waste.")
    } else if medium > 0 {
        format!("{medium} medium-risk items are being tracked. The pipeline is under control.")
    } else {
        "All listed items carry low spoilage risk. Inventory is turning over well.".to_owned()
    })
}

#[allow(clippy::cast_precision_loss)]
fn community_insight(summary: &Summary) -> Option<String> {
    let (donors, recipients) = (summary.donors, summary.recipients);
    if donors == 0 || recipients == 0 {
        return None;
    }
    let ratio = donors as f64 / recipients as f64;
    Some(if ratio > 2.0 {
        format!("{donors} donors vs {recipients} recipients. Grow recipient outreach to match supply.")
    } else if ratio < 0.5 {
        format!("{recipients} recipients vs {donors} donors. Demand is strong, so focus on donor acquisition.")
    } else {
        format!("Balanced community of {donors} donors and {recipients} recipients.")
    })
}

#[allow(clippy::cast_precision_loss)]
fn efficiency_insight(summary: &Summary) -> Option<String> {
    if summary.total_items == 0 {
        return None;
    }
    let total = summary.total_items as f64;
    let expiring_share = summary.items_expiring_next_24h as f64 / total.max(1.0);
    let score = summary.total_claimed as f64 / total * (1.0 - expiring_share) * 100.0;

    Some(if score >= 80.0 {
        format!("Platform efficiency score: {score:.0}/100. Waste prevention and matching are excellent.")
    } else if score >= 60.0 {
        format!("Platform efficiency score: {score:.0}/100. Strong, with room to optimize.")
    } else {
        format!("Platform efficiency score: {score:.0}/100. Focus on faster matching and expiry management.")
    })
}

/// Up to [`MAX_RULE_INSIGHTS`] insights, most general first.
#[must_use]
pub fn rule_based_insights(inputs: &InsightInputs) -> Vec<String> {
    let mut insights = vec![claim_rate_insight(&inputs.summary)];
    insights.extend(trend_insight(&inputs.series.claimed));
    insights.extend(category_insights(inputs));
    insights.extend(risk_insight(inputs));
    insights.extend(community_insight(&inputs.summary));
    insights.extend(efficiency_insight(&inputs.summary));
    insights.truncate(MAX_RULE_INSIGHTS);
    insights
}

/// Three basic lines used when no richer analysis is available.
#[must_use]
pub fn fallback_insights(summary: &Summary) -> Vec<String> {
    vec![
        format!(
            "Platform claim rate: {:.1}% ({}/{} items)",
            summary.claim_rate * 100.0,
            summary.total_claimed,
            summary.total_items
        ),
        format!(
            "Items expiring in 24h: {}",
            summary.items_expiring_next_24h
        ),
        "Detailed insights are temporarily unavailable; showing basic figures.".to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::insights::tests::{inputs, risk_row};

    #[test]
    fn test_claim_rate_bands() {
        let mut summary = inputs().summary;
        for (rate, expected) in [
            (0.9, "Outstanding 90.0%"),
            (0.7, "Strong 70.0%"),
            (0.5, "Solid 50.0%"),
            (0.25, "25.0% claim rate"),
        ] {
            summary.claim_rate = rate;
            assert!(
                claim_rate_insight(&summary).starts_with(expected),
                "rate {rate}"
            );
        }
    }

    #[test]
    fn test_trend_needs_an_earlier_window() {
        assert_eq!(trend_insight(&[1; 6]), None);
        assert_eq!(trend_insight(&[1; 7]), None);
        assert!(trend_insight(&[1; 8]).is_some());
    }

    #[test]
    fn test_trend_bands() {
        let surge = [0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 2, 2];
        assert!(trend_insight(&surge).is_some_and(|s| s.contains("+200.0%")));

        let drop = [4, 4, 4, 4, 4, 4, 4, 1, 1, 1, 1, 1, 1, 1];
        assert!(trend_insight(&drop).is_some_and(|s| s.starts_with("Claims fell -75.0%")));

        assert!(trend_insight(&[3; 14]).is_some_and(|s| s.contains("stable (+0.0%)")));
    }

    #[test]
    fn test_category_insights_pick_worst_and_best() {
        let mut inputs = inputs();
        inputs.categories.created = [
            ("Bakery".to_string(), 4),
            ("Dairy".to_string(), 5),
            ("Produce".to_string(), 2),
        ]
        .into_iter()
        .collect();
        inputs.categories.claimed = [
            ("Bakery".to_string(), 1),
            ("Dairy".to_string(), 2),
            ("Produce".to_string(), 2),
        ]
        .into_iter()
        .collect();

        let insights = category_insights(&inputs);
        assert_eq!(insights.len(), 2);
        assert!(insights[0].starts_with("'Bakery' items are claimed only 25%"));
        assert!(insights[1].starts_with("'Produce' items are claimed 100%"));
    }

    #[test]
    fn test_category_insights_need_both_maps() {
        let mut inputs = inputs();
        inputs.categories.created = [("Bakery".to_string(), 9)].into_iter().collect();
        assert!(category_insights(&inputs).is_empty());
    }

    #[test]
    fn test_risk_bands() {
        let mut inputs = inputs();
        assert_eq!(risk_insight(&inputs), None);

        inputs.risk = vec![risk_row(1, 0.9), risk_row(2, 0.8), risk_row(3, 0.75)];
        assert!(risk_insight(&inputs).is_some_and(|s| s.starts_with("3 critical-risk")));

        inputs.risk = vec![risk_row(1, 0.9), risk_row(2, 0.1)];
        assert!(risk_insight(&inputs).is_some_and(|s| s.starts_with("1 high-risk")));

        inputs.risk = vec![risk_row(1, 0.7), risk_row(2, 0.31)];
        assert!(risk_insight(&inputs).is_some_and(|s| s.starts_with("2 medium-risk")));

        inputs.risk = vec![risk_row(1, 0.3)];
        assert!(risk_insight(&inputs).is_some_and(|s| s.starts_with("All listed items")));
    }

    #[test]
    fn test_community_balance() {
        let mut summary = inputs().summary;
        summary.donors = 5;
        summary.recipients = 2;
        assert!(community_insight(&summary).is_some_and(|s| s.starts_with("5 donors vs 2")));
        summary.recipients = 20;
        assert!(community_insight(&summary).is_some_and(|s| s.starts_with("20 recipients vs 5")));
        summary.recipients = 6;
        assert!(community_insight(&summary).is_some_and(|s| s.starts_with("Balanced")));
        summary.donors = 0;
        assert_eq!(community_insight(&summary), None);
    }

    #[test]
    fn test_efficiency_score() {
        let mut summary = inputs().summary;
        summary.total_items = 10;
        summary.total_claimed = 9;
        summary.items_expiring_next_24h = 1;
        // 0.9 * 0.9 * 100 = 81
        assert!(efficiency_insight(&summary).is_some_and(|s| s.contains("81/100")));

        summary.total_items = 0;
        assert_eq!(efficiency_insight(&summary), None);
    }

    #[test]
    fn test_rule_based_is_capped_and_leads_with_claim_rate() {
        let mut inputs = inputs();
        inputs.series.claimed = vec![1; 14];
        inputs.risk = vec![risk_row(1, 0.9)];
        inputs.summary.donors = 3;
        inputs.summary.recipients = 3;
        let insights = rule_based_insights(&inputs);
        assert_eq!(insights.len(), MAX_RULE_INSIGHTS);
        assert!(insights[0].contains("claim rate"));
    }

    #[test]
    fn test_fallback_lines() {
        let mut summary = inputs().summary;
        summary.claim_rate = 0.5;
        summary.total_claimed = 5;
        summary.total_items = 10;
        let lines = fallback_insights(&summary);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Platform claim rate: 50.0% (5/10 items)");
    }
}
