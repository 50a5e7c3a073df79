//! Spoilage risk scoring for items still waiting to be claimed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::round_to;
use crate::{Item, ItemId, ItemStatus, OrganizationId};

/// Hours-left stand-in for items without an expiry.
pub const NO_EXPIRY_HOURS: f64 = 9999.0;

/// Weight of each unit of quantity in the score.
pub const QUANTITY_WEIGHT: f64 = 0.05;

/// Category label for items without one.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// `1 / (1 + hours_left) + 0.05 * quantity`, unrounded.
///
/// Strictly decreasing in `hours_left` for a fixed quantity.
///
/// ```
/// use foodbridge_core::analytics::risk_score;
///
/// assert!((risk_score(0.0, 1.0) - 1.05).abs() < 1e-12);
/// ```
#[must_use]
pub fn risk_score(hours_left: f64, quantity: f64) -> f64 {
    QUANTITY_WEIGHT.mul_add(quantity, 1.0 / (1.0 + hours_left))
}

/// One scored item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskItem {
    pub id: ItemId,
    pub title: String,
    pub category: String,
    pub org_id: OrganizationId,
    pub expires_at: Option<DateTime<Utc>>,
    /// Hours until expiry to 2 decimals; `None` when the item never expires.
    pub hours_left: Option<f64>,
    pub quantity: Option<f64>,
    /// Score to 4 decimals.
    pub risk_score: f64,
}

/// Risk endpoint payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskReport {
    pub items: Vec<RiskItem>,
}

/// Score listed, unexpired items and return the `limit` riskiest.
///
/// Items with an expiry before `now` are skipped; items without one use
/// [`NO_EXPIRY_HOURS`]. Ordering is by descending unrounded score and
/// stable, so exact ties keep their input order; only the reported score is
/// rounded.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score_items(items: &[Item], now: DateTime<Utc>, limit: usize) -> Vec<RiskItem> {
    let mut scored: Vec<(f64, RiskItem)> = items
        .iter()
        .filter(|item| item.status == ItemStatus::Listed)
        .filter(|item| item.expires_at.is_none_or(|at| at >= now))
        .map(|item| {
            let hours_left = item.expires_at.map_or(NO_EXPIRY_HOURS, |at| {
                ((at - now).num_milliseconds() as f64 / 3_600_000.0).max(0.0)
            });

            let raw = risk_score(hours_left, item.quantity_or_default());
            let row = RiskItem {
                id: item.id,
                title: item.title.clone(),
                category: item
                    .category
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_owned()),
                org_id: item.org_id,
                expires_at: item.expires_at,
                hours_left: item.expires_at.map(|_| round_to(hours_left, 2)),
                quantity: item.quantity,
                risk_score: round_to(raw, 4),
            };
            (raw, row)
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, row)| row).collect()
}
