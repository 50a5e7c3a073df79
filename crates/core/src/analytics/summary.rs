//! Platform-wide counts.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::round_to;
use crate::{Item, ItemStatus, User};

/// Headline numbers for the analytics dashboard.
///
/// `total_claimed + total_unclaimed == total_items` always holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub total_items: usize,
    pub total_claimed: usize,
    pub total_unclaimed: usize,
    /// `total_claimed / total_items` to 4 decimals, `0.0` with no items.
    pub claim_rate: f64,
    pub donors: usize,
    /// Every non-donor account, admins included.
    pub recipients: usize,
    /// Items whose expiry is at or before `now + 24h`, already-expired
    /// items included.
    pub items_expiring_next_24h: usize,
}

/// Compute the [`Summary`] of a snapshot at `now`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(items: &[Item], users: &[User], now: DateTime<Utc>) -> Summary {
    let total_items = items.len();
    let total_claimed = items
        .iter()
        .filter(|item| item.status == ItemStatus::Claimed)
        .count();

    let claim_rate = if total_items == 0 {
        0.0
    } else {
        round_to(total_claimed as f64 / total_items as f64, 4)
    };

    let donors: HashSet<_> = users
        .iter()
        .filter(|u| u.role.is_donor())
        .map(|u| u.id)
        .collect();
    let recipients: HashSet<_> = users
        .iter()
        .filter(|u| !u.role.is_donor())
        .map(|u| u.id)
        .collect();

    let cutoff = now + Duration::hours(24);
    let items_expiring_next_24h = items.iter().filter(|item| item.expires_by(cutoff)).count();

    Summary {
        total_items,
        total_claimed,
        total_unclaimed: total_items - total_claimed,
        claim_rate,
        donors: donors.len(),
        recipients: recipients.len(),
        items_expiring_next_24h,
    }
}
