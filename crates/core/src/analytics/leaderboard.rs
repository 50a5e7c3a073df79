//! Top locations and contributors.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{Item, Organization, OrganizationId, User, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationCount {
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LocationLeaderboard {
    pub top_donation_locations: Vec<LocationCount>,
    pub top_claim_locations: Vec<LocationCount>,
}

/// Grouping key for a location. Coordinates are compared bit-for-bit.
type LocationKey = (String, Option<u64>, Option<u64>);

/// Coordinates as first seen, plus the running count.
type LocationTally = BTreeMap<LocationKey, (Option<f64>, Option<f64>, usize)>;

/// Rank addresses by donations (items with `ready_at`) and claims (items with
/// `claimed_at`).
///
/// Organizations sharing an address and coordinates are merged. Organizations
/// without an address are skipped. Equal counts are ordered by address.
#[must_use]
pub fn top_locations(
    organizations: &[Organization],
    items: &[Item],
    limit: usize,
) -> LocationLeaderboard {
    let located: HashMap<OrganizationId, &Organization> = organizations
        .iter()
        .filter(|org| org.address.is_some())
        .map(|org| (org.id, org))
        .collect();

    let mut donations = LocationTally::new();
    let mut claims = LocationTally::new();

    for item in items {
        let Some(org) = located.get(&item.org_id) else {
            continue;
        };
        let Some(address) = org.address.as_ref() else {
            continue;
        };
        let key = (
            address.clone(),
            org.lat.map(f64::to_bits),
            org.lng.map(f64::to_bits),
        );
        if item.ready_at.is_some() {
            donations.entry(key.clone()).or_insert((org.lat, org.lng, 0)).2 += 1;
        }
        if item.claimed_at.is_some() {
            claims.entry(key).or_insert((org.lat, org.lng, 0)).2 += 1;
        }
    }

    let rank = |tally: LocationTally| {
        let mut rows: Vec<LocationCount> = tally
            .into_iter()
            .map(|((address, _, _), (lat, lng, count))| LocationCount {
                address,
                lat,
                lng,
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(limit);
        rows
    };

    LocationLeaderboard {
        top_donation_locations: rank(donations),
        top_claim_locations: rank(claims),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DonorEntry {
    pub name: String,
    /// Masked, see [`crate::Email::masked`].
    pub email: String,
    pub donations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipientEntry {
    pub name: String,
    /// Masked, see [`crate::Email::masked`].
    pub email: String,
    pub claims: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ContributorLeaderboard {
    pub top_donors: Vec<DonorEntry>,
    pub top_recipients: Vec<RecipientEntry>,
}

/// Count items per user id, returning `(user, count)` ranked by count, then id.
fn rank_users<'a>(
    users: &'a HashMap<UserId, &'a User>,
    ids: impl Iterator<Item = UserId>,
    limit: usize,
) -> Vec<(&'a User, usize)> {
    let mut counts: BTreeMap<UserId, usize> = BTreeMap::new();
    for id in ids.filter(|id| users.contains_key(id)) {
        *counts.entry(id).or_default() += 1;
    }

    let mut ranked: Vec<(&User, usize)> = counts
        .into_iter()
        .filter_map(|(id, count)| users.get(&id).map(|user| (*user, count)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Rank donors by items donated and recipients by items claimed.
///
/// Emails are masked before they leave this function.
#[must_use]
pub fn top_contributors(users: &[User], items: &[Item], limit: usize) -> ContributorLeaderboard {
    let by_id: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();

    let top_donors = rank_users(
        &by_id,
        items.iter().filter_map(|item| item.donated_by_user_id),
        limit,
    )
    .into_iter()
    .map(|(user, donations)| DonorEntry {
        name: user.name.clone(),
        email: user.email.masked(),
        donations,
    })
    .collect();

    let top_recipients = rank_users(
        &by_id,
        items.iter().filter_map(|item| item.claimed_by_user_id),
        limit,
    )
    .into_iter()
    .map(|(user, claims)| RecipientEntry {
        name: user.name.clone(),
        email: user.email.masked(),
        claims,
    })
    .collect();

    ContributorLeaderboard {
        top_donors,
        top_recipients,
    }
}
