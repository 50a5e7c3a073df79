//! Status and role enums.
//!
//! Both are stored as lowercase `TEXT` columns and round-trip through
//! [`std::str::FromStr`] / [`std::fmt::Display`].

use serde::{Deserialize, Serialize};

/// Lifecycle state of a listed food item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Available to be claimed.
    #[default]
    Listed,
    /// Reserved by a recipient. Always carries a `claimed_at` timestamp.
    Claimed,
    /// Passed its expiry without being claimed.
    Expired,
    /// Pulled by the donor.
    Withdrawn,
}

impl ItemStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Listed, Self::Claimed, Self::Expired, Self::Withdrawn];

    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Listed => "listed",
            Self::Claimed => "claimed",
            Self::Expired => "expired",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Whether a recipient may still claim the item.
    #[must_use]
    pub const fn is_claimable(self) -> bool {
        matches!(self, Self::Listed)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listed" => Ok(Self::Listed),
            "claimed" => Ok(Self::Claimed),
            "expired" => Ok(Self::Expired),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(format!("invalid item status: {s}")),
        }
    }
}

/// Account role.
///
/// Anything other than [`UserRole::Donor`] counts as a recipient in the
/// platform summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Regular account that claims food.
    #[default]
    User,
    /// Account that lists food on behalf of an organization.
    Donor,
    /// Platform operator.
    Admin,
}

impl UserRole {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Donor => "donor",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn is_donor(self) -> bool {
        matches!(self, Self::Donor)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "donor" => Ok(Self::Donor),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}
