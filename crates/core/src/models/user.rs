//! Platform accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Email, UserId, UserRole};

/// A donor, recipient or admin account.
///
/// Credentials are managed outside this system; only the profile is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: UserRole,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}
