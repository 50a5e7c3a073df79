//! Donated food items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Organization, ValidationError, check_optional_email, require_text};
use crate::{ItemId, ItemStatus, OrganizationId, UserId};

/// A unit of donated food listed by an organization.
///
/// `status == Claimed` implies `claimed_at` is set. The claim operation is the
/// only writer of the claim fields and the `items` table enforces it with a
/// `CHECK` constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub org_id: OrganizationId,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    pub storage_type: Option<String>,
    /// Fractional quantities are allowed (e.g. 2.5 kg).
    pub quantity: Option<f64>,
    pub ready_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub pickup_window: Option<String>,
    pub status: ItemStatus,
    pub photo_url: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub claimed_by_name: Option<String>,
    pub claimed_by_phone: Option<String>,
    pub claimed_by_email: Option<String>,
    pub claimed_by_user_id: Option<UserId>,
    pub donated_by_user_id: Option<UserId>,
}

impl Item {
    /// Quantity used by the risk scorer when none was recorded.
    pub const DEFAULT_QUANTITY: f64 = 1.0;

    /// Recorded quantity, or [`Item::DEFAULT_QUANTITY`].
    #[must_use]
    pub fn quantity_or_default(&self) -> f64 {
        self.quantity.unwrap_or(Self::DEFAULT_QUANTITY)
    }

    /// Whether the item has a non-null expiry at or before `cutoff`.
    #[must_use]
    pub fn expires_by(&self, cutoff: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= cutoff)
    }
}

/// Item detail response: the item plus its organization, when it still exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemWithOrganization {
    #[serde(flatten)]
    pub item: Item,
    pub organization: Option<Organization>,
}

/// Input for listing a new item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    pub org_id: OrganizationId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub ready_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pickup_window: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Donor account, when the caller acts on behalf of one.
    #[serde(default)]
    pub donated_by_user_id: Option<UserId>,
}

impl NewItem {
    /// Check the input before it reaches the database.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank title, a negative or
    /// non-finite quantity, an expiry before the ready time, or an initial
    /// status of `claimed` (claims go through the claim operation).
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;

        if let Some(quantity) = self.quantity
            && (!quantity.is_finite() || quantity < 0.0)
        {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                reason: "must be a non-negative number",
            });
        }

        if let (Some(ready), Some(expires)) = (self.ready_at, self.expires_at)
            && expires < ready
        {
            return Err(ValidationError::Invalid(
                "expires_at must not be before ready_at".to_string(),
            ));
        }

        if self.status == ItemStatus::Claimed {
            return Err(ValidationError::Invalid(
                "items cannot be created in the claimed state".to_string(),
            ));
        }

        Ok(())
    }
}

/// Claim request for a listed item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemClaim {
    pub claimer_name: String,
    #[serde(default)]
    pub claimer_phone: Option<String>,
    #[serde(default)]
    pub claimer_email: Option<String>,
    /// Recipient account, when the caller is signed in.
    #[serde(default)]
    pub user_id: Option<UserId>,
}

impl ItemClaim {
    /// Minimum length of the claimer's name, in characters.
    pub const MIN_NAME_LENGTH: usize = 2;

    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name is too short or the email
    /// is malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.claimer_name.trim().chars().count() < Self::MIN_NAME_LENGTH {
            return Err(ValidationError::TooShort {
                field: "claimer_name",
                min: Self::MIN_NAME_LENGTH,
            });
        }
        check_optional_email("claimer_email", self.claimer_email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item() -> NewItem {
        NewItem {
            org_id: OrganizationId::new(1),
            title: "Bagels".to_string(),
            description: None,
            category: Some("Bakery".to_string()),
            allergens: vec!["gluten".to_string()],
            storage_type: None,
            quantity: Some(12.0),
            ready_at: None,
            expires_at: None,
            pickup_window: None,
            status: ItemStatus::Listed,
            photo_url: None,
            donated_by_user_id: None,
        }
    }

    #[test]
    fn test_new_item_validates() {
        assert_eq!(new_item().validate(), Ok(()));
    }

    #[test]
    fn test_new_item_rejects_blank_title() {
        let item = NewItem {
            title: "  ".to_string(),
            ..new_item()
        };
        assert_eq!(
            item.validate(),
            Err(ValidationError::Blank { field: "title" })
        );
    }

    #[test]
    fn test_new_item_rejects_negative_quantity() {
        let item = NewItem {
            quantity: Some(-1.0),
            ..new_item()
        };
        assert!(matches!(
            item.validate(),
            Err(ValidationError::OutOfRange { field: "quantity", .. })
        ));
    }

    #[test]
    fn test_new_item_rejects_claimed_status() {
        let item = NewItem {
            status: ItemStatus::Claimed,
            ..new_item()
        };
        assert!(matches!(item.validate(), Err(ValidationError::Invalid(_))));
    }

    #[test]
    fn test_new_item_status_defaults_to_listed() {
        let json = r#"{"org_id": 3, "title": "Soup"}"#;
        let item: NewItem = serde_json::from_str(json).expect("deserialize");
        assert_eq!(item.status, ItemStatus::Listed);
        assert!(item.allergens.is_empty());
    }

    #[test]
    fn test_claim_requires_two_character_name() {
        let claim = ItemClaim {
            claimer_name: "A".to_string(),
            claimer_phone: None,
            claimer_email: None,
            user_id: None,
        };
        assert_eq!(
            claim.validate(),
            Err(ValidationError::TooShort {
                field: "claimer_name",
                min: 2
            })
        );

        let claim = ItemClaim {
            claimer_name: "Al".to_string(),
            ..claim
        };
        assert_eq!(claim.validate(), Ok(()));
    }

    #[test]
    fn test_claim_rejects_malformed_email() {
        let claim = ItemClaim {
            claimer_name: "Alex".to_string(),
            claimer_phone: None,
            claimer_email: Some("alex-at-example".to_string()),
            user_id: None,
        };
        assert!(matches!(
            claim.validate(),
            Err(ValidationError::Email { field: "claimer_email", .. })
        ));
    }
}
