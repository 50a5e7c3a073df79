//! Donor organizations.

use serde::{Deserialize, Serialize};

use super::{ValidationError, check_optional_email, require_text};
use crate::OrganizationId;

/// A restaurant, grocer, pantry or other donor organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    /// Free-form organization type, e.g. `restaurant` or `grocery`.
    #[serde(rename = "type")]
    pub kind: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Input for registering an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrganization {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Storage capacity notes (fridge/freezer space etc.), stored as JSON.
    #[serde(default = "empty_object")]
    pub capacity: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl NewOrganization {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank name or type, coordinates
    /// outside the valid latitude/longitude ranges, or a malformed email.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("type", &self.kind)?;

        if self.lat.is_some_and(|lat| !(-90.0..=90.0).contains(&lat)) {
            return Err(ValidationError::OutOfRange {
                field: "lat",
                reason: "must be between -90 and 90",
            });
        }
        if self.lng.is_some_and(|lng| !(-180.0..=180.0).contains(&lng)) {
            return Err(ValidationError::OutOfRange {
                field: "lng",
                reason: "must be between -180 and 180",
            });
        }

        check_optional_email("email", self.email.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_field_is_renamed_on_the_wire() {
        let json = r#"{"name": "Corner Deli", "type": "restaurant"}"#;
        let org: NewOrganization = serde_json::from_str(json).expect("deserialize");
        assert_eq!(org.kind, "restaurant");
        assert_eq!(org.capacity, serde_json::json!({}));
        assert_eq!(org.validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        let json = r#"{"name": "Deli", "type": "restaurant", "lat": 91.0}"#;
        let org: NewOrganization = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(
            org.validate(),
            Err(ValidationError::OutOfRange { field: "lat", .. })
        ));
    }

    #[test]
    fn test_rejects_blank_name() {
        let json = r#"{"name": "", "type": "pantry"}"#;
        let org: NewOrganization = serde_json::from_str(json).expect("deserialize");
        assert_eq!(org.validate(), Err(ValidationError::Blank { field: "name" }));
    }
}
