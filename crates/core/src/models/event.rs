//! Append-only audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, require_text};
use crate::{EventId, ItemId, OrganizationId, UserId};

/// Well-known `event_type` values written by the server itself.
pub mod event_types {
    /// Written after a successful claim.
    pub const ITEM_CLAIMED: &str = "item_claimed";
}

/// An audit record. Events are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<UserId>,
    pub item_id: Option<ItemId>,
    pub org_id: Option<OrganizationId>,
    pub event_type: String,
    pub metadata: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Input for appending an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEvent {
    pub event_type: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub item_id: Option<ItemId>,
    #[serde(default)]
    pub org_id: Option<OrganizationId>,
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,
    /// Filled in from the request, never from the body.
    #[serde(skip)]
    pub ip_address: Option<String>,
    #[serde(skip)]
    pub user_agent: Option<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl NewEvent {
    /// Maximum stored length of `event_type`.
    pub const MAX_TYPE_LENGTH: usize = 64;
    /// Maximum stored length of `user_agent`; longer values are truncated.
    pub const MAX_USER_AGENT_LENGTH: usize = 255;

    /// An event with no actor, context or metadata.
    #[must_use]
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            user_id: None,
            item_id: None,
            org_id: None,
            metadata: empty_object(),
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach request context, truncating the user agent to the column width.
    #[must_use]
    pub fn with_request(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent =
            user_agent.map(|ua| ua.chars().take(Self::MAX_USER_AGENT_LENGTH).collect());
        self
    }

    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank or overlong `event_type`, or
    /// metadata that is not a JSON object.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("event_type", &self.event_type)?;
        if self.event_type.chars().count() > Self::MAX_TYPE_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "event_type",
                reason: "must be at most 64 characters",
            });
        }
        if !self.metadata.is_object() {
            return Err(ValidationError::Invalid(
                "metadata must be a JSON object".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults_to_empty_object() {
        let event: NewEvent =
            serde_json::from_str(r#"{"event_type": "page_view"}"#).expect("deserialize");
        assert_eq!(event.metadata, serde_json::json!({}));
        assert_eq!(event.validate(), Ok(()));
    }

    #[test]
    fn test_request_context_is_not_read_from_body() {
        let event: NewEvent = serde_json::from_str(
            r#"{"event_type": "x", "ip_address": "1.2.3.4", "user_agent": "spoofed"}"#,
        )
        .expect("deserialize");
        assert_eq!(event.ip_address, None);
        assert_eq!(event.user_agent, None);
    }

    #[test]
    fn test_with_request_truncates_user_agent() {
        let event = NewEvent::new("x").with_request(Some("10.0.0.1".into()), Some("a".repeat(300)));
        assert_eq!(event.user_agent.map(|ua| ua.len()), Some(255));
        assert_eq!(event.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_rejects_non_object_metadata() {
        let mut event = NewEvent::new("x");
        event.metadata = serde_json::json!([1, 2]);
        assert!(matches!(event.validate(), Err(ValidationError::Invalid(_))));
    }
}
