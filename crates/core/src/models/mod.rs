//! Domain records.
//!
//! These are the shapes the server returns over JSON and the analytics core
//! reads from a [`crate::analytics::Snapshot`]. The `New*` types are the
//! validated inputs for inserts.

pub mod event;
pub mod item;
pub mod organization;
pub mod user;

pub use event::{Event, NewEvent, event_types};
pub use item::{Item, ItemClaim, ItemWithOrganization, NewItem};
pub use organization::{NewOrganization, Organization};
pub use user::User;

/// A rejected input, reported to API callers as a 400.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was blank.
    #[error("{field} cannot be empty")]
    Blank {
        /// Field name as it appears in the request body.
        field: &'static str,
    },
    /// A text field was shorter than its minimum.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name as it appears in the request body.
        field: &'static str,
        /// Minimum number of characters.
        min: usize,
    },
    /// A numeric field was outside its allowed range.
    #[error("{field} is out of range: {reason}")]
    OutOfRange {
        /// Field name as it appears in the request body.
        field: &'static str,
        /// Human-readable constraint.
        reason: &'static str,
    },
    /// An email field failed to parse.
    #[error("{field}: {source}")]
    Email {
        /// Field name as it appears in the request body.
        field: &'static str,
        /// Underlying parse failure.
        source: crate::EmailError,
    },
    /// Any other rule violation.
    #[error("{0}")]
    Invalid(String),
}

/// Reject blank (empty or whitespace-only) strings.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

/// Validate an optional email, ignoring blank values.
pub(crate) fn check_optional_email(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => crate::Email::parse(s)
            .map(|_| ())
            .map_err(|source| ValidationError::Email { field, source }),
        _ => Ok(()),
    }
}
