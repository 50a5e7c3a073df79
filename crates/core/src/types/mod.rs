//! Core types for FoodBridge.
//!
//! Type-safe wrappers for IDs, emails, item statuses and user roles.

pub mod email;
pub mod id;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
