//! FoodBridge Core - shared types and the analytics engine.
//!
//! This crate is used by every FoodBridge component:
//! - `server` - JSON HTTP API for items, organizations and analytics
//! - `cli` - Migrations, demo data and offline analytics reports
//!
//! # Architecture
//!
//! The core crate does no I/O: no database access, no HTTP clients. Analytics
//! are pure functions over an in-memory [`analytics::Snapshot`] plus a
//! timestamp from a [`Clock`], so every computation is reproducible in tests.
//! The one external collaborator, the language-model insight generator, sits
//! behind the [`analytics::insights::InsightGenerator`] trait and is supplied
//! by the caller.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, statuses and roles
//! - [`models`] - Item, user, organization and event records
//! - [`clock`] - Injectable time source
//! - [`analytics`] - Summary, bucketing, forecasting, risk, cohorts and insights

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod clock;
pub mod models;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use models::*;
pub use types::*;
