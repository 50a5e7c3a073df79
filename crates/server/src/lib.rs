//! FoodBridge Server - JSON HTTP API for the surplus-food marketplace.
//!
//! Donor organizations list surplus food, recipients claim it, and an
//! analytics API reports on the platform from a fresh database snapshot.
//!
//! # Architecture
//!
//! - Axum web framework, JSON in and out
//! - `PostgreSQL` via sqlx repositories (see [`db`])
//! - Askama templates for claim notification emails, sent with lettre
//! - Claude API for optional model-written insights
//! - Analytics computed in memory by `foodbridge-core`
//!
//! The binary in `main.rs` wires configuration, tracing, Sentry and the
//! database pool together; everything else lives here so tests can build the
//! router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::app;
pub use state::AppState;
