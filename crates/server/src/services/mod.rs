//! Outbound services: email delivery and model-written insights.

pub mod email;
pub mod insights;

pub use email::{Claimer, EmailError, EmailService};
pub use insights::ClaudeInsightGenerator;
