//! External insight generator capability.

use async_trait::async_trait;

use super::context::InsightContext;

/// Errors from an [`InsightGenerator`].
#[derive(thiserror::Error, Debug)]
pub enum InsightError {
    /// The generator is not configured.
    #[error("insight generator is not configured")]
    Unavailable,

    /// The upstream model rejected the request for rate or quota reasons.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The upstream call failed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The model answered with nothing usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A language model (or anything else) that turns an [`InsightContext`] into
/// insight strings.
///
/// Implementations are optional collaborators: the rule-based insights are
/// always available without one.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Whether the generator is configured and may be called.
    fn available(&self) -> bool;

    /// Model identifier reported alongside generated insights.
    fn model(&self) -> &str;

    /// Produce insights for `context`.
    ///
    /// # Errors
    ///
    /// Returns an [`InsightError`] when the generator is unavailable or the
    /// upstream call fails.
    async fn generate(&self, context: &InsightContext) -> Result<Vec<String>, InsightError>;
}
