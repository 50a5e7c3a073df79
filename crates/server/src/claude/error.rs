//! Failures of an insight completion request.
//!
//! Every variant ends up as an [`InsightError`] in the insight adapter, where
//! the detailed explain endpoint falls back to rule-based insights.
//!
//! [`InsightError`]: foodbridge_core::analytics::insights::InsightError

use serde::Deserialize;
use thiserror::Error;

/// Why a completion could not produce text.
#[derive(Debug, Error)]
pub enum ClaudeError {
    /// Transport failure before a status code was seen.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status with the model's own error kind.
    #[error("model rejected request ({kind}): {message}")]
    Api { kind: String, message: String },

    /// 429; the value is the `Retry-After` delay in seconds.
    #[error("model quota exhausted, retry in {0}s")]
    RateLimited(u64),

    /// 401; the configured key was refused.
    #[error("model credentials rejected: {0}")]
    Unauthorized(String),

    /// A 2xx body that is not a completion.
    #[error("unreadable completion: {0}")]
    Parse(String),

    /// The key cannot be sent as a header.
    #[error("insight model misconfigured: {0}")]
    Config(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl ClaudeError {
    /// Build a [`ClaudeError::Api`] from an error response body.
    ///
    /// Bodies that are not the JSON error envelope (proxy pages, timeouts)
    /// are kept verbatim with the kind `unknown`.
    pub(crate) fn from_body(body: &str) -> Self {
        serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
            |_| Self::Api {
                kind: "unknown".to_owned(),
                message: body.to_owned(),
            },
            |envelope| Self::Api {
                kind: envelope.error.kind,
                message: envelope.error.message,
            },
        )
    }
}
