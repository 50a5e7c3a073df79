//! Claude-backed [`InsightGenerator`].

use async_trait::async_trait;

use foodbridge_core::analytics::insights::{
    InsightContext, InsightError, InsightGenerator, analytics_prompt, parse_model_response,
};

use crate::claude::{ClaudeClient, ClaudeError};

const SYSTEM_PROMPT: &str = "You are a food waste reduction analyst writing actionable insights \
     for FoodBridge, a platform connecting surplus-food donors with recipients.";
const TEMPERATURE: f32 = 0.7;

/// Generates insights by prompting Claude with the analytics context.
#[derive(Clone)]
pub struct ClaudeInsightGenerator {
    client: ClaudeClient,
}

impl ClaudeInsightGenerator {
    #[must_use]
    pub const fn new(client: ClaudeClient) -> Self {
        Self { client }
    }
}

impl From<ClaudeError> for InsightError {
    fn from(err: ClaudeError) -> Self {
        match err {
            ClaudeError::RateLimited(_) => Self::RateLimited(err.to_string()),
            ClaudeError::Parse(message) => Self::InvalidResponse(message),
            ClaudeError::Config(_) => Self::Unavailable,
            other => Self::Upstream(other.to_string()),
        }
    }
}

#[async_trait]
impl InsightGenerator for ClaudeInsightGenerator {
    fn available(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        self.client.model()
    }

    async fn generate(&self, context: &InsightContext) -> Result<Vec<String>, InsightError> {
        let prompt = analytics_prompt(context);
        let response = self
            .client
            .complete(&prompt, Some(SYSTEM_PROMPT), Some(TEMPERATURE))
            .await?;

        Ok(parse_model_response(response.text().trim()))
    }
}
