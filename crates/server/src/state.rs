//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use foodbridge_core::analytics::insights::InsightGenerator;
use foodbridge_core::{Clock, SystemClock};

use crate::claude::{ClaudeClient, ClaudeError};
use crate::config::ServerConfig;
use crate::services::{ClaudeInsightGenerator, EmailError, EmailService};

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("email service: {0}")]
    Email(#[from] EmailError),
    #[error("claude client: {0}")]
    Claude(#[from] ClaudeError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Every collaborator (pool, clock, mailer,
/// insight generator) is built once in `main` and injected here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    clock: Arc<dyn Clock>,
    email: EmailService,
    insights: Option<Arc<dyn InsightGenerator>>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Email runs in log-only mode without SMTP settings, and detailed
    /// insights are disabled without a Claude API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport or Claude client cannot be built.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, StateError> {
        let email = match &config.email {
            Some(email_config) => EmailService::new(email_config)?,
            None => EmailService::log_only(),
        };
        let insights = match &config.claude {
            Some(claude_config) => {
                let client = ClaudeClient::new(claude_config)?;
                Some(Arc::new(ClaudeInsightGenerator::new(client)) as Arc<dyn InsightGenerator>)
            }
            None => None,
        };

        tracing::info!(
            email_sending = email.is_sending(),
            model_insights = insights.is_some(),
            "Application state ready"
        );

        Ok(Self::from_parts(
            config,
            pool,
            Arc::new(SystemClock),
            email,
            insights,
        ))
    }

    /// Assemble state from already-built collaborators.
    #[must_use]
    pub fn from_parts(
        config: ServerConfig,
        pool: PgPool,
        clock: Arc<dyn Clock>,
        email: EmailService,
        insights: Option<Arc<dyn InsightGenerator>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                clock,
                email,
                insights,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The current-time source.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// The model insight generator, if configured.
    #[must_use]
    pub fn insights(&self) -> Option<&dyn InsightGenerator> {
        self.inner.insights.as_deref()
    }
}
