//! Append-only event log.
//!
//! Events are inserted and read back; nothing in the application updates or
//! deletes them.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use foodbridge_core::{Event, EventId, ItemId, NewEvent, OrganizationId, UserId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i32,
    created_at: DateTime<Utc>,
    user_id: Option<i32>,
    item_id: Option<i32>,
    org_id: Option<i32>,
    event_type: String,
    metadata: Json<serde_json::Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::new(row.id),
            created_at: row.created_at,
            user_id: row.user_id.map(UserId::new),
            item_id: row.item_id.map(ItemId::new),
            org_id: row.org_id.map(OrganizationId::new),
            event_type: row.event_type,
            metadata: row.metadata.0,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
        }
    }
}

/// Repository for the event log.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced user, item or
    /// organization does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, event), fields(event_type = %event.event_type))]
    pub async fn append(&self, event: &NewEvent, at: DateTime<Utc>) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(
            "INSERT INTO events (created_at, user_id, item_id, org_id, event_type, metadata,
                                 ip_address, user_agent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, created_at, user_id, item_id, org_id, event_type, metadata,
                       ip_address, user_agent",
        )
        .bind(at)
        .bind(event.user_id)
        .bind(event.item_id)
        .bind(event.org_id)
        .bind(event.event_type.trim())
        .bind(Json(&event.metadata))
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        Ok(row.into())
    }
}
