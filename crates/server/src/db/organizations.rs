//! Organization repository.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use foodbridge_core::{NewOrganization, Organization, OrganizationId};

use super::RepositoryError;

pub(super) const ORGANIZATION_COLUMNS: &str = "id, name, type, address, lat, lng, phone, email";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct OrganizationRow {
    id: i32,
    name: String,
    #[sqlx(rename = "type")]
    kind: String,
    address: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    phone: Option<String>,
    email: Option<String>,
}

impl From<OrganizationRow> for Organization {
    fn from(row: OrganizationRow) -> Self {
        Self {
            id: OrganizationId::new(row.id),
            name: row.name,
            kind: row.kind,
            address: row.address,
            lat: row.lat,
            lng: row.lng,
            phone: row.phone,
            email: row.email,
        }
    }
}

/// Repository for organization database operations.
pub struct OrganizationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrganizationRepository<'a> {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Newest organizations first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Organization>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an organization by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrganizationId) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a new organization.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: &NewOrganization) -> Result<Organization, RepositoryError> {
        let row = sqlx::query_as::<_, OrganizationRow>(&format!(
            "INSERT INTO organizations (name, type, address, lat, lng, phone, email, capacity)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ORGANIZATION_COLUMNS}"
        ))
        .bind(new.name.trim())
        .bind(new.kind.trim())
        .bind(&new.address)
        .bind(new.lat)
        .bind(new.lng)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(Json(&new.capacity))
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        Ok(row.into())
    }
}
