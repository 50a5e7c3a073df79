//! Point-in-time snapshots for the analytics core.

use sqlx::PgPool;
use tracing::instrument;

use foodbridge_core::analytics::Snapshot;
use foodbridge_core::{Item, Organization, User};

use super::RepositoryError;
use super::items::{ITEM_COLUMNS, ItemRow};
use super::organizations::{ORGANIZATION_COLUMNS, OrganizationRow};
use super::users::{USER_COLUMNS, UserRow};

/// Loads [`Snapshot`]s inside read-only transactions.
pub struct SnapshotRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SnapshotRepository<'a> {
    /// Create a new snapshot repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Read every item, user and organization in one consistent view.
    ///
    /// Rows come back in ID order so that order-sensitive outputs (ties in
    /// the risk ranking) are reproducible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Snapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let items = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Item::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let users = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let organizations: Vec<Organization> = sqlx::query_as::<_, OrganizationRow>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations ORDER BY id"
        ))
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        tx.commit().await?;

        tracing::debug!(
            items = items.len(),
            users = users.len(),
            organizations = organizations.len(),
            "snapshot loaded"
        );

        Ok(Snapshot {
            items,
            users,
            organizations,
        })
    }
}
