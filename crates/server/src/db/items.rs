//! Item repository: listing, creation and the conditional claim.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use foodbridge_core::{
    Item, ItemClaim, ItemId, ItemStatus, ItemWithOrganization, NewItem, OrganizationId, UserId,
};

use super::{OrganizationRepository, RepositoryError, parse_column};

/// Column list shared by every query returning an [`ItemRow`].
pub(super) const ITEM_COLUMNS: &str = "id, org_id, title, description, category, allergens, \
     storage_type, quantity, ready_at, expires_at, pickup_window, status, photo_url, \
     claimed_at, claimed_by_name, claimed_by_phone, claimed_by_email, \
     claimed_by_user_id, donated_by_user_id";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ItemRow {
    id: i32,
    org_id: i32,
    title: String,
    description: Option<String>,
    category: Option<String>,
    allergens: Json<Vec<String>>,
    storage_type: Option<String>,
    quantity: Option<f64>,
    ready_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    pickup_window: Option<String>,
    status: String,
    photo_url: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    claimed_by_name: Option<String>,
    claimed_by_phone: Option<String>,
    claimed_by_email: Option<String>,
    claimed_by_user_id: Option<i32>,
    donated_by_user_id: Option<i32>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let status: ItemStatus = parse_column(&row.status, "item status")?;
        if status == ItemStatus::Claimed && row.claimed_at.is_none() {
            return Err(RepositoryError::DataCorruption(format!(
                "item {} is claimed without a claim time",
                row.id
            )));
        }

        Ok(Self {
            id: ItemId::new(row.id),
            org_id: OrganizationId::new(row.org_id),
            title: row.title,
            description: row.description,
            category: row.category,
            allergens: row.allergens.0,
            storage_type: row.storage_type,
            quantity: row.quantity,
            ready_at: row.ready_at,
            expires_at: row.expires_at,
            pickup_window: row.pickup_window,
            status,
            photo_url: row.photo_url,
            claimed_at: row.claimed_at,
            claimed_by_name: row.claimed_by_name,
            claimed_by_phone: row.claimed_by_phone,
            claimed_by_email: row.claimed_by_email,
            claimed_by_user_id: row.claimed_by_user_id.map(UserId::new),
            donated_by_user_id: row.donated_by_user_id.map(UserId::new),
        })
    }
}

// =============================================================================
// Filters and Outcomes
// =============================================================================

/// Filters for [`ItemRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub status: Option<ItemStatus>,
    /// Case-insensitive substring of the title or description.
    pub query: Option<String>,
    pub limit: i64,
}

/// Result of a claim attempt.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The item was listed and is now claimed.
    Claimed(Item),
    /// No item has this ID.
    NotFound,
    /// The item exists but is no longer listed.
    Unavailable(ItemStatus),
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for item database operations.
pub struct ItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ItemRepository<'a> {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List items, soonest expiry first, items without expiry last, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ItemFilter) -> Result<Vec<Item>, RepositoryError> {
        let pattern = filter.query.as_deref().map(|q| format!("%{}%", escape_like(q)));

        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL OR title ILIKE $2 OR description ILIKE $2)
             ORDER BY expires_at IS NULL, expires_at ASC, id DESC
             LIMIT $3"
        ))
        .bind(filter.status.map(ItemStatus::as_str))
        .bind(pattern)
        .bind(filter.limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an item by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an item together with the organization listing it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self))]
    pub async fn get_with_organization(
        &self,
        id: ItemId,
    ) -> Result<Option<ItemWithOrganization>, RepositoryError> {
        let Some(item) = self.get(id).await? else {
            return Ok(None);
        };
        let organization = OrganizationRepository::new(self.pool)
            .get(item.org_id)
            .await?;

        Ok(Some(ItemWithOrganization { item, organization }))
    }

    /// Insert a new item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the organization does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, new), fields(org_id = %new.org_id))]
    pub async fn create(&self, new: &NewItem) -> Result<Item, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "INSERT INTO items (org_id, title, description, category, allergens, storage_type,
                                quantity, ready_at, expires_at, pickup_window, status, photo_url,
                                donated_by_user_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(new.org_id)
        .bind(new.title.trim())
        .bind(&new.description)
        .bind(&new.category)
        .bind(Json(&new.allergens))
        .bind(&new.storage_type)
        .bind(new.quantity)
        .bind(new.ready_at)
        .bind(new.expires_at)
        .bind(&new.pickup_window)
        .bind(new.status.as_str())
        .bind(&new.photo_url)
        .bind(new.donated_by_user_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        row.try_into()
    }

    /// Claim a listed item.
    ///
    /// The update only matches while the item is still `listed`, so of two
    /// concurrent claims at most one succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    #[instrument(skip(self, claim))]
    pub async fn claim(
        &self,
        id: ItemId,
        claim: &ItemClaim,
        claimed_at: DateTime<Utc>,
    ) -> Result<ClaimOutcome, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "UPDATE items
             SET status = 'claimed', claimed_at = $2, claimed_by_name = $3,
                 claimed_by_phone = $4, claimed_by_email = $5, claimed_by_user_id = $6
             WHERE id = $1 AND status = 'listed'
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(claimed_at)
        .bind(claim.claimer_name.trim())
        .bind(&claim.claimer_phone)
        .bind(&claim.claimer_email)
        .bind(claim.user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        if let Some(row) = row {
            return Ok(ClaimOutcome::Claimed(row.try_into()?));
        }

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match status {
            None => Ok(ClaimOutcome::NotFound),
            Some(status) => Ok(ClaimOutcome::Unavailable(parse_column(&status, "item status")?)),
        }
    }
}

/// Escape `LIKE` wildcards so the search matches them literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, claimed_at: Option<DateTime<Utc>>) -> ItemRow {
        ItemRow {
            id: 4,
            org_id: 2,
            title: "Sourdough".to_string(),
            description: None,
            category: Some("Bakery".to_string()),
            allergens: Json(vec!["gluten".to_string()]),
            storage_type: None,
            quantity: Some(3.0),
            ready_at: None,
            expires_at: None,
            pickup_window: None,
            status: status.to_string(),
            photo_url: None,
            claimed_at,
            claimed_by_name: None,
            claimed_by_phone: None,
            claimed_by_email: None,
            claimed_by_user_id: None,
            donated_by_user_id: Some(9),
        }
    }

    #[test]
    fn test_row_converts() {
        let item = Item::try_from(row("listed", None)).expect("convert");
        assert_eq!(item.id, ItemId::new(4));
        assert_eq!(item.status, ItemStatus::Listed);
        assert_eq!(item.allergens, vec!["gluten"]);
        assert_eq!(item.donated_by_user_id, Some(UserId::new(9)));
    }

    #[test]
    fn test_row_rejects_unknown_status() {
        assert!(matches!(
            Item::try_from(row("eaten", None)),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_row_rejects_claim_without_time() {
        assert!(matches!(
            Item::try_from(row("claimed", None)),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(Item::try_from(row("claimed", Some(Utc::now()))).is_ok());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_now"), "50\\% off\\_now");
        assert_eq!(escape_like("bread"), "bread");
    }
}
