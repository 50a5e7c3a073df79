//! Item API handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use foodbridge_core::{
    Item, ItemClaim, ItemId, ItemStatus, ItemWithOrganization, NewEvent, NewItem, event_types,
};

use super::bounded;
use crate::db::{
    ClaimOutcome, EventRepository, ItemFilter, ItemRepository, OrganizationRepository,
    UserRepository,
};
use crate::error::AppError;
use crate::middleware::ClientContext;
use crate::services::Claimer;
use crate::state::AppState;

/// Build the items router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item))
        .route("/items/{id}/claim", post(claim_item))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl ListParams {
    fn into_filter(self) -> Result<ItemFilter, AppError> {
        let limit = bounded("limit", self.limit, 50, 1..=200)?;
        let status = self
            .status
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<ItemStatus>())
            .transpose()
            .map_err(AppError::BadRequest)?;
        let query = self
            .q
            .map(|q| q.trim().to_owned())
            .filter(|q| !q.is_empty());

        Ok(ItemFilter {
            status,
            query,
            limit: i64::try_from(limit).unwrap_or(i64::MAX),
        })
    }
}

/// List items, soonest expiry first.
///
/// # Errors
///
/// Returns 400 for an unknown status or an out-of-range limit.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Item>>, AppError> {
    let filter = params.into_filter()?;
    let items = ItemRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(items))
}

/// List a new item.
///
/// # Errors
///
/// Returns 400 for invalid input and 409 for an unknown organization.
pub async fn create_item(
    State(state): State<AppState>,
    Json(new): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), AppError> {
    new.validate()?;
    let item = ItemRepository::new(state.pool()).create(&new).await?;
    tracing::info!(item_id = %item.id, org_id = %item.org_id, "Item listed");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Item detail including its organization.
///
/// # Errors
///
/// Returns 404 if the item does not exist.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemWithOrganization>, AppError> {
    ItemRepository::new(state.pool())
        .get_with_organization(ItemId::new(id))
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
}

/// Claim a listed item.
///
/// Notification emails and the `item_claimed` event are best-effort: their
/// failures are logged and never undo or fail the claim.
///
/// # Errors
///
/// Returns 400 for an invalid claim, 404 if the item does not exist and 409
/// if it is no longer listed.
pub async fn claim_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    client: ClientContext,
    Json(claim): Json<ItemClaim>,
) -> Result<Json<Item>, AppError> {
    claim.validate()?;
    let claimed_at = state.clock().now();

    let outcome = ItemRepository::new(state.pool())
        .claim(ItemId::new(id), &claim, claimed_at)
        .await?;

    let item = match outcome {
        ClaimOutcome::Claimed(item) => item,
        ClaimOutcome::NotFound => return Err(AppError::NotFound("Item not found".to_string())),
        ClaimOutcome::Unavailable(status) => {
            tracing::info!(item_id = id, status = %status, "Claim rejected");
            return Err(AppError::Conflict("Item is no longer available".to_string()));
        }
    };
    tracing::info!(item_id = %item.id, "Item claimed");

    notify_claim(&state, &item, &claim, claimed_at).await;
    record_claim_event(&state, &item, &claim, client).await;

    Ok(Json(item))
}

async fn notify_claim(state: &AppState, item: &Item, claim: &ItemClaim, claimed_at: DateTime<Utc>) {
    let org = match OrganizationRepository::new(state.pool()).get(item.org_id).await {
        Ok(Some(org)) => org,
        Ok(None) => {
            tracing::warn!(item_id = %item.id, org_id = %item.org_id, "Claimed item has no organization");
            return;
        }
        Err(e) => {
            tracing::warn!(item_id = %item.id, error = %e, "Could not load organization for claim emails");
            return;
        }
    };

    let recipient = match (&claim.claimer_email, claim.user_id) {
        (Some(email), _) => Some(email.clone()),
        (None, Some(user_id)) => match UserRepository::new(state.pool()).get(user_id).await {
            Ok(user) => user.map(|u| u.email.into_inner()),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Could not load claimer");
                None
            }
        },
        (None, None) => None,
    };

    let email = state.email();
    let claimer_name = claim.claimer_name.trim();

    if let Some(to) = recipient.as_deref()
        && let Err(e) = email
            .send_claim_confirmation(to, claimer_name, item, &org)
            .await
    {
        tracing::warn!(item_id = %item.id, error = %e, "Claim confirmation email failed");
    }

    let claimer = Claimer {
        name: claimer_name,
        email: claim.claimer_email.as_deref(),
        phone: claim.claimer_phone.as_deref(),
    };
    if let Err(e) = email
        .send_new_claim_notice(item, &org, &claimer, claimed_at)
        .await
    {
        tracing::warn!(item_id = %item.id, error = %e, "New claim notice email failed");
    }
}

async fn record_claim_event(state: &AppState, item: &Item, claim: &ItemClaim, client: ClientContext) {
    let event = NewEvent {
        user_id: claim.user_id,
        item_id: Some(item.id),
        org_id: Some(item.org_id),
        metadata: json!({
            "claimer_name": claim.claimer_name,
            "claimer_phone": claim.claimer_phone,
            "claimer_email": claim.claimer_email,
        }),
        ..NewEvent::new(event_types::ITEM_CLAIMED)
    }
    .with_request(client.ip_address, client.user_agent);

    if let Err(e) = EventRepository::new(state.pool())
        .append(&event, state.clock().now())
        .await
    {
        tracing::warn!(item_id = %item.id, error = %e, "Claim event log failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(status: Option<&str>, q: Option<&str>, limit: Option<i64>) -> ListParams {
        ListParams {
            status: status.map(str::to_owned),
            q: q.map(str::to_owned),
            limit,
        }
    }

    #[test]
    fn test_list_params_defaults() {
        let filter = params(None, Some("  "), None).into_filter().expect("valid");
        assert_eq!(filter.limit, 50);
        assert_eq!(filter.status, None);
        assert_eq!(filter.query, None);
    }

    #[test]
    fn test_list_params_parse_status_and_query() {
        let filter = params(Some("claimed"), Some(" bread "), Some(200))
            .into_filter()
            .expect("valid");
        assert_eq!(filter.status, Some(ItemStatus::Claimed));
        assert_eq!(filter.query.as_deref(), Some("bread"));
        assert_eq!(filter.limit, 200);
    }

    #[test]
    fn test_list_params_reject_bad_input() {
        assert!(matches!(
            params(Some("eaten"), None, None).into_filter(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            params(None, None, Some(201)).into_filter(),
            Err(AppError::BadRequest(_))
        ));
    }
}
