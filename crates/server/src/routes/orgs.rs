//! Organization API handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use foodbridge_core::{NewOrganization, Organization};

use crate::db::OrganizationRepository;
use crate::error::AppError;
use crate::state::AppState;

const RECENT_LIMIT: i64 = 100;

/// Build the organizations router.
pub fn router() -> Router<AppState> {
    Router::new().route("/orgs", get(list_orgs).post(create_org))
}

/// Most recently registered organizations.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list_orgs(State(state): State<AppState>) -> Result<Json<Vec<Organization>>, AppError> {
    let orgs = OrganizationRepository::new(state.pool())
        .list_recent(RECENT_LIMIT)
        .await?;
    Ok(Json(orgs))
}

/// Register an organization.
///
/// # Errors
///
/// Returns 400 for invalid input.
pub async fn create_org(
    State(state): State<AppState>,
    Json(new): Json<NewOrganization>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    new.validate()?;
    let org = OrganizationRepository::new(state.pool()).create(&new).await?;
    tracing::info!(org_id = %org.id, kind = %org.kind, "Organization registered");
    Ok((StatusCode::CREATED, Json(org)))
}
