//! Shopper profile route handlers.
//!
//! The member status is shown but never changed here; it is assigned by staff.

use axum::{Json, extract::State};
use tracing::instrument;

use diamant_rouge_core::{PreferencesUpdate, Profile, ShippingAddress};

use crate::db::{ProfileRepository, RepositoryError};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Show the signed-in shopper's profile.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Profile>, AppError> {
    let profile = ProfileRepository::new(state.pool())
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;
    Ok(Json(profile))
}

/// Replace the shipping address. Blank fields are cleared.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_address(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ShippingAddress>,
) -> Result<Json<Profile>, AppError> {
    let address = body
        .normalized()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = ProfileRepository::new(state.pool())
        .update_address(user.id, &address)
        .await
        .map_err(profile_missing)?;

    add_breadcrumb("profile", "Updated shipping address", None);
    Ok(Json(profile))
}

/// Update jewelry preferences. Lists left out keep their value.
#[instrument(skip(state, user, body), fields(user_id = %user.id))]
pub async fn update_preferences(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<PreferencesUpdate>,
) -> Result<Json<Profile>, AppError> {
    let update = body
        .normalized()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let profile = ProfileRepository::new(state.pool())
        .update_preferences(user.id, &update)
        .await
        .map_err(profile_missing)?;

    add_breadcrumb("profile", "Updated preferences", None);
    Ok(Json(profile))
}

/// A session whose account row is gone reads as a missing profile.
fn profile_missing(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => AppError::NotFound("Profile".to_string()),
        other => AppError::Database(other),
    }
}
