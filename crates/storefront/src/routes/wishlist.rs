//! Account wishlist route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use diamant_rouge_core::{ProductId, WishlistEntry};

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::LocaleQuery;
use super::cart::Removed;

/// Add-to-wishlist request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    pub product_id: ProductId,
}

/// List the wishlist, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleQuery>,
) -> Result<Json<Vec<WishlistEntry>>, AppError> {
    let entries = WishlistRepository::new(state.pool())
        .list(user.id, locale.resolve(&state))
        .await?;
    Ok(Json(entries))
}

/// Add a product. Adding a product already in the wishlist returns the existing entry.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleQuery>,
    Json(body): Json<AddEntryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !ProductRepository::new(state.pool())
        .exists(body.product_id)
        .await?
    {
        return Err(AppError::NotFound("Product".to_string()));
    }

    let wishlist = WishlistRepository::new(state.pool());
    let id = wishlist.add(user.id, body.product_id).await?;
    let entry = wishlist.get(id, locale.resolve(&state)).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Remove a product. Removing a product that is not in the wishlist is not an error.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Removed>, AppError> {
    let removed = WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    Ok(Json(Removed {
        removed: u64::from(removed),
    }))
}
