//! Account cart route handlers.
//!
//! Every handler requires a signed-in shopper. Lines are keyed by
//! (product, variation); adding a key that is already in the cart grows the
//! existing line.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use diamant_rouge_core::{CartLine, CartLineId, NewCartLine, ProductId, Quantity, VariationId};

use crate::db::cart::LineOwner;
use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

use super::LocaleQuery;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: Option<i64>,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: Option<i64>,
}

/// Acknowledgement for deletes.
#[derive(Debug, Serialize)]
pub struct Removed {
    pub removed: u64,
}

/// Parse a requested quantity. Missing or below one is a bad request.
pub(crate) fn require_quantity(raw: Option<i64>) -> Result<Quantity, AppError> {
    let raw = raw.ok_or_else(|| AppError::BadRequest("quantity is required".to_string()))?;
    Quantity::try_from(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Resolve a line the caller is about to change: 404 if missing, 403 if not theirs.
async fn require_own_line(
    carts: &CartRepository<'_>,
    id: CartLineId,
    user: &CurrentUser,
) -> Result<(), AppError> {
    match carts.owner(id, user.id).await? {
        LineOwner::Caller => Ok(()),
        LineOwner::Other => {
            tracing::warn!(line_id = %id, user_id = %user.id, "Cart line owned by another account");
            Err(AppError::Forbidden("Cart line belongs to another account".to_string()))
        }
        LineOwner::Missing => Err(AppError::NotFound("Cart line".to_string())),
    }
}

/// List the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleQuery>,
) -> Result<Json<Vec<CartLine>>, AppError> {
    let lines = CartRepository::new(state.pool())
        .list(user.id, locale.resolve(&state))
        .await?;
    Ok(Json(lines))
}

/// Add a line, or grow the line with the same key.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleQuery>,
    Json(body): Json<AddLineRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quantity = require_quantity(body.quantity)?;

    let products = ProductRepository::new(state.pool());
    if !products.exists(body.product_id).await? {
        return Err(AppError::NotFound("Product".to_string()));
    }
    if let Some(variation_id) = body.variation_id
        && !products.variation_belongs(body.product_id, variation_id).await?
    {
        return Err(AppError::NotFound("Variation".to_string()));
    }

    let carts = CartRepository::new(state.pool());
    let id = carts
        .upsert_add(
            user.id,
            NewCartLine {
                product_id: body.product_id,
                variation_id: body.variation_id,
                quantity,
            },
        )
        .await?;

    let product_id = body.product_id.to_string();
    let added = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str()), ("quantity", added.as_str())]),
    );

    let line = carts.get(id, locale.resolve(&state)).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// Overwrite the quantity of one line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartLineId>,
    Query(locale): Query<LocaleQuery>,
    Json(body): Json<UpdateLineRequest>,
) -> Result<Json<CartLine>, AppError> {
    let quantity = require_quantity(body.quantity)?;

    let carts = CartRepository::new(state.pool());
    require_own_line(&carts, id, &user).await?;
    carts.set_quantity(id, user.id, quantity).await?;

    Ok(Json(carts.get(id, locale.resolve(&state)).await?))
}

/// Remove one line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CartLineId>,
) -> Result<Json<Removed>, AppError> {
    let carts = CartRepository::new(state.pool());
    require_own_line(&carts, id, &user).await?;
    carts.delete(id, user.id).await?;

    Ok(Json(Removed { removed: 1 }))
}

/// Empty the cart.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Removed>, AppError> {
    let removed = CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(Removed { removed }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require_quantity() {
        assert_eq!(require_quantity(Some(3)).unwrap().get(), 3);
        assert!(matches!(
            require_quantity(Some(0)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            require_quantity(Some(-4)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(require_quantity(None), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_add_request_accepts_client_payload() {
        let line = NewCartLine {
            product_id: ProductId::new(7),
            variation_id: Some(VariationId::new(48)),
            quantity: Quantity::new(2).unwrap(),
        };
        let body: AddLineRequest =
            serde_json::from_value(serde_json::to_value(line).unwrap()).unwrap();

        assert_eq!(body.product_id, ProductId::new(7));
        assert_eq!(body.variation_id, Some(VariationId::new(48)));
        assert_eq!(body.quantity, Some(2));
    }
}
