//! Order history route handler.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use diamant_rouge_core::Order;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::LocaleQuery;

/// List the shopper's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, locale.resolve(&state))
        .await?;
    Ok(Json(orders))
}
