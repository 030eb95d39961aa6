//! Order history repository. Orders are read-only from the storefront.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use diamant_rouge_core::catalog::FALLBACK_LOCALE;
use diamant_rouge_core::{
    Order, OrderId, OrderItem, OrderItemId, OrderStatus, ProductId, Quantity, UserId,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    status: String,
    total_amount: Decimal,
    shipping_address: String,
    city: String,
    postal_code: String,
    country: String,
    tracking_number: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    sku: String,
    name: String,
    quantity: i32,
    price: Decimal,
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            sku: row.sku,
            name: row.name,
            quantity,
            price: row.price,
        })
    }
}

/// Attach items to their orders, keeping the order sequence.
fn assemble(
    orders: Vec<OrderRow>,
    items: Vec<ItemRow>,
) -> Result<Vec<Order>, RepositoryError> {
    let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for row in items {
        let order_id = row.order_id;
        items_by_order
            .entry(order_id)
            .or_default()
            .push(OrderItem::try_from(row)?);
    }

    orders
        .into_iter()
        .map(|row| {
            let status = OrderStatus::parse(&row.status).ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "order {}: unknown status {:?}",
                    row.id, row.status
                ))
            })?;
            Ok(Order {
                id: row.id,
                status,
                total_amount: row.total_amount,
                shipping_address: row.shipping_address,
                city: row.city,
                postal_code: row.postal_code,
                country: row.country,
                tracking_number: row.tracking_number,
                created_at: row.created_at,
                items: items_by_order.remove(&row.id).unwrap_or_default(),
            })
        })
        .collect()
}

/// Repository for a shopper's past orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every order of a user, newest first, with item names in `locale`.
    ///
    /// Item names fall back to French, then to the SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` for an unknown status or a
    /// stored quantity below one.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        locale: &str,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, status, total_amount, shipping_address, city, postal_code,
                   country, tracking_number, created_at
            FROM storefront.customer_order
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let items = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, p.sku,
                   COALESCE(t.name, f.name, p.sku) AS name,
                   i.quantity, i.price
            FROM storefront.order_item i
            JOIN storefront.product p ON p.id = i.product_id
            LEFT JOIN storefront.product_translation t ON t.product_id = p.id AND t.language = $2
            LEFT JOIN storefront.product_translation f ON f.product_id = p.id AND f.language = $3
            WHERE i.order_id = ANY($1)
            ORDER BY i.order_id, i.id
            ",
        )
        .bind(&order_ids)
        .bind(locale)
        .bind(FALLBACK_LOCALE)
        .fetch_all(self.pool)
        .await?;

        assemble(orders, items)
    }
}
