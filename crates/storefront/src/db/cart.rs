//! Account cart repository.
//!
//! A user holds at most one line per (product, variation). Adding a line
//! for a key that already exists grows its quantity instead of inserting.

use rust_decimal::Decimal;
use sqlx::PgPool;

use diamant_rouge_core::catalog::FALLBACK_LOCALE;
use diamant_rouge_core::{
    CartLine, CartLineId, NewCartLine, ProductId, ProductSnapshot, Quantity, UserId, VariationId,
};

use super::RepositoryError;

/// Columns shared by every line query. `$1` is the locale.
const LINE_SELECT: &str = r"
    SELECT c.id, c.product_id, c.variation_id, c.quantity,
           p.sku,
           COALESCE(t.name, f.name, p.sku) AS name,
           p.base_price + COALESCE(v.additional_price, 0) AS price,
           p.images[1] AS image
    FROM storefront.cart_item c
    JOIN storefront.product p ON p.id = c.product_id
    LEFT JOIN storefront.product_variation v ON v.id = c.variation_id
    LEFT JOIN storefront.product_translation t ON t.product_id = p.id AND t.language = $1
    LEFT JOIN storefront.product_translation f ON f.product_id = p.id AND f.language = $2
";

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: CartLineId,
    product_id: ProductId,
    variation_id: Option<VariationId>,
    quantity: i32,
    sku: String,
    name: String,
    price: Decimal,
    image: Option<String>,
}

impl TryFrom<LineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: LineRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::try_from(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart line {}: {e}", row.id))
        })?;

        Ok(Self {
            id: Some(row.id),
            product_id: row.product_id,
            variation_id: row.variation_id,
            quantity,
            product: Some(ProductSnapshot {
                sku: row.sku,
                name: row.name,
                price: Some(row.price),
                image: row.image,
            }),
        })
    }
}

/// Who owns a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOwner {
    /// The line belongs to the asking user.
    Caller,
    /// The line belongs to someone else.
    Other,
    /// No such line.
    Missing,
}

/// Repository for account cart lines.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All lines of a user's cart, oldest first, with product names in `locale`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId, locale: &str) -> Result<Vec<CartLine>, RepositoryError> {
        let sql = format!("{LINE_SELECT} WHERE c.user_id = $3 ORDER BY c.created_at, c.id");
        let rows = sqlx::query_as::<_, LineRow>(&sql)
            .bind(locale)
            .bind(FALLBACK_LOCALE)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// One line by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn get(&self, id: CartLineId, locale: &str) -> Result<CartLine, RepositoryError> {
        let sql = format!("{LINE_SELECT} WHERE c.id = $3");
        let row = sqlx::query_as::<_, LineRow>(&sql)
            .bind(locale)
            .bind(FALLBACK_LOCALE)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        CartLine::try_from(row)
    }

    /// Insert a line, or add to the quantity of the line with the same key.
    ///
    /// Returns the id of the resulting line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_add(
        &self,
        user_id: UserId,
        line: NewCartLine,
    ) -> Result<CartLineId, RepositoryError> {
        let id: CartLineId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.cart_item (user_id, product_id, variation_id, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT ON CONSTRAINT cart_item_line_key DO UPDATE
                SET quantity = LEAST(
                        storefront.cart_item.quantity::BIGINT + EXCLUDED.quantity,
                        2147483647
                    )::INTEGER,
                    updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(line.product_id)
        .bind(line.variation_id)
        .bind(i32::from(line.quantity))
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Check who owns a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn owner(&self, id: CartLineId, user_id: UserId) -> Result<LineOwner, RepositoryError> {
        let owner: Option<UserId> =
            sqlx::query_scalar("SELECT user_id FROM storefront.cart_item WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(match owner {
            None => LineOwner::Missing,
            Some(owner) if owner == user_id => LineOwner::Caller,
            Some(_) => LineOwner::Other,
        })
    }

    /// Overwrite the quantity of a user's line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such line.
    pub async fn set_quantity(
        &self,
        id: CartLineId,
        user_id: UserId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.cart_item
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(i32::from(quantity))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a user's line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such line.
    pub async fn delete(&self, id: CartLineId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete every line of a user's cart. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
