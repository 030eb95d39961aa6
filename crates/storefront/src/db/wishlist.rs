//! Account wishlist repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use diamant_rouge_core::catalog::FALLBACK_LOCALE;
use diamant_rouge_core::{ProductId, ProductSnapshot, UserId, WishlistEntry, WishlistEntryId};

use super::RepositoryError;

/// Columns shared by every entry query. `$1` is the locale.
const ENTRY_SELECT: &str = r"
    SELECT w.id, w.product_id, p.sku,
           COALESCE(t.name, f.name, p.sku) AS name,
           p.base_price, p.images[1] AS image
    FROM storefront.wishlist_item w
    JOIN storefront.product p ON p.id = w.product_id
    LEFT JOIN storefront.product_translation t ON t.product_id = p.id AND t.language = $1
    LEFT JOIN storefront.product_translation f ON f.product_id = p.id AND f.language = $2
";

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: WishlistEntryId,
    product_id: ProductId,
    sku: String,
    name: String,
    base_price: Decimal,
    image: Option<String>,
}

impl From<EntryRow> for WishlistEntry {
    fn from(row: EntryRow) -> Self {
        Self {
            id: Some(row.id),
            product_id: row.product_id,
            product: Some(ProductSnapshot {
                sku: row.sku,
                name: row.name,
                price: Some(row.base_price),
                image: row.image,
            }),
        }
    }
}

/// Repository for account wishlists.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All entries of a user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        locale: &str,
    ) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let sql = format!(
            "{ENTRY_SELECT} WHERE w.user_id = $3 ORDER BY w.created_at DESC, w.id DESC"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(locale)
            .bind(FALLBACK_LOCALE)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(WishlistEntry::from).collect())
    }

    /// One entry by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    pub async fn get(
        &self,
        id: WishlistEntryId,
        locale: &str,
    ) -> Result<WishlistEntry, RepositoryError> {
        let sql = format!("{ENTRY_SELECT} WHERE w.id = $3");
        let row = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(locale)
            .bind(FALLBACK_LOCALE)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(WishlistEntry::from(row))
    }

    /// Add a product. Adding a product already present returns the existing entry id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<WishlistEntryId, RepositoryError> {
        let id: WishlistEntryId = sqlx::query_scalar(
            r"
            INSERT INTO storefront.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Remove a product. Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.wishlist_item WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
