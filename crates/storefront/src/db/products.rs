//! Catalog repository.
//!
//! The catalog is small enough to load whole: products, translations and
//! variations come back in three queries and are stitched together here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use diamant_rouge_core::catalog::FALLBACK_LOCALE;
use diamant_rouge_core::{
    Product, ProductId, ProductTranslation, ProductVariation, SearchHit, VariationId,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    sku: String,
    base_price: Decimal,
    category: Option<String>,
    materials: Vec<String>,
    gem_types: Vec<String>,
    featured: bool,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct TranslationRow {
    product_id: ProductId,
    language: String,
    name: String,
    description: String,
}

#[derive(Debug, sqlx::FromRow)]
struct VariationRow {
    id: VariationId,
    product_id: ProductId,
    variation_type: String,
    variation_value: String,
    additional_price: Decimal,
    inventory: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct SearchRow {
    id: ProductId,
    sku: String,
    name: String,
    description: String,
    base_price: Decimal,
    category: Option<String>,
    featured: bool,
    image: Option<String>,
}

impl From<SearchRow> for SearchHit {
    fn from(row: SearchRow) -> Self {
        Self {
            id: row.id,
            sku: row.sku,
            name: row.name,
            description: row.description,
            base_price: row.base_price,
            category: row.category,
            featured: row.featured,
            image: row.image,
        }
    }
}

/// Search parameters.
#[derive(Debug, Clone)]
pub struct SearchParams<'q> {
    pub query: &'q str,
    pub locale: &'q str,
    pub category: Option<&'q str>,
    pub limit: i64,
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the whole catalog in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT p.id, p.sku, p.base_price, c.slug AS category,
                   p.materials, p.gem_types, p.featured, p.images, p.created_at
            FROM storefront.product p
            LEFT JOIN storefront.category c ON c.id = p.category_id
            ORDER BY p.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let translations = sqlx::query_as::<_, TranslationRow>(
            r"
            SELECT product_id, language, name, description
            FROM storefront.product_translation
            ORDER BY product_id, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let variations = sqlx::query_as::<_, VariationRow>(
            r"
            SELECT id, product_id, variation_type, variation_value, additional_price, inventory
            FROM storefront.product_variation
            ORDER BY product_id, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(assemble(products, translations, variations))
    }

    /// Whether a product exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM storefront.product WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Whether a variation belongs to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variation_belongs(
        &self,
        product_id: ProductId,
        variation_id: VariationId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM storefront.product_variation
                WHERE id = $1 AND product_id = $2
            )
            ",
        )
        .bind(variation_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Case-insensitive search on translated name and description.
    ///
    /// The requested locale is searched first, falling back to the default
    /// locale when a product has no translation in it. Featured products
    /// come first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, params: &SearchParams<'_>) -> Result<Vec<SearchHit>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(params.query.trim()));

        let rows = sqlx::query_as::<_, SearchRow>(
            r"
            SELECT p.id, p.sku,
                   COALESCE(t.name, f.name, p.sku) AS name,
                   COALESCE(t.description, f.description, '') AS description,
                   p.base_price, c.slug AS category, p.featured,
                   p.images[1] AS image
            FROM storefront.product p
            LEFT JOIN storefront.category c ON c.id = p.category_id
            LEFT JOIN storefront.product_translation t
                   ON t.product_id = p.id AND t.language = $2
            LEFT JOIN storefront.product_translation f
                   ON f.product_id = p.id AND f.language = $3
            WHERE (COALESCE(t.name, f.name) ILIKE $1
                   OR COALESCE(t.description, f.description) ILIKE $1)
              AND ($4::TEXT IS NULL OR c.slug = $4)
            ORDER BY p.featured DESC, p.id
            LIMIT $5
            ",
        )
        .bind(pattern)
        .bind(params.locale)
        .bind(FALLBACK_LOCALE)
        .bind(params.category)
        .bind(params.limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SearchHit::from).collect())
    }
}

/// Group translation and variation rows under their products.
fn assemble(
    products: Vec<ProductRow>,
    translations: Vec<TranslationRow>,
    variations: Vec<VariationRow>,
) -> Vec<Product> {
    let mut translations_by_product: HashMap<ProductId, Vec<ProductTranslation>> = HashMap::new();
    for row in translations {
        translations_by_product
            .entry(row.product_id)
            .or_default()
            .push(ProductTranslation {
                language: row.language,
                name: row.name,
                description: row.description,
            });
    }

    let mut variations_by_product: HashMap<ProductId, Vec<ProductVariation>> = HashMap::new();
    for row in variations {
        variations_by_product
            .entry(row.product_id)
            .or_default()
            .push(ProductVariation {
                id: row.id,
                variation_type: row.variation_type,
                variation_value: row.variation_value,
                additional_price: row.additional_price,
                inventory: row.inventory,
            });
    }

    products
        .into_iter()
        .map(|row| Product {
            id: row.id,
            sku: row.sku,
            base_price: row.base_price,
            category: row.category,
            materials: row.materials,
            gem_types: row.gem_types,
            featured: row.featured,
            images: row.images,
            translations: translations_by_product.remove(&row.id).unwrap_or_default(),
            variations: variations_by_product.remove(&row.id).unwrap_or_default(),
            created_at: row.created_at,
        })
        .collect()
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
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

    fn product_row(id: i32) -> ProductRow {
        ProductRow {
            id: ProductId::new(id),
            sku: format!("SKU-{id}"),
            base_price: Decimal::new(1000, 0),
            category: Some("rings".to_string()),
            materials: vec!["gold".to_string()],
            gem_types: vec![],
            featured: false,
            images: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_assemble_groups_children() {
        let products = vec![product_row(1), product_row(2)];
        let translations = vec![
            TranslationRow {
                product_id: ProductId::new(2),
                language: "fr".to_string(),
                name: "Collier".to_string(),
                description: String::new(),
            },
            TranslationRow {
                product_id: ProductId::new(1),
                language: "en".to_string(),
                name: "Ring".to_string(),
                description: String::new(),
            },
        ];
        let variations = vec![VariationRow {
            id: VariationId::new(48),
            product_id: ProductId::new(1),
            variation_type: "size".to_string(),
            variation_value: "52".to_string(),
            additional_price: Decimal::ZERO,
            inventory: 3,
        }];

        let catalog = assemble(products, translations, variations);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].translations[0].name, "Ring");
        assert_eq!(catalog[0].variations.len(), 1);
        assert_eq!(catalog[1].translations[0].name, "Collier");
        assert!(catalog[1].variations.is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("rouge"), "rouge");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }
}
