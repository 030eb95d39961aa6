//! Catalog listing service.
//!
//! The whole catalog is loaded once and cached with `moka` (5-minute TTL).
//! Listings filter and sort the cached products in memory.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use diamant_rouge_core::{CatalogFilter, CatalogPage, CatalogSort, Product};

use crate::db::{ProductRepository, RepositoryError};

/// How long a loaded catalog is served before reloading.
const CATALOG_TTL: Duration = Duration::from_secs(300);

/// Single cache slot holding the whole catalog.
const CATALOG_KEY: &str = "catalog";

/// Cached access to the product catalog.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
    cache: Cache<&'static str, Arc<Vec<Product>>>,
}

impl CatalogService {
    /// Create a catalog service reading from `pool`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATALOG_TTL)
            .build();

        Self { pool, cache }
    }

    /// The whole catalog, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog has to be loaded and the load fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(products) = self.cache.get(CATALOG_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products = Arc::new(ProductRepository::new(&self.pool).list_all().await?);
        debug!(count = products.len(), "Catalog loaded");

        self.cache.insert(CATALOG_KEY, Arc::clone(&products)).await;
        Ok(products)
    }

    /// Filter and sort the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the catalog cannot be loaded.
    pub async fn list(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
    ) -> Result<CatalogPage, RepositoryError> {
        let products = self.products().await?;
        Ok(CatalogPage::build(&products, filter, sort))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    use diamant_rouge_core::ProductId;

    use super::*;

    fn service() -> CatalogService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        CatalogService::new(pool)
    }

    fn product(id: i32, price: i64, featured: bool) -> Product {
        Product {
            id: ProductId::new(id),
            sku: format!("DR-{id}"),
            base_price: Decimal::new(price, 0),
            category: Some("bagues".to_string()),
            materials: vec!["or rose".to_string()],
            gem_types: vec!["rubis".to_string()],
            featured,
            images: Vec::new(),
            translations: Vec::new(),
            variations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_list_serves_cached_catalog() {
        let catalog = service();
        catalog
            .cache
            .insert(
                CATALOG_KEY,
                Arc::new(vec![product(1, 5_000, false), product(2, 8_000, true)]),
            )
            .await;

        let page = catalog
            .list(&CatalogFilter::default(), CatalogSort::Featured)
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.products[0].id, ProductId::new(2));
    }
}
