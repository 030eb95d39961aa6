//! Catalog commands. No account needed.

use rust_decimal::Decimal;

use diamant_rouge_core::{CatalogFilter, CatalogSort};

use crate::error::CliError;
use crate::output::{emit, render_catalog, render_search};
use crate::shopper::Shopper;

/// Listing options from the command line.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub category: Option<String>,
    pub materials: Vec<String>,
    pub gem_types: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
}

impl ListOptions {
    fn filter(self) -> (CatalogFilter, CatalogSort) {
        let sort = self
            .sort
            .as_deref()
            .map(CatalogSort::parse)
            .unwrap_or_default();
        let filter = CatalogFilter {
            category: self.category,
            materials: self.materials,
            gem_types: self.gem_types,
            min_price: self.min_price,
            max_price: self.max_price,
        };
        (filter, sort)
    }
}

/// List the catalog.
///
/// # Errors
///
/// Returns error if the storefront is unreachable.
pub async fn list(shopper: &Shopper, options: ListOptions) -> Result<(), CliError> {
    let (filter, sort) = options.filter();
    let page = shopper.api.catalog(&filter, sort).await?;
    emit(&render_catalog(&page, &shopper.config.locale));
    Ok(())
}

/// Search product names and descriptions.
///
/// # Errors
///
/// Returns error if the storefront is unreachable.
pub async fn search(shopper: &Shopper, query: &str, limit: u32) -> Result<(), CliError> {
    let hits = shopper
        .api
        .search(query, limit, &shopper.config.locale)
        .await?;
    emit(&render_search(&hits));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sort_falls_back_to_default() {
        let options = ListOptions {
            sort: Some("cheapest".to_string()),
            ..ListOptions::default()
        };
        let (filter, sort) = options.filter();

        assert!(filter.is_empty());
        assert_eq!(sort, CatalogSort::Default);
    }
}
