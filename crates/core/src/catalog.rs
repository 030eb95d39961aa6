//! Catalog records and the listing filter/sort rules.
//!
//! Listings are computed in memory over products already loaded for a locale.
//! Both functions are pure: the same products, filter and sort always give
//! the same result, in the same order.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line::ProductSnapshot;
use crate::types::{ProductId, VariationId};

/// Locale used when the requested translation is missing.
pub const FALLBACK_LOCALE: &str = "fr";

/// A product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub base_price: Decimal,
    /// Category slug, if the product is categorized.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub gem_types: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub translations: Vec<ProductTranslation>,
    #[serde(default)]
    pub variations: Vec<ProductVariation>,
    pub created_at: DateTime<Utc>,
}

/// Localized product copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTranslation {
    pub language: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A purchasable variation (ring size, chain length...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariation {
    pub id: VariationId,
    pub variation_type: String,
    pub variation_value: String,
    pub additional_price: Decimal,
    pub inventory: i32,
}

impl Product {
    /// Translation for `locale`, falling back to French, then to the first one.
    #[must_use]
    pub fn translation(&self, locale: &str) -> Option<&ProductTranslation> {
        self.translations
            .iter()
            .find(|t| t.language == locale)
            .or_else(|| {
                self.translations
                    .iter()
                    .find(|t| t.language == FALLBACK_LOCALE)
            })
            .or_else(|| self.translations.first())
    }

    /// Display name for `locale`, or the SKU if the product has no translation.
    #[must_use]
    pub fn name(&self, locale: &str) -> &str {
        self.translation(locale)
            .map_or(self.sku.as_str(), |t| t.name.as_str())
    }

    /// Look up a variation of this product.
    #[must_use]
    pub fn variation(&self, id: VariationId) -> Option<&ProductVariation> {
        self.variations.iter().find(|v| v.id == id)
    }

    /// Unit price including the variation surcharge, if any.
    #[must_use]
    pub fn unit_price(&self, variation: Option<VariationId>) -> Decimal {
        variation
            .and_then(|id| self.variation(id))
            .map_or(self.base_price, |v| self.base_price + v.additional_price)
    }

    /// Denormalized snapshot for cart and wishlist displays.
    #[must_use]
    pub fn snapshot(&self, locale: &str) -> ProductSnapshot {
        ProductSnapshot {
            sku: self.sku.clone(),
            name: self.name(locale).to_string(),
            price: Some(self.base_price),
            image: self.images.first().cloned(),
        }
    }
}

// =============================================================================
// Filtering
// =============================================================================

/// Active catalog filters. Unset fields match every product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Category slug.
    pub category: Option<String>,
    /// Any-of material names.
    pub materials: Vec<String>,
    /// Any-of gem type names.
    pub gem_types: Vec<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl CatalogFilter {
    /// Whether no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.materials.is_empty()
            && self.gem_types.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    /// Whether `product` satisfies every active predicate.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_category(product)
            && intersects(&self.materials, &product.materials)
            && intersects(&self.gem_types, &product.gem_types)
            && self.matches_price(product.base_price)
    }

    fn matches_category(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|wanted| product.category.as_deref() == Some(wanted))
    }

    fn matches_price(&self, price: Decimal) -> bool {
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }
}

/// Case-insensitive any-of match. An empty selection matches everything.
fn intersects(selected: &[String], values: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    selected.iter().any(|wanted| {
        let wanted = wanted.to_lowercase();
        values.iter().any(|value| value.to_lowercase() == wanted)
    })
}

// =============================================================================
// Sorting
// =============================================================================

/// Catalog sort order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    /// Keep the data source order.
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    /// Newest first.
    Latest,
    /// Featured products first, otherwise in data source order.
    Featured,
}

impl CatalogSort {
    /// Parse from URL parameter value. Unknown values fall back to `Default`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "price-asc" | "price_asc" => Self::PriceAsc,
            "price-desc" | "price_desc" => Self::PriceDesc,
            "latest" | "newest" => Self::Latest,
            "featured" => Self::Featured,
            _ => Self::Default,
        }
    }

    /// URL parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Latest => "latest",
            Self::Featured => "featured",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Default => Ordering::Equal,
            Self::PriceAsc => a.base_price.cmp(&b.base_price),
            Self::PriceDesc => b.base_price.cmp(&a.base_price),
            Self::Latest => b.created_at.cmp(&a.created_at),
            Self::Featured => b.featured.cmp(&a.featured),
        }
    }
}

/// Filter then sort. The sort is stable: ties keep their input order.
#[must_use]
pub fn filter_and_sort<'a>(
    products: &'a [Product],
    filter: &CatalogFilter,
    sort: CatalogSort,
) -> Vec<&'a Product> {
    let mut listed: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();
    listed.sort_by(|a, b| sort.compare(a, b));
    listed
}

/// Lowest and highest base price in `products`, for price slider limits.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<(Decimal, Decimal)> {
    let min = products.iter().map(|p| p.base_price).min()?;
    let max = products.iter().map(|p| p.base_price).max()?;
    Some((min, max))
}

// =============================================================================
// Wire types
// =============================================================================

/// Lowest and highest base price of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// One page of a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total: usize,
    /// Price range of the unfiltered catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_bounds: Option<PriceBounds>,
    pub sort: String,
}

impl CatalogPage {
    /// Build a page from a catalog and the active filter and sort.
    #[must_use]
    pub fn build(catalog: &[Product], filter: &CatalogFilter, sort: CatalogSort) -> Self {
        let products: Vec<Product> = filter_and_sort(catalog, filter, sort)
            .into_iter()
            .cloned()
            .collect();

        Self {
            total: products.len(),
            products,
            price_bounds: price_bounds(catalog).map(|(min, max)| PriceBounds { min, max }),
            sort: sort.as_str().to_string(),
        }
    }
}

/// A search result, already localized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: Option<String>,
}
