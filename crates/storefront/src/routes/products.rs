//! Catalog route handlers.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use diamant_rouge_core::{CatalogFilter, CatalogPage, CatalogSort, SearchHit};

use crate::db::ProductRepository;
use crate::db::products::SearchParams;
use crate::error::AppError;
use crate::state::AppState;

/// Default number of search results.
const DEFAULT_SEARCH_LIMIT: i64 = 10;

/// Upper bound on requested search results.
const MAX_SEARCH_LIMIT: i64 = 50;

/// Deserialize an optional value, treating empty strings as `None`.
///
/// HTML forms send `minPrice=` when the field is cleared.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Split a comma-separated list, dropping blanks.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Catalog listing query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    /// Comma-separated material names.
    pub materials: Option<String>,
    /// Comma-separated gem type names.
    pub gem_types: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
}

impl CatalogQuery {
    /// The filter these parameters describe.
    #[must_use]
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            category: self.category.clone(),
            materials: split_list(self.materials.as_deref()),
            gem_types: split_list(self.gem_types.as_deref()),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    /// The requested sort, `Default` when absent or unknown.
    #[must_use]
    pub fn sort(&self) -> CatalogSort {
        self.sort.as_deref().map(CatalogSort::parse).unwrap_or_default()
    }
}

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    pub locale: Option<String>,
}

impl SearchQuery {
    fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .clamp(1, MAX_SEARCH_LIMIT)
    }
}

/// Filtered, sorted catalog listing.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogPage>, AppError> {
    let page = state
        .catalog()
        .list(&query.filter(), query.sort())
        .await?;
    Ok(Json(page))
}

/// Text search on product name and description, featured products first.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    if query.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let locale = query
        .locale
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(&state.config().default_locale);

    let hits = ProductRepository::new(state.pool())
        .search(&SearchParams {
            query: &query.q,
            locale,
            category: query.category.as_deref(),
            limit: query.limit(),
        })
        .await?;

    Ok(Json(hits))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(query: &str) -> T {
        Query::<T>::try_from_uri(&format!("/api/products?{query}").parse().unwrap())
            .unwrap()
            .0
    }

    #[test]
    fn test_catalog_query_builds_filter() {
        let query: CatalogQuery = parse(
            "category=bagues&materials=or%20rose,%20platine&gemTypes=rubis&minPrice=1000&maxPrice=25000.50&sort=price-asc",
        );
        let filter = query.filter();

        assert_eq!(filter.category.as_deref(), Some("bagues"));
        assert_eq!(filter.materials, vec!["or rose", "platine"]);
        assert_eq!(filter.gem_types, vec!["rubis"]);
        assert_eq!(filter.min_price, Some(Decimal::new(1000, 0)));
        assert_eq!(filter.max_price, Some(Decimal::new(2_500_050, 2)));
        assert_eq!(query.sort(), CatalogSort::PriceAsc);
    }

    #[test]
    fn test_empty_parameters_are_unset() {
        let query: CatalogQuery = parse("category=&materials=&minPrice=&sort=");

        assert!(query.filter().is_empty());
        assert_eq!(query.sort(), CatalogSort::Default);
    }

    #[test]
    fn test_search_limit_defaults_and_clamps() {
        assert_eq!(parse::<SearchQuery>("q=rubis").limit(), DEFAULT_SEARCH_LIMIT);
        assert_eq!(parse::<SearchQuery>("q=rubis&limit=500").limit(), MAX_SEARCH_LIMIT);
        assert_eq!(parse::<SearchQuery>("q=rubis&limit=0").limit(), 1);
    }
}
