//! `AccountApi` over the storefront's JSON endpoints.

use std::sync::Arc;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use diamant_rouge_core::{
    CartLine, CartLineId, CatalogFilter, CatalogPage, CatalogSort, NewCartLine, Order,
    PreferencesUpdate, ProductId, Profile, Quantity, SearchHit, ShippingAddress, WishlistEntry,
};

use super::{AccountApi, ApiError, SessionInfo};

/// Name of the storefront session cookie.
pub const SESSION_COOKIE_NAME: &str = "dr_session";

/// HTTP client for the account endpoints.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpAccountClient {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAccountClient {
    /// Create a client for the storefront at `base_url`.
    ///
    /// When `session` is given it is sent as the session cookie on every
    /// request; without it every account call answers `Unauthorized`.
    ///
    /// # Errors
    ///
    /// Returns error if the cookie value is not a valid header or the HTTP
    /// client fails to build.
    pub fn new(base_url: Url, session: Option<&SecretString>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();

        if let Some(session) = session {
            let cookie = format!("{SESSION_COOKIE_NAME}={}", session.expose_secret());
            let mut value = HeaderValue::from_str(&cookie)
                .map_err(|e| ApiError::Parse(format!("Invalid session cookie: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(Inner { client, base_url }),
        })
    }

    /// The storefront base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Sign in and return the session cookie value.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or another
    /// error if the request fails or no session cookie is returned.
    #[instrument(skip(base_url, password))]
    pub async fn login(
        base_url: &Url,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        Self::authenticate(base_url, "auth/login", email, password).await
    }

    /// Create an account and return the session cookie value.
    ///
    /// # Errors
    ///
    /// Returns error if the account exists, the request fails, or no session
    /// cookie is returned.
    #[instrument(skip(base_url, password))]
    pub async fn register(
        base_url: &Url,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        Self::authenticate(base_url, "auth/register", email, password).await
    }

    /// End the session on the storefront.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/logout")?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn authenticate(
        base_url: &Url,
        path: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, ApiError> {
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let response = reqwest::Client::new()
            .post(base_url.join(path)?)
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;

        session_cookie(response.headers())
            .ok_or_else(|| ApiError::Parse("response carried no session cookie".to_string()))
    }

    /// Filtered, sorted catalog listing. Needs no session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn catalog(
        &self,
        filter: &CatalogFilter,
        sort: CatalogSort,
    ) -> Result<CatalogPage, ApiError> {
        let mut url = self.endpoint("api/products")?;
        url.query_pairs_mut()
            .extend_pairs(catalog_query(filter, sort));

        let response = self.inner.client.get(url).send().await?;
        decode(response).await
    }

    /// Text search over product names and descriptions. Needs no session.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        locale: &str,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let mut url = self.endpoint("api/products/search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string())
            .append_pair("locale", locale);

        let response = self.inner.client.get(url).send().await?;
        decode(response).await
    }

    /// The signed-in shopper's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a session, or another error
    /// if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/profile")?)
            .send()
            .await?;
        decode(response).await
    }

    /// Replace the shipping address and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 400 for an oversized field, or the
    /// request error.
    #[instrument(skip(self, address))]
    pub async fn update_address(&self, address: &ShippingAddress) -> Result<Profile, ApiError> {
        let response = self
            .inner
            .client
            .put(self.endpoint("api/profile/address")?)
            .json(address)
            .send()
            .await?;
        decode(response).await
    }

    /// Update preferences and return the updated profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 400 for an oversized field or list,
    /// or the request error.
    #[instrument(skip(self, update))]
    pub async fn update_preferences(&self, update: &PreferencesUpdate) -> Result<Profile, ApiError> {
        let response = self
            .inner
            .client
            .put(self.endpoint("api/profile/preferences")?)
            .json(update)
            .send()
            .await?;
        decode(response).await
    }

    /// Order history, newest first, with item names in `locale`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` without a session, or another error
    /// if the request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self, locale: &str) -> Result<Vec<Order>, ApiError> {
        let mut url = self.endpoint("api/orders")?;
        url.query_pairs_mut().append_pair("locale", locale);

        let response = self.inner.client.get(url).send().await?;
        decode(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }
}

/// Query parameters for a catalog listing. Unset predicates are omitted.
fn catalog_query(filter: &CatalogFilter, sort: CatalogSort) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();

    if let Some(category) = &filter.category {
        pairs.push(("category", category.clone()));
    }
    if !filter.materials.is_empty() {
        pairs.push(("materials", filter.materials.join(",")));
    }
    if !filter.gem_types.is_empty() {
        pairs.push(("gemTypes", filter.gem_types.join(",")));
    }
    if let Some(min) = filter.min_price {
        pairs.push(("minPrice", min.to_string()));
    }
    if let Some(max) = filter.max_price {
        pairs.push(("maxPrice", max.to_string()));
    }
    if sort != CatalogSort::Default {
        pairs.push(("sort", sort.as_str().to_string()));
    }

    pairs
}

impl AccountApi for HttpAccountClient {
    #[instrument(skip(self))]
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/session")?)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/cart")?)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self), fields(product_id = %line.product_id))]
    async fn create_cart_line(&self, line: NewCartLine) -> Result<CartLine, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("api/cart")?)
            .json(&line)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn update_cart_line(&self, id: CartLineId, quantity: Quantity) -> Result<CartLine, ApiError> {
        let response = self
            .inner
            .client
            .put(self.endpoint(&format!("api/cart/{id}"))?)
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn delete_cart_line(&self, id: CartLineId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&format!("api/cart/{id}"))?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint("api/cart")?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("api/wishlist")?)
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<WishlistEntry, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("api/wishlist")?)
            .json(&serde_json::json!({ "productId": product_id }))
            .send()
            .await?;
        decode(response).await
    }

    #[instrument(skip(self))]
    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&format!("api/wishlist/{product_id}"))?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Map non-success statuses onto `ApiError`.
async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    check(response)
        .await?
        .json()
        .await
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Extract the session cookie value from `Set-Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<SecretString> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
        .map(|(_, value)| SecretString::from(value.trim().to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_extraction() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("other=1; Path=/"),
        );
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("dr_session=abc123; Path=/; HttpOnly; SameSite=Lax"),
        );

        let cookie = session_cookie(&headers).unwrap();
        assert_eq!(cookie.expose_secret(), "abc123");
    }

    #[test]
    fn test_session_cookie_missing() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("other=1"));
        assert!(session_cookie(&headers).is_none());
    }

    #[test]
    fn test_catalog_query_omits_unset_predicates() {
        assert!(catalog_query(&CatalogFilter::default(), CatalogSort::Default).is_empty());

        let filter = CatalogFilter {
            category: Some("colliers".to_string()),
            materials: vec!["or blanc".to_string(), "platine".to_string()],
            gem_types: Vec::new(),
            min_price: Some(rust_decimal::Decimal::new(1500, 0)),
            max_price: None,
        };
        let pairs = catalog_query(&filter, CatalogSort::Featured);

        assert_eq!(
            pairs,
            vec![
                ("category", "colliers".to_string()),
                ("materials", "or blanc,platine".to_string()),
                ("minPrice", "1500".to_string()),
                ("sort", "featured".to_string()),
            ]
        );
    }

    #[test]
    fn test_endpoint_joins_base() {
        let client =
            HttpAccountClient::new(Url::parse("http://127.0.0.1:3000").unwrap(), None).unwrap();
        assert_eq!(
            client.endpoint("api/cart/5").unwrap().as_str(),
            "http://127.0.0.1:3000/api/cart/5"
        );
    }
}
