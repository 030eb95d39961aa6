//! Account endpoint boundary.
//!
//! Every call the shopper-side stores make to the storefront goes through
//! [`AccountApi`]. The production implementation is [`HttpAccountClient`];
//! tests use the in-memory `MemoryAccount` behind the `test-util` feature.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use diamant_rouge_core::{CartLine, CartLineId, NewCartLine, ProductId, Quantity, WishlistEntry};

mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use http::{HttpAccountClient, SESSION_COOKIE_NAME};

/// Errors returned by the account endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// No session, or the session expired.
    #[error("not signed in")]
    Unauthorized,

    /// The response body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An endpoint URL could not be built.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Authentication state reported by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The account-side cart and wishlist endpoints.
///
/// Creating a line for a key the account already holds adds to its quantity;
/// adding a product already in the wishlist is not an error.
pub trait AccountApi: Send + Sync {
    /// Current authentication state.
    fn session(&self) -> impl Future<Output = Result<SessionInfo, ApiError>> + Send;

    /// All lines of the account cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Create a line, or grow the existing line with the same key.
    fn create_cart_line(
        &self,
        line: NewCartLine,
    ) -> impl Future<Output = Result<CartLine, ApiError>> + Send;

    /// Overwrite the quantity of a line.
    fn update_cart_line(
        &self,
        id: CartLineId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartLine, ApiError>> + Send;

    /// Delete a line.
    fn delete_cart_line(&self, id: CartLineId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete every line of the account cart.
    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// All wishlist entries.
    fn fetch_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistEntry>, ApiError>> + Send;

    /// Add a product to the wishlist.
    fn add_to_wishlist(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<WishlistEntry, ApiError>> + Send;

    /// Remove a product from the wishlist.
    fn remove_from_wishlist(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
