//! Integration tests for Diamant Rouge.
//!
//! # Running Tests
//!
//! ```bash
//! # Shopper journeys against the in-memory account
//! cargo test -p diamant-rouge-integration-tests
//!
//! # Against a running storefront with a loaded catalog
//! STOREFRONT_BASE_URL=http://127.0.0.1:3000 \
//!     cargo test -p diamant-rouge-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shopper_journeys` - Guest cart, sign-in merge and wishlist, in memory
//! - `storefront_api` - The same flows over HTTP against a live storefront

#![allow(clippy::unwrap_used, clippy::expect_used)]

use diamant_rouge_client::api::memory::MemoryAccount;
use diamant_rouge_client::{CartService, MemoryStorage, SessionState};
use diamant_rouge_core::{CartLine, ProductId, Quantity, VariationId};
use secrecy::SecretString;
use url::Url;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> Url {
    let raw =
        std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    Url::parse(&raw).expect("STOREFRONT_BASE_URL is not a URL")
}

/// An email address no other test run has used.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A password the storefront accepts.
#[must_use]
pub fn test_password() -> SecretString {
    SecretString::from("rubis-et-saphirs")
}

/// A cart line without product details.
#[must_use]
pub fn line(product: i32, quantity: u32) -> CartLine {
    CartLine::new(
        ProductId::new(product),
        None,
        Quantity::new(quantity).expect("quantity must be at least one"),
    )
}

/// A cart line for one variation of a product.
#[must_use]
pub fn variation_line(product: i32, variation: i32, quantity: u32) -> CartLine {
    CartLine::new(
        ProductId::new(product),
        Some(VariationId::new(variation)),
        Quantity::new(quantity).expect("quantity must be at least one"),
    )
}

/// A guest's cart service over fresh memory storage and an anonymous account.
pub async fn guest_cart(
    account: &MemoryAccount,
) -> CartService<MemoryStorage, MemoryAccount> {
    let mut cart = CartService::new(MemoryStorage::new(), account.clone());
    cart.observe_session(SessionState::Anonymous).await;
    cart
}
