//! End-to-end tests against a running storefront.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied (`dr-cli migrate`)
//! - The storefront server running (`cargo run -p diamant-rouge-storefront`)
//! - At least one product in the catalog
//!
//! Run with: cargo test -p diamant-rouge-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::Value;

use diamant_rouge_client::{
    AccountApi, ApiError, CartService, HttpAccountClient, MemoryStorage, ServerWishlist,
    SessionState, SyncError, WishlistAction, WishlistService,
};
use diamant_rouge_core::{
    CartLine, CatalogFilter, CatalogSort, LineKey, MemberStatus, NewCartLine, PreferencesUpdate,
    Product, ProductId, Quantity, ShippingAddress,
};
use diamant_rouge_integration_tests::{storefront_base_url, test_password, unique_email};

/// An anonymous client, for the catalog and for guest browsing.
fn guest_client() -> HttpAccountClient {
    HttpAccountClient::new(storefront_base_url(), None).expect("Failed to create HTTP client")
}

/// Register a fresh account and return a client bound to its session.
async fn registered_client() -> HttpAccountClient {
    let base = storefront_base_url();
    let cookie = HttpAccountClient::register(&base, &unique_email(), &test_password())
        .await
        .expect("Failed to register test account");
    HttpAccountClient::new(base, Some(&cookie)).expect("Failed to create HTTP client")
}

/// First product of the catalog.
async fn any_product(client: &HttpAccountClient) -> Product {
    let page = client
        .catalog(&CatalogFilter::default(), CatalogSort::Default)
        .await
        .expect("Failed to list catalog");
    page.products
        .into_iter()
        .next()
        .expect("Catalog is empty; load products before running these tests")
}

// ============================================================================
// Health & Session
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_carries_request_id() {
    let resp = Client::new()
        .get(storefront_base_url().join("health").unwrap())
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_anonymous_session_and_account_endpoints() {
    let client = guest_client();
    let session = client.session().await.expect("Failed to read session");
    assert!(!session.authenticated);

    let err = client.fetch_cart().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));

    let resp = Client::new()
        .get(storefront_base_url().join("api/wishlist").unwrap())
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse error body");
    assert_eq!(body["error"], "Authentication required");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_register_login_logout() {
    let base = storefront_base_url();
    let email = unique_email();
    HttpAccountClient::register(&base, &email, &test_password())
        .await
        .expect("Failed to register");

    let err = HttpAccountClient::register(&base, &email, &test_password())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 409, .. }));

    let cookie = HttpAccountClient::login(&base, &email, &test_password())
        .await
        .expect("Failed to log in");
    let client = HttpAccountClient::new(base.clone(), Some(&cookie)).unwrap();
    let session = client.session().await.unwrap();
    assert!(session.authenticated);
    assert_eq!(session.email.as_deref(), Some(email.as_str()));

    client.logout().await.expect("Failed to log out");
    assert!(!client.session().await.unwrap().authenticated);

    let err = HttpAccountClient::login(&base, &email, &SecretString::from("wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_guest_cart_merges_on_sign_in() {
    let product = any_product(&guest_client()).await;
    let variation = product.variations.first().map(|v| v.id);
    let key = LineKey::new(product.id, variation);

    // Browse as guest
    let mut cart = CartService::new(MemoryStorage::new(), registered_client().await);
    cart.observe_session(SessionState::Anonymous).await;
    cart.add(CartLine::new(
        product.id,
        variation,
        Quantity::new(2).unwrap(),
    ))
    .await
    .unwrap();
    cart.add(CartLine::new(
        product.id,
        variation,
        Quantity::new(1).unwrap(),
    ))
    .await
    .unwrap();
    assert_eq!(cart.item_count(), 3);

    // The account already held the session; observing it merges
    let report = cart
        .observe_session(SessionState::Authenticated)
        .await
        .expect("first sign-in merges");
    assert!(report.is_complete(), "merge failed: {report:?}");
    assert!(cart.guest().is_empty());

    let line = cart
        .lines()
        .iter()
        .find(|l| l.key() == key)
        .expect("merged line in account cart");
    assert_eq!(line.quantity.get(), 3);
    assert!(line.product.is_some());

    cart.set_quantity(key, 5).await.unwrap();
    assert_eq!(cart.item_count(), 5);

    let err = cart.set_quantity(key, 0).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidQuantity(_)));

    cart.clear().await.unwrap();
    cart.refresh().await.unwrap();
    assert!(cart.lines().is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_unknown_product_is_rejected() {
    let client = registered_client().await;
    let err = client
        .create_cart_line(NewCartLine {
            product_id: ProductId::new(i32::MAX),
            variation_id: None,
            quantity: Quantity::new(1).unwrap(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_wishlist_add_is_idempotent_and_toggle_removes() {
    let product = any_product(&guest_client()).await;
    let client = registered_client().await;
    let mut wishlist = WishlistService::new(ServerWishlist::new(client.clone()));
    wishlist.observe_session(SessionState::Authenticated).await;

    assert_eq!(
        wishlist.add(product.id, "/").await.unwrap(),
        WishlistAction::Added
    );
    wishlist.add(product.id, "/").await.unwrap();
    assert_eq!(client.fetch_wishlist().await.unwrap().len(), 1);

    assert_eq!(
        wishlist.toggle(product.id, "/").await.unwrap(),
        WishlistAction::Removed
    );
    assert!(client.fetch_wishlist().await.unwrap().is_empty());
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_catalog_sort_and_bounds() {
    let client = guest_client();
    let page = client
        .catalog(&CatalogFilter::default(), CatalogSort::PriceAsc)
        .await
        .expect("Failed to list catalog");

    assert_eq!(page.sort, "price-asc");
    assert_eq!(page.total, page.products.len());
    assert!(
        page.products
            .windows(2)
            .all(|pair| pair[0].base_price <= pair[1].base_price)
    );
    if let Some(bounds) = page.price_bounds {
        assert!(page.products.iter().all(|p| p.base_price >= bounds.min));
        assert!(page.products.iter().all(|p| p.base_price <= bounds.max));
    }

    let hits = client.search("   ", 10, "fr").await.unwrap();
    assert!(hits.is_empty());
}

// ============================================================================
// Profile & Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_profile_address_and_preferences() {
    let client = registered_client().await;

    let profile = client.profile().await.expect("Failed to read profile");
    assert_eq!(profile.member_status, MemberStatus::Regular);
    assert!(profile.address.is_empty());

    let address = ShippingAddress {
        address: Some(" 12 rue de Fès ".to_string()),
        city: Some("Casablanca".to_string()),
        phone_number: Some(String::new()),
        ..ShippingAddress::default()
    };
    let profile = client.update_address(&address).await.unwrap();
    assert_eq!(profile.address.address.as_deref(), Some("12 rue de Fès"));
    assert_eq!(profile.address.phone_number, None);

    let update = PreferencesUpdate {
        preferred_metals: Some(vec!["or rose".to_string()]),
        ring_size: Some("52".to_string()),
        ..PreferencesUpdate::default()
    };
    client.update_preferences(&update).await.unwrap();

    // Lists left out keep their value; sizes left out are cleared
    let update = PreferencesUpdate {
        preferred_gemstones: Some(vec!["rubis".to_string()]),
        ..PreferencesUpdate::default()
    };
    let profile = client.update_preferences(&update).await.unwrap();
    assert_eq!(profile.preferences.preferred_metals, vec!["or rose"]);
    assert_eq!(profile.preferences.preferred_gemstones, vec!["rubis"]);
    assert_eq!(profile.preferences.ring_size, None);

    let oversized = ShippingAddress {
        city: Some("x".repeat(500)),
        ..ShippingAddress::default()
    };
    let err = client.update_address(&oversized).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 400, .. }));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_new_account_has_no_orders() {
    let client = registered_client().await;
    let orders = client.orders("fr").await.expect("Failed to list orders");
    assert!(orders.is_empty());

    let err = guest_client().orders("fr").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}
