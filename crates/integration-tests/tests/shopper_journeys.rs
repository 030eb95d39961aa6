//! Shopper journeys through the cart and wishlist services.
//!
//! The account is the in-memory double, so these run without a storefront.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::time::Duration;

use diamant_rouge_client::api::memory::{MemoryAccount, Operation};
use diamant_rouge_client::{
    CartService, GUEST_CART_KEY, IntentAction, MemoryStorage, MergeState, ServerWishlist,
    SessionState, SyncError, WishlistAction, WishlistService,
};
use diamant_rouge_core::{LineKey, ProductId, VariationId};
use diamant_rouge_integration_tests::{guest_cart, line, variation_line};
use url::Url;

// ============================================================================
// Guest cart and sign-in merge
// ============================================================================

#[tokio::test]
async fn test_guest_lines_follow_the_shopper_into_the_account() {
    let account = MemoryAccount::new();
    let mut cart = guest_cart(&account).await;

    cart.add(line(7, 2)).await.unwrap();
    cart.add(line(7, 1)).await.unwrap();
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.item_count(), 3);
    // Nothing reaches the account while browsing as guest
    assert_eq!(account.calls(Operation::CreateLine), 0);

    account.sign_in("amina@example.com");
    let report = cart
        .observe_session(SessionState::Authenticated)
        .await
        .expect("first sign-in merges");

    assert!(report.is_complete());
    assert_eq!(cart.merge_state(), MergeState::Merged);
    assert_eq!(account.calls(Operation::CreateLine), 1);
    assert_eq!(account.created()[0].quantity.get(), 3);
    assert!(!cart.guest().storage().contains(GUEST_CART_KEY));
    assert_eq!(cart.lines()[0].quantity.get(), 3);

    // A fresh tab sees the merged line from the account
    let mut other_tab = CartService::new(MemoryStorage::new(), account.clone());
    other_tab.observe_session(SessionState::Authenticated).await;
    assert_eq!(other_tab.lines().len(), 1);
    assert_eq!(other_tab.lines()[0].quantity.get(), 3);
}

#[tokio::test]
async fn test_merge_adds_to_what_the_account_already_holds() {
    let account = MemoryAccount::new();
    let mut cart = guest_cart(&account).await;
    cart.add(line(7, 1)).await.unwrap();
    cart.add(variation_line(7, 48, 2)).await.unwrap();

    account.sign_in("amina@example.com");
    account.seed_line(line(7, 4).to_new_line());
    cart.observe_session(SessionState::Authenticated).await;

    let plain = LineKey::new(ProductId::new(7), None);
    let sized = LineKey::new(ProductId::new(7), Some(VariationId::new(48)));
    let lines = account.lines();
    assert_eq!(lines.len(), 2);
    let quantity_of = |key: LineKey| {
        lines
            .iter()
            .find(|l| l.key() == key)
            .map(|l| l.quantity.get())
    };
    assert_eq!(quantity_of(plain), Some(5));
    assert_eq!(quantity_of(sized), Some(2));
}

#[tokio::test]
async fn test_failed_lines_are_reported_and_guest_cart_is_still_erased() {
    let account = MemoryAccount::new();
    let mut cart = guest_cart(&account).await;
    cart.add(line(1, 1)).await.unwrap();
    cart.add(line(2, 3)).await.unwrap();
    cart.add(line(3, 1)).await.unwrap();

    account.sign_in("amina@example.com");
    account.fail_create_for(ProductId::new(2));
    let report = cart
        .observe_session(SessionState::Authenticated)
        .await
        .unwrap();

    assert_eq!(report.merged.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].key.product_id, ProductId::new(2));
    assert!(cart.guest().is_empty());
    assert_eq!(cart.lines().len(), 2);
}

#[tokio::test]
async fn test_repeated_observations_merge_once() {
    let account = MemoryAccount::signed_in("amina@example.com");
    let mut cart = guest_cart(&account).await;
    cart.add(line(9, 1)).await.unwrap();

    // Session flickers between loading and signed in, as a page reload does
    assert!(cart.observe_session(SessionState::Authenticated).await.is_some());
    assert!(cart.observe_session(SessionState::Loading).await.is_none());
    assert!(cart.observe_session(SessionState::Authenticated).await.is_none());

    assert_eq!(account.calls(Operation::CreateLine), 1);
}

#[tokio::test]
async fn test_sign_out_returns_to_an_empty_guest_cart_and_next_sign_in_merges_again() {
    let account = MemoryAccount::new();
    let mut cart = guest_cart(&account).await;
    cart.add(line(4, 1)).await.unwrap();
    account.sign_in("amina@example.com");
    cart.observe_session(SessionState::Authenticated).await;

    account.sign_out();
    cart.observe_session(SessionState::Anonymous).await;
    assert!(cart.lines().is_empty());
    assert_eq!(cart.merge_state(), MergeState::NotMerged);

    cart.add(line(5, 2)).await.unwrap();
    account.sign_in("amina@example.com");
    let report = cart
        .observe_session(SessionState::Authenticated)
        .await
        .unwrap();

    assert_eq!(report.merged, vec![LineKey::new(ProductId::new(5), None)]);
    assert_eq!(cart.lines().len(), 2);
}

// ============================================================================
// Editing the cart
// ============================================================================

#[tokio::test]
async fn test_quantity_below_one_changes_nothing() {
    let account = MemoryAccount::new();
    let mut cart = guest_cart(&account).await;
    cart.add(line(7, 2)).await.unwrap();
    let key = LineKey::new(ProductId::new(7), None);

    let err = cart.set_quantity(key, 0).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidQuantity(_)));
    assert_eq!(cart.item_count(), 2);

    let missing = LineKey::new(ProductId::new(8), None);
    let err = cart.set_quantity(missing, 3).await.unwrap_err();
    assert!(matches!(err, SyncError::LineNotFound(key) if key == missing));
    assert_eq!(cart.item_count(), 2);

    account.sign_in("amina@example.com");
    cart.observe_session(SessionState::Authenticated).await;
    let err = cart.set_quantity(key, -3).await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidQuantity(_)));
    assert_eq!(account.calls(Operation::UpdateLine), 0);
    assert_eq!(cart.item_count(), 2);
}

#[tokio::test]
async fn test_account_cart_edits_reach_the_account() {
    let account = MemoryAccount::signed_in("amina@example.com");
    let mut cart = CartService::new(MemoryStorage::new(), account.clone());
    cart.observe_session(SessionState::Authenticated).await;

    cart.add(line(7, 1)).await.unwrap();
    cart.add(line(8, 1)).await.unwrap();
    cart.set_quantity(LineKey::new(ProductId::new(7), None), 4)
        .await
        .unwrap();
    cart.remove(LineKey::new(ProductId::new(8), None))
        .await
        .unwrap();

    let lines = account.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity.get(), 4);
    assert_eq!(cart.item_count(), 4);

    let missing = LineKey::new(ProductId::new(99), None);
    let err = cart.set_quantity(missing, 2).await.unwrap_err();
    assert!(matches!(err, SyncError::LineNotFound(key) if key == missing));

    cart.clear().await.unwrap();
    assert!(account.lines().is_empty());
    assert_eq!(cart.item_count(), 0);
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
async fn test_guest_favorite_asks_for_sign_in_then_succeeds() {
    let account = MemoryAccount::new();
    let mut wishlist = WishlistService::new(ServerWishlist::with_throttle(
        account.clone(),
        Duration::ZERO,
    ));
    wishlist.observe_session(SessionState::Anonymous).await;

    let action = wishlist
        .add(ProductId::new(7), "/collections/bagues")
        .await
        .unwrap();
    let WishlistAction::LoginRequired(intent) = action else {
        panic!("guest add should ask for sign-in, got {action:?}");
    };
    assert_eq!(intent.action, IntentAction::Favorite);
    assert_eq!(intent.product_id, Some(ProductId::new(7)));
    assert_eq!(account.calls(Operation::AddWishlist), 0);

    let url = intent.login_url(&Url::parse("https://diamantrouge.ma").unwrap());
    assert_eq!(url.path(), "/auth");
    assert!(url.query().unwrap().contains("productId=7"));

    account.sign_in("amina@example.com");
    wishlist.observe_session(SessionState::Authenticated).await;
    let action = wishlist
        .add(intent.product_id.unwrap(), &intent.return_url)
        .await
        .unwrap();

    assert_eq!(action, WishlistAction::Added);
    assert!(wishlist.contains(ProductId::new(7)));
    assert_eq!(account.wishlist().len(), 1);
}

#[tokio::test]
async fn test_wishlist_toggle_and_sign_out() {
    let account = MemoryAccount::signed_in("amina@example.com");
    account.seed_wishlist(ProductId::new(3));
    let mut wishlist = WishlistService::new(ServerWishlist::new(account.clone()));
    wishlist.observe_session(SessionState::Authenticated).await;
    assert!(wishlist.contains(ProductId::new(3)));

    let action = wishlist.toggle(ProductId::new(3), "/").await.unwrap();
    assert_eq!(action, WishlistAction::Removed);
    assert!(account.wishlist().is_empty());

    let action = wishlist.toggle(ProductId::new(3), "/").await.unwrap();
    assert_eq!(action, WishlistAction::Added);
    assert_eq!(account.wishlist().len(), 1);

    wishlist.observe_session(SessionState::Anonymous).await;
    assert!(wishlist.entries().is_empty());
}

#[tokio::test]
async fn test_rejected_wishlist_add_is_not_kept() {
    let account = MemoryAccount::signed_in("amina@example.com");
    let mut wishlist = WishlistService::new(ServerWishlist::with_throttle(
        account.clone(),
        Duration::ZERO,
    ));
    wishlist.observe_session(SessionState::Authenticated).await;

    account.fail(Operation::AddWishlist);
    let result = wishlist.add(ProductId::new(11), "/").await;

    assert!(result.is_err());
    assert!(!wishlist.contains(ProductId::new(11)));
}
