//! Account wishlist view with optimistic updates.
//!
//! Adds and removes are applied locally first and then sent to the account.
//! When the account call fails the view is re-fetched; if that fails as well
//! the local change is reverted, so the view never keeps a change the
//! account rejected.

use std::time::{Duration, Instant};

use tracing::{debug, instrument, warn};

use diamant_rouge_core::line::{insert_wishlist_entry, remove_wishlist_entry, wishlist_contains};
use diamant_rouge_core::{ProductId, WishlistEntry};

use crate::api::AccountApi;
use crate::error::SyncError;

/// Minimum time between two throttled fetches of a non-empty wishlist.
pub const REFRESH_THROTTLE: Duration = Duration::from_secs(2);

/// The signed-in shopper's wishlist, mirrored from the account.
#[derive(Debug)]
pub struct ServerWishlist<A> {
    api: A,
    entries: Vec<WishlistEntry>,
    last_fetch: Option<Instant>,
    throttle: Duration,
}

impl<A: AccountApi> ServerWishlist<A> {
    /// Create an empty view with the default throttle.
    pub const fn new(api: A) -> Self {
        Self::with_throttle(api, REFRESH_THROTTLE)
    }

    /// Create an empty view with a custom throttle.
    pub const fn with_throttle(api: A, throttle: Duration) -> Self {
        Self {
            api,
            entries: Vec::new(),
            last_fetch: None,
            throttle,
        }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        wishlist_contains(&self.entries, product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch the wishlist unless a non-empty one was fetched within the
    /// throttle window.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        let recent = self
            .last_fetch
            .is_some_and(|at| at.elapsed() < self.throttle);
        if recent && !self.entries.is_empty() {
            debug!("Wishlist fetched recently, skipping");
            return Ok(());
        }
        self.force_refresh().await
    }

    /// Fetch the wishlist now. On failure the previous view is kept.
    #[instrument(skip(self))]
    pub async fn force_refresh(&mut self) -> Result<(), SyncError> {
        match self.api.fetch_wishlist().await {
            Ok(entries) => {
                self.entries = entries;
                self.last_fetch = Some(Instant::now());
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Failed to fetch wishlist");
                Err(error.into())
            }
        }
    }

    /// Add a product.
    #[instrument(skip(self))]
    pub async fn add(&mut self, product_id: ProductId) -> Result<(), SyncError> {
        let inserted = insert_wishlist_entry(&mut self.entries, WishlistEntry::pending(product_id));

        match self.api.add_to_wishlist(product_id).await {
            Ok(confirmed) => {
                if let Some(entry) = self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.product_id == product_id)
                {
                    *entry = confirmed;
                }
                self.reconcile().await;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Failed to add to wishlist");
                if self.force_refresh().await.is_err() && inserted {
                    remove_wishlist_entry(&mut self.entries, product_id);
                }
                Err(error.into())
            }
        }
    }

    /// Remove a product.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, product_id: ProductId) -> Result<(), SyncError> {
        let removed = remove_wishlist_entry(&mut self.entries, product_id);

        match self.api.remove_from_wishlist(product_id).await {
            Ok(()) => {
                self.reconcile().await;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Failed to remove from wishlist");
                if self.force_refresh().await.is_err() {
                    if let Some(entry) = removed {
                        insert_wishlist_entry(&mut self.entries, entry);
                    }
                }
                Err(error.into())
            }
        }
    }

    /// Forget the local view without touching the account.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.last_fetch = None;
    }

    /// Throttled fetch after a confirmed change. Failures are only logged.
    async fn reconcile(&mut self) {
        // Already logged by force_refresh
        let _ = self.refresh().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryAccount, Operation};

    #[tokio::test]
    async fn test_add_is_visible_and_confirmed() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut wishlist = ServerWishlist::new(account.clone());

        wishlist.add(ProductId::new(7)).await.unwrap();

        assert!(wishlist.contains(ProductId::new(7)));
        assert!(wishlist.entries()[0].id.is_some());
        assert_eq!(account.wishlist().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_reverts_when_refetch_fails() {
        let account = MemoryAccount::signed_in("amina@example.com");
        account.fail(Operation::AddWishlist);
        account.fail(Operation::FetchWishlist);
        let mut wishlist = ServerWishlist::new(account.clone());

        assert!(wishlist.add(ProductId::new(7)).await.is_err());
        assert!(!wishlist.contains(ProductId::new(7)));
        // One compensating fetch, no retries
        assert_eq!(account.calls(Operation::FetchWishlist), 1);
        assert_eq!(account.calls(Operation::AddWishlist), 1);
    }

    #[tokio::test]
    async fn test_failed_add_resyncs_from_account() {
        let account = MemoryAccount::signed_in("amina@example.com");
        account.seed_wishlist(ProductId::new(1));
        account.fail(Operation::AddWishlist);
        let mut wishlist = ServerWishlist::new(account.clone());

        assert!(wishlist.add(ProductId::new(7)).await.is_err());
        assert!(!wishlist.contains(ProductId::new(7)));
        assert!(wishlist.contains(ProductId::new(1)));
    }

    #[tokio::test]
    async fn test_failed_remove_restores_entry() {
        let account = MemoryAccount::signed_in("amina@example.com");
        account.seed_wishlist(ProductId::new(3));
        let mut wishlist = ServerWishlist::new(account.clone());
        wishlist.force_refresh().await.unwrap();

        account.fail(Operation::RemoveWishlist);
        account.fail(Operation::FetchWishlist);
        assert!(wishlist.remove(ProductId::new(3)).await.is_err());
        assert!(wishlist.contains(ProductId::new(3)));
    }

    #[tokio::test]
    async fn test_refresh_is_throttled_when_non_empty() {
        let account = MemoryAccount::signed_in("amina@example.com");
        account.seed_wishlist(ProductId::new(3));
        let mut wishlist = ServerWishlist::with_throttle(account.clone(), Duration::from_secs(60));

        wishlist.refresh().await.unwrap();
        wishlist.refresh().await.unwrap();
        assert_eq!(account.calls(Operation::FetchWishlist), 1);

        wishlist.force_refresh().await.unwrap();
        assert_eq!(account.calls(Operation::FetchWishlist), 2);
    }

    #[tokio::test]
    async fn test_empty_wishlist_is_never_throttled() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut wishlist = ServerWishlist::with_throttle(account.clone(), Duration::from_secs(60));

        wishlist.refresh().await.unwrap();
        wishlist.refresh().await.unwrap();
        assert_eq!(account.calls(Operation::FetchWishlist), 2);
    }
}
