//! Account cart view.
//!
//! Mutations are never applied locally ahead of the server: each one is sent
//! to the account, and on success the whole cart is fetched again so the
//! server's merge and pricing rules are what the shopper sees.

use tracing::{instrument, warn};

use diamant_rouge_core::line::{find_line, total_units};
use diamant_rouge_core::{CartLine, LineKey, Quantity};

use crate::api::AccountApi;
use crate::error::SyncError;

/// The signed-in shopper's cart, mirrored from the account.
#[derive(Debug)]
pub struct ServerCart<A> {
    api: A,
    lines: Vec<CartLine>,
}

impl<A: AccountApi> ServerCart<A> {
    /// Create an empty view. Call [`Self::refresh`] to load it.
    pub const fn new(api: A) -> Self {
        Self {
            api,
            lines: Vec::new(),
        }
    }

    /// The account API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Current lines as last fetched.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        total_units(&self.lines)
    }

    /// Replace the view with the account's cart.
    ///
    /// On failure the previous view is kept and the error returned.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        match self.api.fetch_cart().await {
            Ok(lines) => {
                self.lines = lines;
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Failed to fetch account cart");
                Err(error.into())
            }
        }
    }

    /// Add a line.
    ///
    /// A line already present with the same key is updated to the summed
    /// quantity; otherwise a new line is created.
    #[instrument(skip(self, line), fields(key = %line.key()))]
    pub async fn add(&mut self, line: CartLine) -> Result<(), SyncError> {
        let existing = find_line(&self.lines, line.key())
            .and_then(|existing| existing.id.map(|id| (id, existing.quantity)));

        let result = match existing {
            Some((id, quantity)) => self
                .api
                .update_cart_line(id, quantity.saturating_add(line.quantity))
                .await
                .map(drop),
            None => self.api.create_cart_line(line.to_new_line()).await.map(drop),
        };

        self.finish(result, "add to account cart").await
    }

    /// Remove the line with `key`.
    ///
    /// Unknown keys and lines without a server id are ignored.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, key: LineKey) -> Result<(), SyncError> {
        let Some(id) = find_line(&self.lines, key).and_then(|line| line.id) else {
            return Ok(());
        };
        let result = self.api.delete_cart_line(id).await;
        self.finish(result, "remove account cart line").await
    }

    /// Overwrite the quantity of the line with `key`.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for values below one (nothing is sent),
    /// `LineNotFound` for unknown keys, `Api` if the account call fails.
    #[instrument(skip(self))]
    pub async fn set_quantity(&mut self, key: LineKey, quantity: i64) -> Result<(), SyncError> {
        let quantity = Quantity::try_from(quantity)?;
        let id = find_line(&self.lines, key)
            .and_then(|line| line.id)
            .ok_or(SyncError::LineNotFound(key))?;

        let result = self.api.update_cart_line(id, quantity).await.map(drop);
        self.finish(result, "update account cart line").await
    }

    /// Delete every line of the account cart.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), SyncError> {
        match self.api.clear_cart().await {
            Ok(()) => {
                self.lines.clear();
                Ok(())
            }
            Err(error) => {
                warn!(%error, "Failed to clear account cart");
                Err(error.into())
            }
        }
    }

    /// Forget the local view without touching the account.
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    /// Re-fetch after a successful mutation, or log and return the failure.
    async fn finish(
        &mut self,
        result: Result<(), crate::api::ApiError>,
        action: &str,
    ) -> Result<(), SyncError> {
        match result {
            Ok(()) => self.refresh().await,
            Err(error) => {
                warn!(%error, action, "Account cart mutation failed");
                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryAccount, Operation};
    use diamant_rouge_core::{NewCartLine, ProductId, VariationId};

    fn line(product: i32, variation: Option<i32>, n: u32) -> CartLine {
        CartLine::new(
            ProductId::new(product),
            variation.map(VariationId::new),
            Quantity::new(n).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_add_creates_then_updates() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut cart = ServerCart::new(account.clone());

        cart.add(line(7, None, 2)).await.unwrap();
        cart.add(line(7, None, 1)).await.unwrap();

        assert_eq!(account.calls(Operation::CreateLine), 1);
        assert_eq!(account.calls(Operation::UpdateLine), 1);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity.get(), 3);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_view_unchanged() {
        let account = MemoryAccount::signed_in("amina@example.com");
        account.seed_line(NewCartLine {
            product_id: ProductId::new(1),
            variation_id: None,
            quantity: Quantity::ONE,
        });
        let mut cart = ServerCart::new(account.clone());
        cart.refresh().await.unwrap();
        let before = cart.lines().to_vec();

        account.fail(Operation::CreateLine);
        let err = cart.add(line(2, None, 1)).await.unwrap_err();

        assert!(matches!(err, SyncError::Api(_)));
        assert_eq!(cart.lines(), before.as_slice());
        // No retry
        assert_eq!(account.calls(Operation::CreateLine), 1);
    }

    #[tokio::test]
    async fn test_set_quantity_floor_sends_nothing() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut cart = ServerCart::new(account.clone());
        cart.add(line(5, None, 2)).await.unwrap();
        let key = cart.lines()[0].key();

        let err = cart.set_quantity(key, 0).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidQuantity(_)));
        assert_eq!(account.calls(Operation::UpdateLine), 0);
        assert_eq!(cart.lines()[0].quantity.get(), 2);

        cart.set_quantity(key, 4).await.unwrap();
        assert_eq!(cart.lines()[0].quantity.get(), 4);
    }

    #[tokio::test]
    async fn test_set_quantity_unknown_key() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut cart = ServerCart::new(account);
        let key = LineKey::new(ProductId::new(42), None);

        let err = cart.set_quantity(key, 2).await.unwrap_err();
        assert!(matches!(err, SyncError::LineNotFound(k) if k == key));
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut cart = ServerCart::new(account.clone());
        cart.add(line(1, None, 1)).await.unwrap();
        cart.add(line(2, Some(9), 1)).await.unwrap();

        // Unknown key is a no-op without a call
        cart.remove(LineKey::new(ProductId::new(2), None)).await.unwrap();
        assert_eq!(account.calls(Operation::DeleteLine), 0);

        cart.remove(LineKey::new(ProductId::new(2), Some(VariationId::new(9))))
            .await
            .unwrap();
        assert_eq!(cart.lines().len(), 1);

        cart.clear().await.unwrap();
        assert!(cart.lines().is_empty());
        assert!(account.lines().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_view() {
        let account = MemoryAccount::signed_in("amina@example.com");
        let mut cart = ServerCart::new(account.clone());
        cart.add(line(1, None, 1)).await.unwrap();

        account.fail(Operation::FetchCart);
        assert!(cart.refresh().await.is_err());
        assert_eq!(cart.lines().len(), 1);
    }
}
