//! Cart and wishlist services handed to the view layer.
//!
//! Each service owns its stores and routes operations by the last observed
//! [`SessionState`]. The view creates them once and passes them down; they
//! hold no global state.

use tracing::instrument;

use diamant_rouge_core::line::total_units;
use diamant_rouge_core::{CartLine, LineKey, ProductId, Quantity, WishlistEntry};

use crate::api::AccountApi;
use crate::cart::ServerCart;
use crate::error::SyncError;
use crate::guest::GuestCart;
use crate::reconcile::{MergeReport, MergeState, Reconciler};
use crate::session::{LoginIntent, SessionState};
use crate::storage::GuestStorage;
use crate::wishlist::ServerWishlist;

// =============================================================================
// CartService
// =============================================================================

/// Where the shopper goes when they ask to check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Nothing to check out.
    EmptyCart,
    /// Anonymous shoppers sign in first; the guest cart merges on sign-in.
    LoginRequired(LoginIntent),
    /// The account cart is ready for the checkout page.
    Ready,
}

/// Cart operations for the current shopper.
///
/// Anonymous (and not yet known) sessions use the guest cart; signed-in
/// sessions use the account cart. The first signed-in observation merges the
/// guest cart into the account.
#[derive(Debug)]
pub struct CartService<S, A> {
    guest: GuestCart<S>,
    server: ServerCart<A>,
    reconciler: Reconciler,
    session: SessionState,
}

impl<S, A> CartService<S, A>
where
    S: GuestStorage + Send,
    A: AccountApi,
{
    /// Open the guest cart from `storage` and bind the account cart to `api`.
    pub fn new(storage: S, api: A) -> Self {
        Self {
            guest: GuestCart::open(storage),
            server: ServerCart::new(api),
            reconciler: Reconciler::new(),
            session: SessionState::Loading,
        }
    }

    #[must_use]
    pub const fn session(&self) -> SessionState {
        self.session
    }

    #[must_use]
    pub const fn merge_state(&self) -> MergeState {
        self.reconciler.state()
    }

    pub const fn guest(&self) -> &GuestCart<S> {
        &self.guest
    }

    pub const fn server(&self) -> &ServerCart<A> {
        &self.server
    }

    /// Record a session observation.
    ///
    /// Returns the merge report when this observation merged the guest cart.
    #[instrument(skip(self))]
    pub async fn observe_session(&mut self, session: SessionState) -> Option<MergeReport> {
        self.session = session;
        let report = self
            .reconciler
            .observe(session, &mut self.guest, &mut self.server)
            .await;

        if session == SessionState::Anonymous {
            self.server.reset();
            self.guest.reload();
        }
        report
    }

    /// Add a line to the active cart.
    pub async fn add(&mut self, line: CartLine) -> Result<(), SyncError> {
        if self.session.is_authenticated() {
            return self.server.add(line).await;
        }
        self.guest.add(line);
        Ok(())
    }

    /// Remove a line from the active cart.
    pub async fn remove(&mut self, key: LineKey) -> Result<(), SyncError> {
        if self.session.is_authenticated() {
            return self.server.remove(key).await;
        }
        self.guest.remove(key);
        Ok(())
    }

    /// Overwrite a line quantity in the active cart.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for values below one and `LineNotFound` when no
    /// line has `key`. Nothing changes in either case.
    pub async fn set_quantity(&mut self, key: LineKey, quantity: i64) -> Result<(), SyncError> {
        if self.session.is_authenticated() {
            return self.server.set_quantity(key, quantity).await;
        }
        Quantity::try_from(quantity)?;
        if self.guest.set_quantity(key, quantity) {
            Ok(())
        } else {
            Err(SyncError::LineNotFound(key))
        }
    }

    /// Empty the active cart.
    pub async fn clear(&mut self) -> Result<(), SyncError> {
        if self.session.is_authenticated() {
            return self.server.clear().await;
        }
        self.guest.clear();
        Ok(())
    }

    /// Reload the active cart from its source.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        if self.session.is_authenticated() {
            return self.server.refresh().await;
        }
        self.guest.reload();
        Ok(())
    }

    /// Lines of the active cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        if self.session.is_authenticated() {
            self.server.lines()
        } else {
            self.guest.lines()
        }
    }

    /// Total units in the active cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        total_units(self.lines())
    }

    /// Decide the next checkout step. `return_url` is where an anonymous
    /// shopper lands after signing in.
    #[must_use]
    pub fn checkout(&self, return_url: &str) -> CheckoutStep {
        if self.lines().is_empty() {
            CheckoutStep::EmptyCart
        } else if self.session.is_authenticated() {
            CheckoutStep::Ready
        } else {
            CheckoutStep::LoginRequired(LoginIntent::checkout(return_url))
        }
    }
}

// =============================================================================
// WishlistService
// =============================================================================

/// Result of a wishlist add or toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistAction {
    Added,
    Removed,
    /// The shopper must sign in first.
    LoginRequired(LoginIntent),
}

/// Wishlist operations and the wishlist panel state.
///
/// The wishlist exists only for signed-in shoppers.
#[derive(Debug)]
pub struct WishlistService<A> {
    wishlist: ServerWishlist<A>,
    session: SessionState,
    panel_open: bool,
}

impl<A: AccountApi> WishlistService<A> {
    pub const fn new(wishlist: ServerWishlist<A>) -> Self {
        Self {
            wishlist,
            session: SessionState::Loading,
            panel_open: false,
        }
    }

    #[must_use]
    pub const fn session(&self) -> SessionState {
        self.session
    }

    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        self.wishlist.entries()
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    #[must_use]
    pub const fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    /// Record a session observation.
    ///
    /// Signing in loads the wishlist; signing out forgets it.
    #[instrument(skip(self))]
    pub async fn observe_session(&mut self, session: SessionState) {
        let was_authenticated = self.session.is_authenticated();
        self.session = session;

        match session {
            SessionState::Authenticated if !was_authenticated => {
                // Already logged; an empty view is shown until the next refresh
                let _ = self.wishlist.force_refresh().await;
            }
            SessionState::Anonymous => {
                self.wishlist.reset();
                self.panel_open = false;
            }
            _ => {}
        }
    }

    /// Add a product, or ask for sign-in when anonymous.
    ///
    /// `return_url` is where the shopper comes back to after signing in.
    pub async fn add(
        &mut self,
        product_id: ProductId,
        return_url: &str,
    ) -> Result<WishlistAction, SyncError> {
        if !self.session.is_authenticated() {
            self.panel_open = false;
            return Ok(WishlistAction::LoginRequired(LoginIntent::favorite(
                product_id, return_url,
            )));
        }
        self.wishlist.add(product_id).await?;
        Ok(WishlistAction::Added)
    }

    /// Remove a product. Does nothing when anonymous.
    pub async fn remove(&mut self, product_id: ProductId) -> Result<(), SyncError> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        self.wishlist.remove(product_id).await
    }

    /// Add the product if absent, remove it if present.
    pub async fn toggle(
        &mut self,
        product_id: ProductId,
        return_url: &str,
    ) -> Result<WishlistAction, SyncError> {
        if self.session.is_authenticated() && self.contains(product_id) {
            self.wishlist.remove(product_id).await?;
            return Ok(WishlistAction::Removed);
        }
        self.add(product_id, return_url).await
    }

    /// Reload the wishlist, subject to the refresh throttle.
    pub async fn refresh(&mut self) -> Result<(), SyncError> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        self.wishlist.refresh().await
    }

    /// Open the panel. A signed-in shopper's wishlist is refreshed.
    pub async fn open_panel(&mut self) {
        self.panel_open = true;
        // Already logged by the wishlist
        let _ = self.refresh().await;
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    pub async fn toggle_panel(&mut self) {
        if self.panel_open {
            self.close_panel();
        } else {
            self.open_panel().await;
        }
    }
}
