//! In-memory `AccountApi` for tests.
//!
//! Mirrors the storefront's semantics: create on an existing key adds to the
//! quantity, wishlist adds are idempotent, and every account call answers
//! `Unauthorized` until [`MemoryAccount::sign_in`] is called. Individual
//! operations can be made to fail to exercise error paths.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use diamant_rouge_core::line::{insert_wishlist_entry, remove_wishlist_entry};
use diamant_rouge_core::{
    CartLine, CartLineId, NewCartLine, ProductId, Quantity, WishlistEntry, WishlistEntryId,
};

use super::{AccountApi, ApiError, SessionInfo};

/// An account endpoint, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Session,
    FetchCart,
    CreateLine,
    UpdateLine,
    DeleteLine,
    ClearCart,
    FetchWishlist,
    AddWishlist,
    RemoveWishlist,
}

#[derive(Debug, Default)]
struct State {
    email: Option<String>,
    lines: Vec<CartLine>,
    wishlist: Vec<WishlistEntry>,
    next_id: i32,
    calls: HashMap<Operation, usize>,
    created: Vec<NewCartLine>,
    failing: HashSet<Operation>,
    failing_products: HashSet<ProductId>,
    stalled_products: HashSet<ProductId>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory account. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccount {
    state: Arc<Mutex<State>>,
}

impl MemoryAccount {
    /// An anonymous account with an empty cart and wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An account already signed in as `email`.
    #[must_use]
    pub fn signed_in(email: &str) -> Self {
        let account = Self::new();
        account.sign_in(email);
        account
    }

    pub fn sign_in(&self, email: &str) {
        self.state.lock().email = Some(email.to_string());
    }

    pub fn sign_out(&self) {
        self.state.lock().email = None;
    }

    /// Make every call to `op` fail until [`Self::heal`] is called.
    pub fn fail(&self, op: Operation) {
        self.state.lock().failing.insert(op);
    }

    pub fn heal(&self, op: Operation) {
        self.state.lock().failing.remove(&op);
    }

    /// Make line creation fail for one product only.
    pub fn fail_create_for(&self, product_id: ProductId) {
        self.state.lock().failing_products.insert(product_id);
    }

    /// Make line creation for one product never complete.
    pub fn stall_create_for(&self, product_id: ProductId) {
        self.state.lock().stalled_products.insert(product_id);
    }

    /// Number of calls made to `op`, failed ones included.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Payloads of successful create calls, in order.
    #[must_use]
    pub fn created(&self) -> Vec<NewCartLine> {
        self.state.lock().created.clone()
    }

    /// Current server-side cart.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.state.lock().lines.clone()
    }

    /// Current server-side wishlist.
    #[must_use]
    pub fn wishlist(&self) -> Vec<WishlistEntry> {
        self.state.lock().wishlist.clone()
    }

    /// Put a line into the server cart without counting a call.
    pub fn seed_line(&self, line: NewCartLine) {
        let mut state = self.state.lock();
        upsert(&mut state, line);
    }

    /// Put a product into the server wishlist without counting a call.
    pub fn seed_wishlist(&self, product_id: ProductId) {
        let mut state = self.state.lock();
        let id = WishlistEntryId::new(state.next_id());
        insert_wishlist_entry(
            &mut state.wishlist,
            WishlistEntry {
                id: Some(id),
                product_id,
                product: None,
            },
        );
    }

    /// Count the call and check session and failure injection.
    fn begin(&self, op: Operation) -> Result<parking_lot::MutexGuard<'_, State>, ApiError> {
        let mut state = self.state.lock();
        *state.calls.entry(op).or_default() += 1;

        if state.failing.contains(&op) {
            return Err(injected());
        }
        if op != Operation::Session && state.email.is_none() {
            return Err(ApiError::Unauthorized);
        }
        Ok(state)
    }
}

fn injected() -> ApiError {
    ApiError::Status {
        status: 503,
        message: "injected failure".to_string(),
    }
}

fn upsert(state: &mut State, line: NewCartLine) -> CartLine {
    let key = line.key();
    if let Some(existing) = state.lines.iter_mut().find(|l| l.key() == key) {
        existing.quantity = existing.quantity.saturating_add(line.quantity);
        return existing.clone();
    }
    let id = CartLineId::new(state.next_id());
    let created = CartLine {
        id: Some(id),
        product_id: line.product_id,
        variation_id: line.variation_id,
        quantity: line.quantity,
        product: None,
    };
    state.lines.push(created.clone());
    created
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Cart item not found".to_string(),
    }
}

impl AccountApi for MemoryAccount {
    async fn session(&self) -> Result<SessionInfo, ApiError> {
        let state = self.begin(Operation::Session)?;
        Ok(SessionInfo {
            authenticated: state.email.is_some(),
            email: state.email.clone(),
        })
    }

    async fn fetch_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        let state = self.begin(Operation::FetchCart)?;
        Ok(state.lines.clone())
    }

    async fn create_cart_line(&self, line: NewCartLine) -> Result<CartLine, ApiError> {
        let stalled = {
            let state = self.begin(Operation::CreateLine)?;
            if state.failing_products.contains(&line.product_id) {
                return Err(injected());
            }
            state.stalled_products.contains(&line.product_id)
        };
        if stalled {
            std::future::pending::<()>().await;
        }

        let mut state = self.state.lock();
        state.created.push(line);
        Ok(upsert(&mut state, line))
    }

    async fn update_cart_line(&self, id: CartLineId, quantity: Quantity) -> Result<CartLine, ApiError> {
        let mut state = self.begin(Operation::UpdateLine)?;
        let line = state
            .lines
            .iter_mut()
            .find(|line| line.id == Some(id))
            .ok_or_else(not_found)?;
        line.quantity = quantity;
        Ok(line.clone())
    }

    async fn delete_cart_line(&self, id: CartLineId) -> Result<(), ApiError> {
        let mut state = self.begin(Operation::DeleteLine)?;
        let before = state.lines.len();
        state.lines.retain(|line| line.id != Some(id));
        if state.lines.len() == before {
            return Err(not_found());
        }
        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        let mut state = self.begin(Operation::ClearCart)?;
        state.lines.clear();
        Ok(())
    }

    async fn fetch_wishlist(&self) -> Result<Vec<WishlistEntry>, ApiError> {
        let state = self.begin(Operation::FetchWishlist)?;
        Ok(state.wishlist.clone())
    }

    async fn add_to_wishlist(&self, product_id: ProductId) -> Result<WishlistEntry, ApiError> {
        let mut state = self.begin(Operation::AddWishlist)?;
        if let Some(existing) = state.wishlist.iter().find(|e| e.product_id == product_id) {
            return Ok(existing.clone());
        }
        let entry = WishlistEntry {
            id: Some(WishlistEntryId::new(state.next_id())),
            product_id,
            product: None,
        };
        state.wishlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_from_wishlist(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut state = self.begin(Operation::RemoveWishlist)?;
        remove_wishlist_entry(&mut state.wishlist, product_id);
        Ok(())
    }
}
