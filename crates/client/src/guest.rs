//! Guest cart persisted in local storage.
//!
//! Storage problems never surface to the caller. A failed read starts the
//! cart empty and a failed write switches it to memory-only mode for the
//! rest of its life; both are logged.

use tracing::{debug, warn};

use diamant_rouge_core::line::{merge_line, remove_line, set_line_quantity, total_units};
use diamant_rouge_core::{CartLine, LineKey, Quantity};

use crate::storage::GuestStorage;

/// Storage key holding the guest cart as a JSON array of lines.
pub const GUEST_CART_KEY: &str = "diamant_rouge_guest_cart";

/// Cart of an anonymous shopper.
#[derive(Debug)]
pub struct GuestCart<S> {
    storage: S,
    lines: Vec<CartLine>,
    degraded: bool,
}

impl<S: GuestStorage> GuestCart<S> {
    /// Open the cart, reading whatever is persisted.
    pub fn open(storage: S) -> Self {
        let mut cart = Self {
            storage,
            lines: Vec::new(),
            degraded: false,
        };
        cart.reload();
        cart
    }

    /// Re-read the persisted collection.
    ///
    /// A missing key is an empty cart. An unreadable or corrupt value is
    /// logged and leaves the cart empty and memory-only. Once memory-only,
    /// the in-memory lines are authoritative and this does nothing.
    pub fn reload(&mut self) {
        if self.degraded {
            return;
        }
        self.lines = match self.storage.load(GUEST_CART_KEY) {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => normalize(lines),
                Err(error) => {
                    warn!(%error, "Guest cart is corrupt, starting empty");
                    self.degraded = true;
                    Vec::new()
                }
            },
            Err(error) => {
                warn!(%error, "Failed to read guest cart, starting empty");
                self.degraded = true;
                Vec::new()
            }
        };
    }

    /// Add a line. Quantities of an existing line with the same key add up.
    pub fn add(&mut self, line: CartLine) {
        let key = line.key();
        let quantity = merge_line(&mut self.lines, line);
        debug!(%key, %quantity, "Guest cart line added");
        self.persist();
    }

    /// Remove the line with `key`. Removing a missing line does nothing.
    pub fn remove(&mut self, key: LineKey) {
        if remove_line(&mut self.lines, key) {
            self.persist();
        }
    }

    /// Overwrite the quantity of the line with `key`.
    ///
    /// Quantities below one and unknown keys are ignored. Returns whether
    /// the cart changed.
    pub fn set_quantity(&mut self, key: LineKey, quantity: i64) -> bool {
        let Ok(quantity) = Quantity::try_from(quantity) else {
            return false;
        };
        if !set_line_quantity(&mut self.lines, key, quantity) {
            return false;
        }
        self.persist();
        true
    }

    /// Empty the cart and delete the persisted key.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.erase_persisted();
    }

    /// Take every line out of the cart and delete the persisted key.
    ///
    /// The key is removed even in memory-only mode so the same lines can
    /// never be read back later.
    pub fn erase(&mut self) -> Vec<CartLine> {
        let lines = std::mem::take(&mut self.lines);
        self.erase_persisted();
        lines
    }

    /// Current lines.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        total_units(&self.lines)
    }

    /// Whether storage failed and the cart is memory-only.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&mut self) {
        if self.degraded {
            return;
        }

        let result = serde_json::to_string(&self.lines)
            .map_err(Into::into)
            .and_then(|raw| self.storage.save(GUEST_CART_KEY, &raw));

        if let Err(error) = result {
            warn!(%error, "Failed to persist guest cart, continuing in memory");
            self.degraded = true;
        }
    }

    fn erase_persisted(&mut self) {
        if let Err(error) = self.storage.remove(GUEST_CART_KEY) {
            warn!(%error, "Failed to remove persisted guest cart");
            self.degraded = true;
        }
    }
}

/// Fold duplicate keys written by an older build into single lines.
fn normalize(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut normalized = Vec::with_capacity(lines.len());
    for line in lines {
        merge_line(&mut normalized, line);
    }
    normalized
}
