//! Cart line and wishlist entry identity.
//!
//! A cart holds at most one line per [`LineKey`] and a wishlist holds at most
//! one entry per product. The helpers here are the only code that mutates a
//! line collection, so the guest store, the account store and the server
//! repository all agree on what "the same line" means.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartLineId, ProductId, Quantity, VariationId, WishlistEntryId};

/// Identity of a cart line: a product and, optionally, one of its variations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
}

impl LineKey {
    /// Create a key.
    #[must_use]
    pub const fn new(product_id: ProductId, variation_id: Option<VariationId>) -> Self {
        Self {
            product_id,
            variation_id,
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.variation_id {
            Some(variation) => write!(f, "product {}/variation {variation}", self.product_id),
            None => write!(f, "product {}", self.product_id),
        }
    }
}

/// Display fields the server denormalizes onto lines and wishlist entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub sku: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One line of a cart.
///
/// Guest lines have no `id`; lines fetched from the account carry the
/// server-assigned id used for update and delete calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartLineId>,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
}

impl CartLine {
    /// Create a line without server id or display snapshot.
    #[must_use]
    pub const fn new(
        product_id: ProductId,
        variation_id: Option<VariationId>,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: None,
            product_id,
            variation_id,
            quantity,
            product: None,
        }
    }

    /// Attach a display snapshot.
    #[must_use]
    pub fn with_product(mut self, product: ProductSnapshot) -> Self {
        self.product = Some(product);
        self
    }

    /// The identity of this line.
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.variation_id)
    }

    /// The payload sent to the account on create; display fields are dropped.
    #[must_use]
    pub const fn to_new_line(&self) -> NewCartLine {
        NewCartLine {
            product_id: self.product_id,
            variation_id: self.variation_id,
            quantity: self.quantity,
        }
    }
}

/// Create payload for an account cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartLine {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub quantity: Quantity,
}

impl NewCartLine {
    /// The identity of the line this payload creates or grows.
    #[must_use]
    pub const fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.variation_id)
    }
}

/// A wishlist membership marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WishlistEntryId>,
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
}

impl WishlistEntry {
    /// A tentative entry not yet confirmed by the account.
    #[must_use]
    pub const fn pending(product_id: ProductId) -> Self {
        Self {
            id: None,
            product_id,
            product: None,
        }
    }
}

// =============================================================================
// Collection helpers
// =============================================================================

/// Find the line with the given key.
#[must_use]
pub fn find_line(lines: &[CartLine], key: LineKey) -> Option<&CartLine> {
    lines.iter().find(|line| line.key() == key)
}

/// Merge a line into a collection.
///
/// If a line with the same key exists its quantity grows by the incoming
/// quantity; otherwise the line is appended. Returns the resulting quantity.
pub fn merge_line(lines: &mut Vec<CartLine>, incoming: CartLine) -> Quantity {
    let key = incoming.key();
    if let Some(existing) = lines.iter_mut().find(|line| line.key() == key) {
        existing.quantity = existing.quantity.saturating_add(incoming.quantity);
        return existing.quantity;
    }
    let quantity = incoming.quantity;
    lines.push(incoming);
    quantity
}

/// Remove the line with the given key. Returns whether a line was removed.
pub fn remove_line(lines: &mut Vec<CartLine>, key: LineKey) -> bool {
    let before = lines.len();
    lines.retain(|line| line.key() != key);
    lines.len() != before
}

/// Overwrite the quantity of the line with the given key.
///
/// Returns whether a line was found.
pub fn set_line_quantity(lines: &mut [CartLine], key: LineKey, quantity: Quantity) -> bool {
    match lines.iter_mut().find(|line| line.key() == key) {
        Some(line) => {
            line.quantity = quantity;
            true
        }
        None => false,
    }
}

/// Total number of units across all lines.
#[must_use]
pub fn total_units(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity.get())).sum()
}

/// Whether a wishlist contains the product.
#[must_use]
pub fn wishlist_contains(entries: &[WishlistEntry], product_id: ProductId) -> bool {
    entries.iter().any(|entry| entry.product_id == product_id)
}

/// Insert a product into a wishlist unless already present.
///
/// Returns whether the entry was inserted.
pub fn insert_wishlist_entry(entries: &mut Vec<WishlistEntry>, entry: WishlistEntry) -> bool {
    if wishlist_contains(entries, entry.product_id) {
        return false;
    }
    entries.push(entry);
    true
}

/// Remove a product from a wishlist. Returns the removed entry, if any.
pub fn remove_wishlist_entry(
    entries: &mut Vec<WishlistEntry>,
    product_id: ProductId,
) -> Option<WishlistEntry> {
    let index = entries
        .iter()
        .position(|entry| entry.product_id == product_id)?;
    Some(entries.remove(index))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn line(product: i32, variation: Option<i32>, n: u32) -> CartLine {
        CartLine::new(ProductId::new(product), variation.map(VariationId::new), qty(n))
    }

    #[test]
    fn test_merge_same_key_adds_quantities() {
        let mut lines = Vec::new();
        merge_line(&mut lines, line(7, None, 2));
        let total = merge_line(&mut lines, line(7, None, 1));

        assert_eq!(lines.len(), 1);
        assert_eq!(total, qty(3));
        assert_eq!(lines[0].quantity, qty(3));
    }

    #[test]
    fn test_merge_distinguishes_variations() {
        let mut lines = Vec::new();
        merge_line(&mut lines, line(7, None, 1));
        merge_line(&mut lines, line(7, Some(48), 1));
        merge_line(&mut lines, line(7, Some(50), 1));

        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let mut lines = vec![line(1, None, 1), line(2, Some(3), 1)];
        let snapshot = lines.clone();

        assert!(!remove_line(&mut lines, LineKey::new(ProductId::new(2), None)));
        assert_eq!(lines, snapshot);

        assert!(remove_line(
            &mut lines,
            LineKey::new(ProductId::new(2), Some(VariationId::new(3)))
        ));
        assert!(find_line(&lines, LineKey::new(ProductId::new(2), Some(VariationId::new(3)))).is_none());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut lines = vec![line(1, None, 5)];
        let key = lines[0].key();

        assert!(set_line_quantity(&mut lines, key, qty(2)));
        assert_eq!(lines[0].quantity, qty(2));
        assert!(!set_line_quantity(
            &mut lines,
            LineKey::new(ProductId::new(9), None),
            qty(2)
        ));
    }

    #[test]
    fn test_new_line_drops_display_fields() {
        let with_snapshot = line(7, None, 3).with_product(ProductSnapshot {
            sku: "ROUGE-PASSION-001".to_string(),
            name: "Bague Rouge Passion".to_string(),
            price: Some(Decimal::new(499_999, 2)),
            image: None,
        });
        let payload = serde_json::to_value(with_snapshot.to_new_line()).unwrap();

        assert_eq!(payload, serde_json::json!({ "productId": 7, "quantity": 3 }));
    }

    #[test]
    fn test_wishlist_uniqueness() {
        let mut entries = Vec::new();
        assert!(insert_wishlist_entry(&mut entries, WishlistEntry::pending(ProductId::new(4))));
        assert!(!insert_wishlist_entry(&mut entries, WishlistEntry::pending(ProductId::new(4))));
        assert_eq!(entries.len(), 1);

        assert!(remove_wishlist_entry(&mut entries, ProductId::new(4)).is_some());
        assert!(remove_wishlist_entry(&mut entries, ProductId::new(4)).is_none());
    }
}
