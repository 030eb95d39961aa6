//! Shopper profile and order history.
//!
//! A profile carries the shipping address and the jewelry preferences the
//! shopper fills in on the account page. Orders are read-only here: they are
//! created elsewhere and listed newest first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderItemId, ProductId, Quantity, UserId};

/// Longest accepted value for a free-text profile field.
pub const MAX_FIELD_LENGTH: usize = 200;

/// Most entries accepted in a preference list.
pub const MAX_PREFERENCE_ENTRIES: usize = 20;

/// A profile update that breaks a field rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must be at most {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("{field} accepts at most {max} entries")]
    TooManyEntries { field: &'static str, max: usize },
}

/// Trim a free-text field; blank becomes `None`.
fn clean(value: Option<String>, field: &'static str) -> Result<Option<String>, ProfileError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_FIELD_LENGTH {
        return Err(ProfileError::FieldTooLong {
            field,
            max: MAX_FIELD_LENGTH,
        });
    }
    Ok(Some(trimmed.to_string()))
}

fn clean_list(values: Vec<String>, field: &'static str) -> Result<Vec<String>, ProfileError> {
    let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if let Some(value) = clean(Some(value), field)?
            && !cleaned.contains(&value)
        {
            cleaned.push(value);
        }
    }
    if cleaned.len() > MAX_PREFERENCE_ENTRIES {
        return Err(ProfileError::TooManyEntries {
            field,
            max: MAX_PREFERENCE_ENTRIES,
        });
    }
    Ok(cleaned)
}

// =============================================================================
// Profile
// =============================================================================

/// Loyalty tier. Assigned by staff, never by the shopper.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Regular,
    Gold,
    Platinum,
    Vip,
}

impl MemberStatus {
    /// Parse a stored value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "gold" => Some(Self::Gold),
            "platinum" => Some(Self::Platinum),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
            Self::Vip => "vip",
        }
    }
}

/// Shipping address and phone number. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingAddress {
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
}

impl ShippingAddress {
    /// Trim every field and turn blank ones into `None`.
    ///
    /// The address is replaced as a whole, so a field left out of an update
    /// is cleared.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::FieldTooLong` for an oversized field.
    pub fn normalized(self) -> Result<Self, ProfileError> {
        Ok(Self {
            address: clean(self.address, "address")?,
            city: clean(self.city, "city")?,
            postal_code: clean(self.postal_code, "postalCode")?,
            country: clean(self.country, "country")?,
            phone_number: clean(self.phone_number, "phoneNumber")?,
        })
    }

    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.address.is_none()
            && self.city.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
            && self.phone_number.is_none()
    }
}

/// Jewelry preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub preferred_metals: Vec<String>,
    pub preferred_gemstones: Vec<String>,
    pub ring_size: Option<String>,
    pub bracelet_size: Option<String>,
    pub necklace_length: Option<String>,
}

/// A preferences update.
///
/// Lists left out keep their current value. Sizes are always replaced, and
/// a missing or blank size clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_metals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_gemstones: Option<Vec<String>>,
    pub ring_size: Option<String>,
    pub bracelet_size: Option<String>,
    pub necklace_length: Option<String>,
}

impl PreferencesUpdate {
    /// Trim and de-duplicate the lists and trim the sizes; a blank size
    /// becomes `None`. Lists left out stay `None` so they keep their value.
    ///
    /// ```
    /// use diamant_rouge_core::PreferencesUpdate;
    ///
    /// let update = PreferencesUpdate {
    ///     preferred_metals: Some(vec![" or rose".to_string(), "or rose".to_string()]),
    ///     ring_size: Some(" ".to_string()),
    ///     ..PreferencesUpdate::default()
    /// };
    ///
    /// let update = update.normalized().unwrap();
    /// assert_eq!(update.preferred_metals, Some(vec!["or rose".to_string()]));
    /// assert_eq!(update.preferred_gemstones, None);
    /// assert_eq!(update.ring_size, None);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ProfileError` for an oversized field or list.
    pub fn normalized(self) -> Result<Self, ProfileError> {
        Ok(Self {
            preferred_metals: self
                .preferred_metals
                .map(|metals| clean_list(metals, "preferredMetals"))
                .transpose()?,
            preferred_gemstones: self
                .preferred_gemstones
                .map(|gems| clean_list(gems, "preferredGemstones"))
                .transpose()?,
            ring_size: clean(self.ring_size, "ringSize")?,
            bracelet_size: clean(self.bracelet_size, "braceletSize")?,
            necklace_length: clean(self.necklace_length, "necklaceLength")?,
        })
    }
}

/// Everything the account page shows about the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: UserId,
    pub email: Email,
    pub member_status: MemberStatus,
    pub address: ShippingAddress,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a stored status. Case does not matter.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "CONFIRMED" => Some(Self::Confirmed),
            "PROCESSING" => Some(Self::Processing),
            "SHIPPED" => Some(Self::Shipped),
            "DELIVERED" => Some(Self::Delivered),
            "COMPLETED" => Some(Self::Completed),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the order is still on its way to the shopper.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Confirmed | Self::Processing | Self::Shipped
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product line of a past order, priced as it was sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub sku: String,
    /// Localized name, falling back to French, then to the SKU.
    pub name: String,
    pub quantity: Quantity,
    pub price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity.get())
    }
}

/// A past order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Units across every item.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_fields_are_cleared() {
        let address = ShippingAddress {
            address: Some("  12 rue de Fès ".to_string()),
            city: Some(String::new()),
            postal_code: Some("20000".to_string()),
            country: None,
            phone_number: Some("   ".to_string()),
        }
        .normalized()
        .unwrap();

        assert_eq!(address.address.as_deref(), Some("12 rue de Fès"));
        assert_eq!(address.city, None);
        assert_eq!(address.phone_number, None);
        assert!(!address.is_empty());
        assert!(ShippingAddress::default().normalized().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_field_is_rejected() {
        let address = ShippingAddress {
            city: Some("x".repeat(MAX_FIELD_LENGTH + 1)),
            ..ShippingAddress::default()
        };
        assert_eq!(
            address.normalized(),
            Err(ProfileError::FieldTooLong {
                field: "city",
                max: MAX_FIELD_LENGTH
            })
        );
    }

    #[test]
    fn test_preference_lists_are_cleaned_only_when_given() {
        let update: PreferencesUpdate = serde_json::from_str(
            r#"{"preferredGemstones":["saphir"," saphir ","émeraude",""],"ringSize":"54"}"#,
        )
        .unwrap();
        let update = update.normalized().unwrap();

        assert_eq!(update.preferred_metals, None);
        assert_eq!(
            update.preferred_gemstones,
            Some(vec!["saphir".to_string(), "émeraude".to_string()])
        );
        assert_eq!(update.ring_size.as_deref(), Some("54"));
        assert_eq!(update.bracelet_size, None);
    }

    #[test]
    fn test_too_many_preferences() {
        let update = PreferencesUpdate {
            preferred_metals: Some((0..=MAX_PREFERENCE_ENTRIES).map(|i| format!("m{i}")).collect()),
            ..PreferencesUpdate::default()
        };
        assert!(matches!(
            update.normalized(),
            Err(ProfileError::TooManyEntries { .. })
        ));
    }

    #[test]
    fn test_order_status_parse_ignores_case() {
        assert_eq!(OrderStatus::parse("shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("Delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("CANCELED"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::parse("lost"), None);
        assert!(OrderStatus::Processing.is_open());
        assert!(!OrderStatus::Completed.is_open());
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            r#""PENDING""#
        );
    }

    #[test]
    fn test_member_status_round_trips_stored_value() {
        for status in [
            MemberStatus::Regular,
            MemberStatus::Gold,
            MemberStatus::Platinum,
            MemberStatus::Vip,
        ] {
            assert_eq!(MemberStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MemberStatus::parse("diamond"), None);
    }

    #[test]
    fn test_order_item_count_and_line_total() {
        let item = OrderItem {
            id: OrderItemId::new(1),
            product_id: ProductId::new(7),
            sku: "DR-7".to_string(),
            name: "Bague Rouge Passion".to_string(),
            quantity: Quantity::new(2).unwrap(),
            price: Decimal::new(1250, 0),
        };
        assert_eq!(item.line_total(), Decimal::new(2500, 0));

        let order = Order {
            id: OrderId::new(3),
            status: OrderStatus::Shipped,
            total_amount: Decimal::new(2500, 0),
            shipping_address: "12 rue de Fès".to_string(),
            city: "Casablanca".to_string(),
            postal_code: "20000".to_string(),
            country: "Maroc".to_string(),
            tracking_number: None,
            created_at: Utc::now(),
            items: vec![item],
        };
        assert_eq!(order.item_count(), 2);
    }
}
