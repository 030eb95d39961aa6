//! Positive line quantities.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a quantity is below one or above [`Quantity::MAX`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be between 1 and 2147483647 (got {0})")]
pub struct QuantityError(pub i64);

/// A cart line quantity. Always in `1..=Quantity::MAX`.
///
/// The upper bound is the largest value the `INTEGER` quantity column holds,
/// so every quantity converts to `i32` without loss.
///
/// ```
/// use diamant_rouge_core::Quantity;
///
/// assert!(Quantity::new(0).is_none());
/// assert_eq!(Quantity::new(3).map(Quantity::get), Some(3));
/// assert!(Quantity::try_from(-2_i64).is_err());
/// assert!(Quantity::try_from(i64::from(i32::MAX) + 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Largest quantity, `i32::MAX`.
    #[allow(clippy::cast_sign_loss)]
    pub const MAX: Self = Self(i32::MAX as u32);

    /// Create a quantity, returning `None` for zero or values above [`Self::MAX`].
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 || value > Self::MAX.0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// The raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities, saturating at [`Self::MAX`].
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        let sum = self.0.saturating_add(other.0);
        if sum > Self::MAX.0 { Self::MAX } else { Self(sum) }
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(QuantityError(value))
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<Quantity> for i32 {
    #[allow(clippy::cast_possible_wrap)]
    fn from(q: Quantity) -> Self {
        // Bounded by `Quantity::MAX`
        q.0 as Self
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::try_from(raw).map_err(serde::de::Error::custom)
    }
}
