//! Errors surfaced by cart and wishlist operations.

use thiserror::Error;

use diamant_rouge_core::{LineKey, QuantityError};

use crate::api::ApiError;

/// Outcome of a failed cart or wishlist operation.
///
/// Local state is never left half-applied: on any of these errors the view
/// either is unchanged or has been re-synchronized with the account.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The account endpoint failed or was unreachable.
    #[error("account request failed: {0}")]
    Api(#[from] ApiError),

    /// The quantity was below one.
    #[error(transparent)]
    InvalidQuantity(#[from] QuantityError),

    /// No line with this key exists in the account cart.
    #[error("no cart line for {0}")]
    LineNotFound(LineKey),
}

impl SyncError {
    /// Whether the error was caused by a missing or expired session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(ApiError::Unauthorized))
    }
}
