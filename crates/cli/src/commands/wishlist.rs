//! Wishlist commands. The wishlist belongs to the account; guests are asked
//! to sign in.

use tracing::instrument;

use diamant_rouge_client::WishlistAction;
use diamant_rouge_core::ProductId;

use crate::error::CliError;
use crate::output::{emit, render_login_required, render_wishlist};
use crate::shopper::Shopper;

/// Where a browser would come back to after signing in.
const RETURN_URL: &str = "/collections";

/// Show the wishlist.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests.
pub async fn show(shopper: &Shopper) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let wishlist = shopper.wishlist().await;
    emit(&render_wishlist(wishlist.entries()));
    Ok(())
}

/// Add a product, or print the sign-in link for guests.
///
/// # Errors
///
/// Returns the account error if the add fails; the wishlist is left as the
/// account has it.
#[instrument(skip(shopper))]
pub async fn add(shopper: &Shopper, product: i32) -> Result<(), CliError> {
    let mut wishlist = shopper.wishlist().await;

    match wishlist.add(ProductId::new(product), RETURN_URL).await? {
        WishlistAction::LoginRequired(intent) => {
            emit(&render_login_required(&intent, &shopper.config.api_base_url));
        }
        WishlistAction::Added | WishlistAction::Removed => {
            emit(&render_wishlist(wishlist.entries()));
        }
    }
    Ok(())
}

/// Remove a product.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests, or the account error.
#[instrument(skip(shopper))]
pub async fn remove(shopper: &Shopper, product: i32) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let mut wishlist = shopper.wishlist().await;
    wishlist.remove(ProductId::new(product)).await?;
    emit(&render_wishlist(wishlist.entries()));
    Ok(())
}

/// Add the product if absent, remove it if present.
///
/// # Errors
///
/// Returns the account error if the change fails.
#[instrument(skip(shopper))]
pub async fn toggle(shopper: &Shopper, product: i32) -> Result<(), CliError> {
    let mut wishlist = shopper.wishlist().await;

    match wishlist.toggle(ProductId::new(product), RETURN_URL).await? {
        WishlistAction::LoginRequired(intent) => {
            emit(&render_login_required(&intent, &shopper.config.api_base_url));
        }
        WishlistAction::Added | WishlistAction::Removed => {
            emit(&render_wishlist(wishlist.entries()));
        }
    }
    Ok(())
}
