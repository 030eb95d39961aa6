//! Profile and order history commands. Both need a signed-in shopper.

use tracing::instrument;

use diamant_rouge_core::{PreferencesUpdate, ShippingAddress};

use crate::error::CliError;
use crate::output::{emit, render_orders, render_profile};
use crate::shopper::Shopper;

/// Show address, preferences and member status.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests, or the request error.
pub async fn show(shopper: &Shopper) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let profile = shopper.api.profile().await?;
    emit(&render_profile(&profile));
    Ok(())
}

/// Replace the shipping address. Fields not given are cleared.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests, or the request error.
#[instrument(skip(shopper, address))]
pub async fn set_address(shopper: &Shopper, address: ShippingAddress) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let profile = shopper.api.update_address(&address).await?;
    emit(&render_profile(&profile));
    Ok(())
}

/// Update preferences. Lists not given keep their value.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests, or the request error.
#[instrument(skip(shopper, update))]
pub async fn set_preferences(shopper: &Shopper, update: PreferencesUpdate) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let profile = shopper.api.update_preferences(&update).await?;
    emit(&render_profile(&profile));
    Ok(())
}

/// List past orders, newest first.
///
/// # Errors
///
/// Returns `NotSignedIn` for guests, or the request error.
pub async fn orders(shopper: &Shopper) -> Result<(), CliError> {
    shopper.require_signed_in()?;
    let orders = shopper.api.orders(&shopper.config.locale).await?;
    emit(&render_orders(&orders));
    Ok(())
}
