//! Cart commands. Guests use the cart in the data directory; signed-in
//! shoppers use their account cart.

use tracing::{instrument, warn};

use diamant_rouge_client::SyncError;
use diamant_rouge_core::{
    CartLine, CatalogFilter, CatalogSort, LineKey, ProductId, Quantity, VariationId,
};

use crate::error::CliError;
use crate::output::{emit, render_cart, render_checkout, render_merge};
use crate::shopper::{Cart, Shopper};

/// Open the active cart, reporting a merge if one ran.
async fn open(shopper: &Shopper) -> Cart {
    let (cart, report) = shopper.cart().await;
    if let Some(report) = report {
        emit(&render_merge(&report));
    }
    cart
}

fn show_cart(cart: &Cart) {
    emit(&render_cart(cart.lines(), cart.session()));
}

/// Build a guest line with a display snapshot taken from the catalog.
///
/// The account cart carries its own snapshot, and a guest line without one
/// still works, so a catalog failure only costs the display name.
async fn guest_line(shopper: &Shopper, key: LineKey, quantity: Quantity) -> CartLine {
    let line = CartLine::new(key.product_id, key.variation_id, quantity);
    if shopper.session.is_authenticated() {
        return line;
    }

    match shopper
        .api
        .catalog(&CatalogFilter::default(), CatalogSort::Default)
        .await
    {
        Ok(page) => match page.products.iter().find(|p| p.id == key.product_id) {
            Some(product) => {
                let mut snapshot = product.snapshot(&shopper.config.locale);
                snapshot.price = Some(product.unit_price(key.variation_id));
                line.with_product(snapshot)
            }
            None => {
                warn!(product_id = %key.product_id, "Product not in catalog");
                line
            }
        },
        Err(e) => {
            warn!(error = %e, "Catalog unavailable, adding without product details");
            line
        }
    }
}

/// Show the cart.
pub async fn show(shopper: &Shopper) {
    let cart = open(shopper).await;
    show_cart(&cart);
}

/// Add units of a product.
///
/// # Errors
///
/// Returns `InvalidQuantity` for quantities below one, or the account error.
#[instrument(skip(shopper))]
pub async fn add(
    shopper: &Shopper,
    product: i32,
    variation: Option<i32>,
    quantity: i64,
) -> Result<(), CliError> {
    let quantity = Quantity::try_from(quantity).map_err(SyncError::from)?;
    let key = LineKey::new(ProductId::new(product), variation.map(VariationId::new));

    let line = guest_line(shopper, key, quantity).await;
    let mut cart = open(shopper).await;
    cart.add(line).await?;
    show_cart(&cart);
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns the account error if the removal fails.
#[instrument(skip(shopper))]
pub async fn remove(shopper: &Shopper, product: i32, variation: Option<i32>) -> Result<(), CliError> {
    let key = LineKey::new(ProductId::new(product), variation.map(VariationId::new));

    let mut cart = open(shopper).await;
    cart.remove(key).await?;
    show_cart(&cart);
    Ok(())
}

/// Overwrite a line quantity.
///
/// # Errors
///
/// Returns `InvalidQuantity` for quantities below one, `LineNotFound` when
/// the cart has no such line, or the account error.
#[instrument(skip(shopper))]
pub async fn set(
    shopper: &Shopper,
    product: i32,
    variation: Option<i32>,
    quantity: i64,
) -> Result<(), CliError> {
    let key = LineKey::new(ProductId::new(product), variation.map(VariationId::new));

    let mut cart = open(shopper).await;
    cart.set_quantity(key, quantity).await?;
    show_cart(&cart);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns the account error if clearing fails.
pub async fn clear(shopper: &Shopper) -> Result<(), CliError> {
    let mut cart = open(shopper).await;
    cart.clear().await?;
    show_cart(&cart);
    Ok(())
}

/// Hand the cart over to checkout, or say what is missing first.
pub async fn checkout(shopper: &Shopper) {
    let cart = open(shopper).await;
    let step = cart.checkout("/cart");
    emit(&render_checkout(&step, &shopper.config.api_base_url));
}
