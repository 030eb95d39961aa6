//! Terminal rendering of carts, wishlists, catalog listings, profiles and
//! orders.
//!
//! Rendering is split from printing so the formats can be tested.

use rust_decimal::Decimal;
use url::Url;

use diamant_rouge_client::{CheckoutStep, IntentAction, LoginIntent, MergeReport, SessionState};
use diamant_rouge_core::line::total_units;
use diamant_rouge_core::{
    CartLine, CatalogPage, Order, Price, Product, Profile, SearchHit, WishlistEntry,
};

/// Print rendered lines to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn describe_line(line: &CartLine) -> String {
    let name = line
        .product
        .as_ref()
        .map_or_else(|| format!("product {}", line.product_id), |p| p.name.clone());
    let variation = line
        .variation_id
        .map(|v| format!(" (variation {v})"))
        .unwrap_or_default();
    let price = line
        .product
        .as_ref()
        .and_then(|p| p.price)
        .map(|unit| format!("  {}", Price::mad(unit).times(line.quantity.get())))
        .unwrap_or_default();

    format!("{:>3} x {name}{variation}{price}", line.quantity.get())
}

/// Cart contents with a unit total and, when every line is priced, a subtotal.
pub fn render_cart(lines: &[CartLine], session: SessionState) -> Vec<String> {
    let source = if session.is_authenticated() {
        "account cart"
    } else {
        "guest cart"
    };

    if lines.is_empty() {
        return vec![format!("Your {source} is empty.")];
    }

    let mut out: Vec<String> = lines.iter().map(describe_line).collect();
    out.push(format!("{} item(s) in your {source}", total_units(lines)));

    let subtotal: Option<Decimal> = lines
        .iter()
        .map(|line| {
            line.product
                .as_ref()
                .and_then(|p| p.price)
                .map(|unit| unit * Decimal::from(line.quantity.get()))
        })
        .sum();
    if let Some(subtotal) = subtotal {
        out.push(format!("Subtotal: {}", Price::mad(subtotal)));
    }

    out
}

/// Wishlist contents, newest first as served.
pub fn render_wishlist(entries: &[WishlistEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["Your wishlist is empty.".to_string()];
    }

    entries
        .iter()
        .map(|entry| match &entry.product {
            Some(product) => format!("♥ {} [{}]", product.name, entry.product_id),
            None => format!("♥ product {}", entry.product_id),
        })
        .collect()
}

/// Outcome of merging the guest cart on sign-in.
pub fn render_merge(report: &MergeReport) -> Vec<String> {
    let mut out = Vec::new();
    if !report.merged.is_empty() {
        out.push(format!(
            "Moved {} guest cart line(s) to your account.",
            report.merged.len()
        ));
    }
    for failure in &report.failed {
        out.push(format!(
            "Could not move {} x product {}: {}",
            failure.quantity, failure.key.product_id, failure.reason
        ));
    }
    out
}

/// Sign-in prompt for an action that needs an account.
pub fn render_login_required(intent: &LoginIntent, base: &Url) -> Vec<String> {
    let reason = match intent.action {
        IntentAction::Favorite => "to keep favourites",
        IntentAction::Checkout => "to check out; your cart comes with you",
    };
    vec![
        format!("Sign in {reason} (dr-cli login --email ...)."),
        format!("In a browser: {}", intent.login_url(base)),
    ]
}

/// Next step after asking to check out.
pub fn render_checkout(step: &CheckoutStep, base: &Url) -> Vec<String> {
    match step {
        CheckoutStep::EmptyCart => vec!["Your cart is empty, nothing to check out.".to_string()],
        CheckoutStep::LoginRequired(intent) => render_login_required(intent, base),
        CheckoutStep::Ready => {
            let url = base.join("checkout").unwrap_or_else(|_| base.clone());
            vec![format!("Continue to checkout: {url}")]
        }
    }
}

fn describe_product(product: &Product, locale: &str) -> String {
    let badge = if product.featured { " ★" } else { "" };
    let category = product.category.as_deref().unwrap_or("-");
    format!(
        "[{}] {}{badge}  {}  ({category})",
        product.id,
        product.name(locale),
        Price::mad(product.base_price),
    )
}

/// One catalog page.
pub fn render_catalog(page: &CatalogPage, locale: &str) -> Vec<String> {
    let mut out: Vec<String> = page
        .products
        .iter()
        .map(|p| describe_product(p, locale))
        .collect();

    out.push(format!("{} product(s), sorted by {}", page.total, page.sort));
    if let Some(bounds) = page.price_bounds {
        out.push(format!(
            "Prices from {} to {}",
            Price::mad(bounds.min),
            Price::mad(bounds.max)
        ));
    }
    out
}

/// Search results.
pub fn render_search(hits: &[SearchHit]) -> Vec<String> {
    if hits.is_empty() {
        return vec!["No products found.".to_string()];
    }

    hits.iter()
        .map(|hit| {
            let badge = if hit.featured { " ★" } else { "" };
            format!(
                "[{}] {}{badge}  {}",
                hit.id,
                hit.name,
                Price::mad(hit.base_price)
            )
        })
        .collect()
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn list_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

/// Account page: email, tier, shipping address and preferences.
pub fn render_profile(profile: &Profile) -> Vec<String> {
    let address = &profile.address;
    let preferences = &profile.preferences;

    let mut out = vec![format!(
        "{} ({} member since {})",
        profile.email,
        profile.member_status.as_str(),
        profile.created_at.format("%Y-%m-%d")
    )];

    if address.is_empty() {
        out.push("Shipping address: none".to_string());
    } else {
        let place = [
            address.postal_code.as_deref(),
            address.city.as_deref(),
            address.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        out.push(format!("Shipping address: {}", or_dash(address.address.as_deref())));
        if !place.is_empty() {
            out.push(format!("                  {place}"));
        }
        out.push(format!("Phone: {}", or_dash(address.phone_number.as_deref())));
    }

    out.push(format!("Metals: {}", list_or_dash(&preferences.preferred_metals)));
    out.push(format!("Gemstones: {}", list_or_dash(&preferences.preferred_gemstones)));
    out.push(format!(
        "Ring size: {}  Bracelet: {}  Necklace: {}",
        or_dash(preferences.ring_size.as_deref()),
        or_dash(preferences.bracelet_size.as_deref()),
        or_dash(preferences.necklace_length.as_deref()),
    ));
    out
}

/// Order history, newest first as served.
pub fn render_orders(orders: &[Order]) -> Vec<String> {
    if orders.is_empty() {
        return vec!["No orders yet.".to_string()];
    }

    let mut out = Vec::new();
    for order in orders {
        let tracking = order
            .tracking_number
            .as_deref()
            .map(|t| format!("  tracking {t}"))
            .unwrap_or_default();
        out.push(format!(
            "Order #{} {}  {}  {}{tracking}",
            order.id,
            order.created_at.format("%Y-%m-%d"),
            order.status,
            Price::mad(order.total_amount),
        ));
        for item in &order.items {
            out.push(format!(
                "  {:>3} x {}  {}",
                item.quantity.get(),
                item.name,
                Price::mad(item.line_total())
            ));
        }
    }
    out.push(format!("{} order(s)", orders.len()));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use diamant_rouge_client::MergeFailure;
    use diamant_rouge_core::{
        LineKey, MemberStatus, OrderId, OrderItem, OrderItemId, OrderStatus, Preferences,
        ProductId, ProductSnapshot, Quantity, ShippingAddress,
    };

    use super::*;

    fn line(product: i32, quantity: u32, price: Option<i64>) -> CartLine {
        let line = CartLine::new(ProductId::new(product), None, Quantity::new(quantity).unwrap());
        match price {
            Some(price) => line.with_product(ProductSnapshot {
                sku: format!("DR-{product}"),
                name: format!("Bague {product}"),
                price: Some(Decimal::new(price, 0)),
                image: None,
            }),
            None => line,
        }
    }

    #[test]
    fn test_cart_with_prices_has_subtotal() {
        let out = render_cart(
            &[line(7, 3, Some(1200)), line(9, 1, Some(450))],
            SessionState::Authenticated,
        );

        assert_eq!(out[0], "  3 x Bague 7  3600.00 MAD");
        assert_eq!(out[2], "4 item(s) in your account cart");
        assert_eq!(out[3], "Subtotal: 4050.00 MAD");
    }

    #[test]
    fn test_guest_cart_without_prices_has_no_subtotal() {
        let out = render_cart(&[line(7, 2, None)], SessionState::Anonymous);

        assert_eq!(out[0], "  2 x product 7");
        assert_eq!(out.last().unwrap(), "2 item(s) in your guest cart");
    }

    #[test]
    fn test_empty_cart() {
        assert_eq!(
            render_cart(&[], SessionState::Anonymous),
            vec!["Your guest cart is empty."]
        );
    }

    fn profile() -> Profile {
        Profile {
            id: diamant_rouge_core::UserId::new(1),
            email: diamant_rouge_core::Email::parse("amina@example.com").unwrap(),
            member_status: MemberStatus::Gold,
            address: ShippingAddress::default(),
            preferences: Preferences {
                preferred_metals: vec!["or rose".to_string(), "platine".to_string()],
                ring_size: Some("52".to_string()),
                ..Preferences::default()
            },
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_profile_without_address() {
        let out = render_profile(&profile());

        assert_eq!(out[0], "amina@example.com (gold member since 2025-03-01)");
        assert_eq!(out[1], "Shipping address: none");
        assert_eq!(out[2], "Metals: or rose, platine");
        assert_eq!(out[3], "Gemstones: -");
        assert_eq!(out[4], "Ring size: 52  Bracelet: -  Necklace: -");
    }

    #[test]
    fn test_profile_with_address() {
        let mut profile = profile();
        profile.address = ShippingAddress {
            address: Some("12 rue de Fès".to_string()),
            city: Some("Casablanca".to_string()),
            postal_code: Some("20000".to_string()),
            country: None,
            phone_number: None,
        };

        let out = render_profile(&profile);

        assert_eq!(out[1], "Shipping address: 12 rue de Fès");
        assert_eq!(out[2], "                  20000 Casablanca");
        assert_eq!(out[3], "Phone: -");
    }

    #[test]
    fn test_orders_list_items_under_each_order() {
        let order = Order {
            id: OrderId::new(12),
            status: OrderStatus::Shipped,
            total_amount: Decimal::new(2500, 0),
            shipping_address: "12 rue de Fès".to_string(),
            city: "Casablanca".to_string(),
            postal_code: "20000".to_string(),
            country: "Maroc".to_string(),
            tracking_number: Some("MA123".to_string()),
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, 9, 30, 0).unwrap(),
            items: vec![OrderItem {
                id: OrderItemId::new(1),
                product_id: ProductId::new(7),
                sku: "DR-7".to_string(),
                name: "Bague Rouge Passion".to_string(),
                quantity: Quantity::new(2).unwrap(),
                price: Decimal::new(1250, 0),
            }],
        };

        let out = render_orders(&[order]);

        assert_eq!(
            out[0],
            "Order #12 2025-04-02  SHIPPED  2500.00 MAD  tracking MA123"
        );
        assert_eq!(out[1], "    2 x Bague Rouge Passion  2500.00 MAD");
        assert_eq!(out[2], "1 order(s)");
        assert_eq!(render_orders(&[]), vec!["No orders yet."]);
    }

    #[test]
    fn test_checkout_steps() {
        let base = Url::parse("https://diamantrouge.ma/").unwrap();

        let out = render_checkout(&CheckoutStep::Ready, &base);
        assert_eq!(out, vec!["Continue to checkout: https://diamantrouge.ma/checkout"]);

        let out = render_checkout(
            &CheckoutStep::LoginRequired(LoginIntent::checkout("/cart")),
            &base,
        );
        assert!(out[0].starts_with("Sign in to check out"));
        assert!(out[1].ends_with("/auth?action=checkout&returnUrl=%2Fcart"));
    }

    #[test]
    fn test_merge_report() {
        let report = MergeReport {
            merged: vec![LineKey::new(ProductId::new(7), None)],
            failed: vec![MergeFailure {
                key: LineKey::new(ProductId::new(9), None),
                quantity: Quantity::new(2).unwrap(),
                reason: "storefront returned 503".to_string(),
            }],
        };

        let out = render_merge(&report);

        assert_eq!(out.len(), 2);
        assert!(out[1].contains("product 9"));
    }
}
