//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (rate limited, strict)
//! POST   /auth/register             - Create account, start session (201)
//! POST   /auth/login                - Start session
//! POST   /auth/logout               - End session
//!
//! # Account API (session required)
//! GET    /api/session               - Who is signed in
//! GET    /api/cart                  - Cart lines with product snapshot
//! POST   /api/cart                  - Add a line or grow the existing one (201)
//! DELETE /api/cart                  - Empty the cart
//! PUT    /api/cart/{id}             - Set a line quantity
//! DELETE /api/cart/{id}             - Remove a line
//! GET    /api/wishlist              - Wishlist entries
//! POST   /api/wishlist              - Add a product (201, idempotent)
//! DELETE /api/wishlist/{productId}  - Remove a product
//! GET    /api/profile               - Address, preferences, member status
//! PUT    /api/profile/address       - Replace the shipping address
//! PUT    /api/profile/preferences   - Update jewelry preferences
//! GET    /api/orders                - Order history, newest first
//!
//! # Catalog API
//! GET    /api/products              - Filtered, sorted listing
//! GET    /api/products/search       - Text search, featured first
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod profile;
pub mod session;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Optional `?locale=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

impl LocaleQuery {
    /// The requested locale, or the configured default.
    #[must_use]
    pub fn resolve<'a>(&'a self, state: &'a AppState) -> &'a str {
        self.locale
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(&state.config().default_locale)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(session::show))
        .route("/cart", get(cart::list).post(cart::add).delete(cart::clear))
        .route("/cart/{id}", delete(cart::remove).put(cart::update))
        .route("/wishlist", get(wishlist::list).post(wishlist::add))
        .route("/wishlist/{product_id}", delete(wishlist::remove))
        .route("/profile", get(profile::show))
        .route("/profile/address", put(profile::update_address))
        .route("/profile/preferences", put(profile::update_preferences))
        .route("/orders", get(orders::list))
        .route("/products", get(products::list))
        .route("/products/search", get(products::search))
        .layer(api_rate_limiter())
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/api", api_routes())
}
