//! Diamant Rouge Core - Shared types and catalog logic.
//!
//! This crate provides the domain vocabulary used by every Diamant Rouge component:
//! - `client` - Shopper-side cart/wishlist state (guest storage, account sync)
//! - `storefront` - Public HTTP API (account endpoints, catalog, search)
//! - `cli` - Migrations and a shopper command line
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The same identity rules for cart lines and the same
//! catalog filter/sort rules are therefore applied on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, quantities, prices and emails
//! - [`line`] - Cart line and wishlist entry identity helpers
//! - [`catalog`] - Product records and the catalog filter/sort functions
//! - [`account`] - Shopper profile, preferences and order history

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod catalog;
pub mod line;
pub mod types;

pub use account::{
    MemberStatus, Order, OrderItem, OrderStatus, Preferences, PreferencesUpdate, Profile,
    ProfileError, ShippingAddress,
};
pub use catalog::{
    CatalogFilter, CatalogPage, CatalogSort, PriceBounds, Product, ProductTranslation,
    ProductVariation, SearchHit,
};
pub use line::{CartLine, LineKey, NewCartLine, ProductSnapshot, WishlistEntry};
pub use types::*;
