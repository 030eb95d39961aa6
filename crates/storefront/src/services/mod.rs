//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email and password accounts (Argon2id)
//! - `catalog` - Cached catalog listing with the shared filter/sort rules

pub mod auth;
pub mod catalog;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
