//! Command implementations.

pub mod account;
pub mod cart;
pub mod migrate;
pub mod products;
pub mod profile;
pub mod wishlist;
