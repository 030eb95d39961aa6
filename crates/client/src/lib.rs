//! Diamant Rouge client - shopper-side cart and wishlist state.
//!
//! # Architecture
//!
//! ```text
//! view ──► CartService ──┬──► GuestCart   (anonymous: local key-value storage)
//!                        └──► ServerCart  (signed in: account endpoints)
//!                 ▲
//!                 └── Reconciler: merges the guest cart into the account
//!                     once per sign-in, then erases the guest copy
//!
//! view ──► WishlistService ──► ServerWishlist (optimistic, signed in only)
//! ```
//!
//! Services are plain values created by the caller and passed to whatever
//! renders them; there is no global state. All account traffic goes through
//! the [`AccountApi`] trait, implemented over HTTP by [`HttpAccountClient`].
//!
//! # Failure model
//!
//! - Storage failures never reach the caller: the guest cart logs and keeps
//!   working in memory.
//! - Account failures are logged and returned as [`SyncError`]; nothing is
//!   retried.
//! - Quantities below one are rejected without touching state.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod guest;
pub mod reconcile;
pub mod services;
pub mod session;
pub mod storage;
pub mod wishlist;

pub use api::{AccountApi, ApiError, HttpAccountClient, SessionInfo};
pub use cart::ServerCart;
pub use config::{ClientConfig, ConfigError};
pub use error::SyncError;
pub use guest::{GUEST_CART_KEY, GuestCart};
pub use reconcile::{MergeFailure, MergeReport, MergeState, Reconciler};
pub use services::{CartService, CheckoutStep, WishlistAction, WishlistService};
pub use session::{IntentAction, LoginIntent, SessionState};
pub use storage::{FileStorage, GuestStorage, MemoryStorage, StorageError};
pub use wishlist::ServerWishlist;
