//! Guest-to-account cart merge.
//!
//! When a shopper signs in, every guest line is sent to the account as a
//! create call (the account adds to any existing line with the same key),
//! the guest copy is erased, and the account cart is fetched again. The
//! merge runs once per sign-in:
//!
//! ```text
//! NotMerged ──authenticated──► Merging ──done──► Merged
//!     ▲                                            │
//!     └────────────────── anonymous ───────────────┘
//! ```
//!
//! Lines the account rejects are reported, not retried, and are dropped
//! with the rest of the guest copy so they can never be merged twice.
//!
//! Each guest line leaves the guest cart as soon as the account has answered
//! for it. If the merge future is dropped part way, the state falls back to
//! `NotMerged` and the next signed-in observation merges only what is left.

use tracing::{info, instrument, warn};

use diamant_rouge_core::{LineKey, Quantity};

use crate::api::AccountApi;
use crate::cart::ServerCart;
use crate::guest::GuestCart;
use crate::session::SessionState;
use crate::storage::GuestStorage;

/// Progress of the merge for the current sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeState {
    #[default]
    NotMerged,
    Merging,
    Merged,
}

/// A guest line the account did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFailure {
    pub key: LineKey,
    pub quantity: Quantity,
    pub reason: String,
}

/// Outcome of one merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergeReport {
    pub merged: Vec<LineKey>,
    pub failed: Vec<MergeFailure>,
}

impl MergeReport {
    /// Whether every guest line reached the account.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds `Merging` while a merge runs and falls back to `NotMerged` if the
/// merge is abandoned before [`MergeGuard::finish`].
struct MergeGuard<'a> {
    state: &'a mut MergeState,
}

impl<'a> MergeGuard<'a> {
    fn enter(state: &'a mut MergeState) -> Self {
        *state = MergeState::Merging;
        Self { state }
    }

    fn finish(self) {
        *self.state = MergeState::Merged;
    }
}

impl Drop for MergeGuard<'_> {
    fn drop(&mut self) {
        if *self.state == MergeState::Merging {
            *self.state = MergeState::NotMerged;
        }
    }
}

/// Runs the merge at most once per sign-in.
#[derive(Debug, Default)]
pub struct Reconciler {
    state: MergeState,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn state(&self) -> MergeState {
        self.state
    }

    /// React to a session observation.
    ///
    /// Returns the report when this observation triggered a merge.
    pub async fn observe<S, A>(
        &mut self,
        session: SessionState,
        guest: &mut GuestCart<S>,
        server: &mut ServerCart<A>,
    ) -> Option<MergeReport>
    where
        S: GuestStorage + Send,
        A: AccountApi,
    {
        match session {
            SessionState::Authenticated => self.merge(guest, server).await,
            SessionState::Anonymous => {
                self.reset();
                None
            }
            SessionState::Loading => None,
        }
    }

    /// Merge the guest cart into the account cart.
    ///
    /// Does nothing unless the state is `NotMerged`.
    #[instrument(skip_all)]
    pub async fn merge<S, A>(
        &mut self,
        guest: &mut GuestCart<S>,
        server: &mut ServerCart<A>,
    ) -> Option<MergeReport>
    where
        S: GuestStorage + Send,
        A: AccountApi,
    {
        if self.state != MergeState::NotMerged {
            return None;
        }
        let guard = MergeGuard::enter(&mut self.state);

        let mut report = MergeReport::default();
        let lines = guest.lines().to_vec();

        for line in &lines {
            match server.api().create_cart_line(line.to_new_line()).await {
                Ok(_) => report.merged.push(line.key()),
                Err(error) => {
                    warn!(key = %line.key(), %error, "Guest line not merged");
                    report.failed.push(MergeFailure {
                        key: line.key(),
                        quantity: line.quantity,
                        reason: error.to_string(),
                    });
                }
            }
            guest.remove(line.key());
        }

        guest.erase();
        // Already logged; the previous view stays in place
        let _ = server.refresh().await;

        if !lines.is_empty() {
            info!(
                merged = report.merged.len(),
                failed = report.failed.len(),
                "Guest cart merged into account"
            );
        }

        guard.finish();
        Some(report)
    }

    /// Return to `NotMerged` so the next sign-in merges again.
    pub fn reset(&mut self) {
        self.state = MergeState::NotMerged;
    }
}
