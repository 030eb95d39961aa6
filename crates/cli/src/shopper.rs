//! Per-invocation shopper context.
//!
//! Plays the part of a browser tab: it restores the saved session, asks the
//! storefront who is signed in, and hands out cart and wishlist services
//! bound to the data directory.

use secrecy::SecretString;
use tracing::{info, warn};

use diamant_rouge_client::{
    AccountApi, ApiError, CartService, ClientConfig, FileStorage, HttpAccountClient,
    MergeReport, ServerWishlist, SessionState, WishlistService,
};

use crate::error::CliError;
use crate::session::SavedSession;

/// Cart service over the data directory and the storefront.
pub type Cart = CartService<FileStorage, HttpAccountClient>;

/// Shopper state for one command.
pub struct Shopper {
    pub config: ClientConfig,
    pub api: HttpAccountClient,
    pub session: SessionState,
    saved: SavedSession,
}

impl Shopper {
    /// Restore the saved session and resolve who is signed in.
    ///
    /// Without a saved cookie the shopper is anonymous and the storefront is
    /// not contacted. A cookie the storefront no longer honours is dropped.
    ///
    /// # Errors
    ///
    /// Returns error if the data directory cannot be read or the HTTP client
    /// cannot be built.
    pub async fn restore(config: ClientConfig) -> Result<Self, CliError> {
        let mut saved = SavedSession::new(FileStorage::new(&config.data_dir));
        let cookie = saved.load()?;
        let api = HttpAccountClient::new(config.api_base_url.clone(), cookie.as_ref())?;

        let session = match cookie {
            None => SessionState::Anonymous,
            Some(_) => match api.session().await {
                Ok(info) => {
                    let session = SessionState::from(&info);
                    if !session.is_authenticated() {
                        info!("Saved session expired");
                        saved.clear()?;
                    }
                    session
                }
                Err(e) => {
                    warn!(error = %e, "Could not reach the storefront, continuing as guest");
                    SessionState::Anonymous
                }
            },
        };

        Ok(Self {
            config,
            api,
            session,
            saved,
        })
    }

    /// Persist a fresh session cookie and bind the client to it.
    ///
    /// # Errors
    ///
    /// Returns error if the cookie cannot be saved.
    pub fn sign_in(&mut self, cookie: &SecretString) -> Result<(), CliError> {
        self.saved.save(cookie)?;
        self.api = HttpAccountClient::new(self.config.api_base_url.clone(), Some(cookie))?;
        self.session = SessionState::Authenticated;
        Ok(())
    }

    /// End the session on the storefront and forget the cookie.
    ///
    /// # Errors
    ///
    /// Returns error if the cookie file cannot be removed.
    pub async fn sign_out(&mut self) -> Result<(), CliError> {
        match self.api.logout().await {
            Ok(()) | Err(ApiError::Unauthorized) => {}
            Err(e) => warn!(error = %e, "Storefront logout failed, forgetting session anyway"),
        }
        self.saved.clear()?;
        self.api = HttpAccountClient::new(self.config.api_base_url.clone(), None)?;
        self.session = SessionState::Anonymous;
        Ok(())
    }

    /// Open the cart for the current session.
    ///
    /// A signed-in shopper's guest cart is merged into the account first;
    /// the report is returned when a merge ran.
    pub async fn cart(&self) -> (Cart, Option<MergeReport>) {
        let mut cart = CartService::new(FileStorage::new(&self.config.data_dir), self.api.clone());
        let report = cart.observe_session(self.session).await;
        (cart, report)
    }

    /// Open the wishlist for the current session.
    pub async fn wishlist(&self) -> WishlistService<HttpAccountClient> {
        let mut wishlist = WishlistService::new(ServerWishlist::new(self.api.clone()));
        wishlist.observe_session(self.session).await;
        wishlist
    }

    /// Require a signed-in session.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotSignedIn` when anonymous.
    pub const fn require_signed_in(&self) -> Result<(), CliError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CliError::NotSignedIn)
        }
    }
}
