//! Session observation and sign-in intents.

use url::Url;

use diamant_rouge_core::ProductId;

use crate::api::SessionInfo;

/// What the view currently knows about the shopper's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not yet determined. Treated as anonymous for cart purposes.
    #[default]
    Loading,
    Anonymous,
    Authenticated,
}

impl SessionState {
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

impl From<&SessionInfo> for SessionState {
    fn from(info: &SessionInfo) -> Self {
        if info.authenticated {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

/// Action to resume after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentAction {
    Favorite,
    Checkout,
}

impl IntentAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorite => "favorite",
            Self::Checkout => "checkout",
        }
    }
}

/// A request to send the shopper to the sign-in page.
///
/// Carries enough to resume the interrupted action afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginIntent {
    pub action: IntentAction,
    pub product_id: Option<ProductId>,
    pub return_url: String,
}

impl LoginIntent {
    /// Intent to add `product_id` to the wishlist once signed in.
    #[must_use]
    pub fn favorite(product_id: ProductId, return_url: impl Into<String>) -> Self {
        Self {
            action: IntentAction::Favorite,
            product_id: Some(product_id),
            return_url: return_url.into(),
        }
    }

    /// Intent to continue to checkout once signed in.
    #[must_use]
    pub fn checkout(return_url: impl Into<String>) -> Self {
        Self {
            action: IntentAction::Checkout,
            product_id: None,
            return_url: return_url.into(),
        }
    }

    /// Sign-in page URL under `base`, e.g.
    /// `/auth?action=favorite&productId=7&returnUrl=%2Fcollections`.
    ///
    /// The page is resolved against the base URL's directory, so a storefront
    /// mounted at `https://host/shop/` signs in at `/shop/auth`.
    #[must_use]
    pub fn login_url(&self, base: &Url) -> Url {
        let mut url = base.join("auth").unwrap_or_else(|_| base.clone());
        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("action", self.action.as_str());
            if let Some(product_id) = self.product_id {
                query.append_pair("productId", &product_id.to_string());
            }
            query.append_pair("returnUrl", &self.return_url);
        }
        url
    }
}
