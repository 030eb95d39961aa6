//! Session status.

use axum::Json;
use serde::Serialize;

use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;

/// Who the session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionResponse {
    /// A session with nobody signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            authenticated: false,
            email: None,
        }
    }

    /// A session for `user`.
    #[must_use]
    pub fn signed_in(user: &CurrentUser) -> Self {
        Self {
            authenticated: true,
            email: Some(user.email.as_str().to_string()),
        }
    }
}

/// Report whether a shopper is signed in. Never fails.
pub async fn show(OptionalAuth(user): OptionalAuth) -> Json<SessionResponse> {
    Json(
        user.as_ref()
            .map_or_else(SessionResponse::anonymous, SessionResponse::signed_in),
    )
}
