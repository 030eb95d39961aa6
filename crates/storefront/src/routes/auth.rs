//! Authentication route handlers.
//!
//! Email and password sign-in. A successful register or login stores the
//! shopper in the session; the session cookie is the credential for every
//! `/api` account call.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

use super::session::SessionResponse;

/// Register and login request body.
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Start a session for `user`.
async fn sign_in(session: &Session, user: &CurrentUser) -> Result<SessionResponse, AppError> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(SessionResponse::signed_in(user))
}

/// Create an account and sign it in.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password = SecretString::from(body.password);
    let user = AuthService::new(state.pool())
        .register(&body.email, &password)
        .await?;

    tracing::info!(user_id = %user.id, "Account created");
    let response = sign_in(&session, &CurrentUser::from(&user)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let password = SecretString::from(body.password);
    let user = AuthService::new(state.pool())
        .login(&body.email, &password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Login failed"))?;

    Ok(Json(sign_in(&session, &CurrentUser::from(&user)).await?))
}

/// End the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<SessionResponse>, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(Json(SessionResponse::anonymous()))
}
