//! Sign-in, registration and sign-out.
//!
//! Signing in merges the guest cart kept in the data directory into the
//! account cart, exactly once.

use secrecy::SecretString;
use tracing::instrument;

use diamant_rouge_client::HttpAccountClient;

use crate::error::CliError;
use crate::output::{emit, render_merge};
use crate::shopper::Shopper;

/// Pick the password from the flag, then from the configuration.
fn password(flag: Option<String>, shopper: &Shopper) -> Result<SecretString, CliError> {
    flag.map(SecretString::from)
        .or_else(|| shopper.config.password.clone())
        .ok_or(CliError::MissingPassword)
}

/// Adopt the new session and merge the guest cart into it.
async fn adopt(shopper: &mut Shopper, cookie: &SecretString, email: &str) -> Result<(), CliError> {
    shopper.sign_in(cookie)?;
    emit(&[format!("Signed in as {email}.")]);

    let (_cart, report) = shopper.cart().await;
    if let Some(report) = report {
        emit(&render_merge(&report));
    }
    Ok(())
}

/// Sign in to an existing account.
///
/// # Errors
///
/// Returns error on bad credentials or if the storefront is unreachable.
#[instrument(skip(shopper, password_flag))]
pub async fn login(
    shopper: &mut Shopper,
    email: &str,
    password_flag: Option<String>,
) -> Result<(), CliError> {
    let password = password(password_flag, shopper)?;
    let cookie = HttpAccountClient::login(&shopper.config.api_base_url, email, &password).await?;
    adopt(shopper, &cookie, email).await
}

/// Create an account and sign in to it.
///
/// # Errors
///
/// Returns error if the account exists, the password is rejected, or the
/// storefront is unreachable.
#[instrument(skip(shopper, password_flag))]
pub async fn register(
    shopper: &mut Shopper,
    email: &str,
    password_flag: Option<String>,
) -> Result<(), CliError> {
    let password = password(password_flag, shopper)?;
    let cookie =
        HttpAccountClient::register(&shopper.config.api_base_url, email, &password).await?;
    adopt(shopper, &cookie, email).await
}

/// Sign out. The guest cart starts again from the data directory.
///
/// # Errors
///
/// Returns error if the saved session cannot be removed.
pub async fn logout(shopper: &mut Shopper) -> Result<(), CliError> {
    shopper.sign_out().await?;
    emit(&["Signed out.".to_string()]);
    Ok(())
}

/// Show who is signed in.
pub fn whoami(shopper: &Shopper) {
    let status = if shopper.session.is_authenticated() {
        "Signed in."
    } else {
        "Browsing as guest."
    };
    emit(&[status.to_string()]);
}
