//! CLI error type.

use thiserror::Error;

use diamant_rouge_client::{ApiError, ConfigError, StorageError, SyncError};

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storefront request failed: {0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Sync(SyncError),

    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("no password given (use --password or set DR_PASSWORD)")]
    MissingPassword,

    #[error("not signed in (run `dr-cli login` first)")]
    NotSignedIn,

    #[error("session expired (run `dr-cli login` again)")]
    SessionExpired,
}

impl From<SyncError> for CliError {
    fn from(error: SyncError) -> Self {
        if error.is_unauthorized() {
            Self::SessionExpired
        } else {
            Self::Sync(error)
        }
    }
}
