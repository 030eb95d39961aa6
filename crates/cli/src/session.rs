//! Session cookie persisted between invocations.
//!
//! Kept next to the guest cart in the data directory, the way a browser
//! keeps its cookie jar next to local storage.

use secrecy::{ExposeSecret, SecretString};

use diamant_rouge_client::{FileStorage, GuestStorage, StorageError};

/// Storage key of the saved session cookie.
const SESSION_KEY: &str = "session";

/// The saved storefront session, if any.
pub struct SavedSession {
    storage: FileStorage,
}

impl SavedSession {
    pub const fn new(storage: FileStorage) -> Self {
        Self { storage }
    }

    /// The saved cookie value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .storage
            .load(SESSION_KEY)?
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(SecretString::from))
    }

    /// Replace the saved cookie.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be written.
    pub fn save(&mut self, cookie: &SecretString) -> Result<(), StorageError> {
        self.storage.save(SESSION_KEY, cookie.expose_secret())
    }

    /// Forget the saved cookie.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SavedSession::new(FileStorage::new(dir.path()));

        assert!(session.load().unwrap().is_none());

        session.save(&SecretString::from("s3ss10n")).unwrap();
        let loaded = session.load().unwrap().unwrap();
        assert_eq!(loaded.expose_secret(), "s3ss10n");

        session.clear().unwrap();
        assert!(session.load().unwrap().is_none());
        session.clear().unwrap();
    }

    #[test]
    fn test_session_does_not_touch_guest_cart() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage
            .save(diamant_rouge_client::GUEST_CART_KEY, "[]")
            .unwrap();

        let mut session = SavedSession::new(FileStorage::new(dir.path()));
        session.save(&SecretString::from("abc")).unwrap();
        session.clear().unwrap();

        assert!(
            storage
                .load(diamant_rouge_client::GUEST_CART_KEY)
                .unwrap()
                .is_some()
        );
    }
}
