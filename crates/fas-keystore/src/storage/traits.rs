//! Storage trait definitions

use crate::crypto::SecretString;
use crate::error::Result;

/// Password-protected storage for a single API key.
///
/// This is the surface the application layer talks to. Prompting for
/// passwords and deciding how many attempts to allow is up to the caller.
pub trait KeyStore: Send + Sync {
    /// Check whether a key has been saved. Does not validate the contents.
    fn is_key_saved(&self) -> bool;

    /// Encrypt `key` under `password` and persist it, replacing any saved key
    fn save_key(&self, key: &str, password: &str) -> Result<()>;

    /// Decrypt the saved key.
    ///
    /// Returns `Ok(None)` if nothing has been saved and
    /// [`KeystoreError::WrongPasswordOrCorrupt`](crate::KeystoreError::WrongPasswordOrCorrupt)
    /// if the password is wrong or the stored data was altered.
    fn read_key(&self, password: &str) -> Result<Option<SecretString>>;

    /// Get a human-readable name for this storage backend
    fn backend_name(&self) -> &'static str;
}
