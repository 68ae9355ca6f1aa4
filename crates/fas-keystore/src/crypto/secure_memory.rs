//! Secure memory handling with automatic zeroization

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::TokenError;

/// Length of a derived key in bytes
pub const DERIVED_KEY_LEN: usize = 32;

/// Half of the derived key: one part signs, the other encrypts
pub const HALF_KEY_LEN: usize = DERIVED_KEY_LEN / 2;

/// Symmetric key derived from a password - automatically zeroed when dropped
///
/// The first half is the HMAC signing key, the second half the AES key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; DERIVED_KEY_LEN],
}

impl DerivedKey {
    /// Create a derived key from raw bytes
    pub fn new(key: [u8; DERIVED_KEY_LEN]) -> Self {
        Self { key }
    }

    /// Get the key bytes (use carefully - avoid copying)
    pub fn as_bytes(&self) -> &[u8; DERIVED_KEY_LEN] {
        &self.key
    }

    pub(crate) fn signing_key(&self) -> &[u8] {
        &self.key[..HALF_KEY_LEN]
    }

    pub(crate) fn encryption_key(&self) -> Zeroizing<[u8; HALF_KEY_LEN]> {
        let mut half = Zeroizing::new([0u8; HALF_KEY_LEN]);
        half.copy_from_slice(&self.key[HALF_KEY_LEN..]);
        half
    }

    /// URL-safe base64 form of the key (44 characters, padded).
    ///
    /// This is the textual key format Fernet implementations accept.
    pub fn encode(&self) -> Zeroizing<String> {
        Zeroizing::new(URL_SAFE.encode(self.key))
    }

    /// Parse a key from its URL-safe base64 form
    pub fn from_encoded(encoded: &str) -> Result<Self, TokenError> {
        let bytes = Zeroizing::new(
            URL_SAFE
                .decode(encoded.trim())
                .map_err(|e| TokenError::InvalidKey(format!("invalid base64: {}", e)))?,
        );

        if bytes.len() != DERIVED_KEY_LEN {
            return Err(TokenError::InvalidKey(format!(
                "expected {} bytes, got {}",
                DERIVED_KEY_LEN,
                bytes.len()
            )));
        }

        let mut key = [0u8; DERIVED_KEY_LEN];
        key.copy_from_slice(&bytes);
        Ok(Self { key })
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Decrypted secret value - automatically zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    /// Create a new secret string
    pub fn new(value: String) -> Self {
        Self { value }
    }

    /// Get the secret value (use carefully)
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Consume and return the inner value
    pub fn into_inner(mut self) -> String {
        std::mem::take(&mut self.value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretString")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
