//! Error types for fas-keystore

use thiserror::Error;

/// Result type alias for keystore operations
pub type Result<T> = std::result::Result<T, KeystoreError>;

/// Errors surfaced to callers of the credential store.
///
/// Token-level failures never appear here individually: a tag mismatch, bad
/// padding or an unknown token version all become
/// [`KeystoreError::WrongPasswordOrCorrupt`].
#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Incorrect password or corrupted data")]
    WrongPasswordOrCorrupt,

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Failures raised while building or opening a token.
///
/// These stay inside the crate boundary; they are only logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Tag mismatch, impossible field lengths, or invalid padding.
    #[error("token failed integrity check")]
    Integrity,

    #[error("unsupported token version: {0:#04x}")]
    UnsupportedVersion(u8),

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

impl TokenError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Integrity => "integrity",
            TokenError::UnsupportedVersion(_) | TokenError::Malformed(_) => "format",
            TokenError::InvalidKey(_) => "key",
        }
    }
}
