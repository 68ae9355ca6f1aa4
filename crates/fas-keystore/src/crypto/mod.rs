//! Cryptographic primitives for the API key store
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation from passwords
//! - Fernet-layout authenticated tokens (AES-128-CBC + HMAC-SHA256)
//! - Secure memory handling with zeroize

mod encryption;
mod key_derivation;
mod secure_memory;

pub use encryption::{decrypt, encrypt, open, Token, TOKEN_VERSION};
pub use key_derivation::{
    derive_key, KeyDerivationParams, PasswordKeyDeriver, DEFAULT_ITERATIONS, SALT_LEN,
    STATIC_SALT,
};
pub use secure_memory::{DerivedKey, SecretString, DERIVED_KEY_LEN};
