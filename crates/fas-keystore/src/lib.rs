//! # fas-keystore
//!
//! Password-protected storage for the fungiarticlesearch API key:
//! - PBKDF2-HMAC-SHA256 key derivation with a fixed salt
//! - Fernet-layout tokens (AES-128-CBC + HMAC-SHA256) with uniform failure on tampering
//! - Single-file storage with atomic replacement and zeroize-on-drop secrets

pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;

pub use config::StoreConfig;
pub use crypto::{
    decrypt, encrypt, DerivedKey, KeyDerivationParams, PasswordKeyDeriver, SecretString, Token,
};
pub use error::{KeystoreError, Result, TokenError};
pub use storage::{CredentialStore, KeyStore};
