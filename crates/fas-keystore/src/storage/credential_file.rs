//! Single-file credential store
//!
//! Holds exactly one API key as a Fernet-layout token in one text file.
//! Every call derives its own key; nothing is cached between calls.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};
use zeroize::Zeroize;

use super::fs::write_atomic;
use super::KeyStore;
use crate::config::StoreConfig;
use crate::crypto::{decrypt, encrypt, PasswordKeyDeriver, SecretString, Token};
use crate::error::{KeystoreError, Result, TokenError};

/// Password-protected store for one secret
#[derive(Debug, Clone)]
pub struct CredentialStore {
    config: StoreConfig,
    deriver: PasswordKeyDeriver,
}

impl CredentialStore {
    /// Create a store from an explicit configuration
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            path = ?config.path,
            iterations = config.iterations,
            "Credential store configured"
        );

        Ok(Self {
            deriver: PasswordKeyDeriver::new(config.key_derivation_params()),
            config,
        })
    }

    /// Create a store at `path` with default key derivation settings
    pub fn with_path(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::with_path(path))
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// True iff the store file is present
    pub fn exists(&self) -> bool {
        self.config.path.exists()
    }

    /// Encrypt `secret` under `password` and atomically replace the store file
    pub fn save(&self, secret: &str, password: &str) -> Result<()> {
        let key = self.deriver.derive(password);
        let token = encrypt(secret.as_bytes(), &key)
            .map_err(|e| KeystoreError::EncryptionError(e.to_string()))?;

        write_atomic(&self.config.path, token.as_bytes())?;

        info!("Saved API key to {:?}", self.config.path);
        Ok(())
    }

    /// Decrypt the stored secret
    ///
    /// Returns `Ok(None)` when no store file exists. A wrong password and a
    /// damaged file both yield [`KeystoreError::WrongPasswordOrCorrupt`].
    pub fn load(&self, password: &str) -> Result<Option<SecretString>> {
        let Some(contents) = self.read_store()? else {
            return Ok(None);
        };

        let key = self.deriver.derive(password);
        let mut plaintext = decrypt(&contents, &key).map_err(reject)?;

        let secret = match String::from_utf8(std::mem::take(&mut plaintext)) {
            Ok(secret) => secret,
            Err(e) => {
                e.into_bytes().zeroize();
                debug!("Stored secret is not valid UTF-8");
                return Err(KeystoreError::WrongPasswordOrCorrupt);
            }
        };

        debug!("Loaded API key from {:?}", self.config.path);
        Ok(Some(SecretString::new(secret)))
    }

    /// When the stored token was written, read from its unauthenticated header.
    ///
    /// Returns `Ok(None)` when no store file exists.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(contents) = self.read_store()? else {
            return Ok(None);
        };

        let token = Token::parse(&contents).map_err(reject)?;
        Ok(token.issued_at())
    }

    fn read_store(&self) -> Result<Option<String>> {
        let bytes = match std::fs::read(&self.config.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No API key stored at {:?}", self.config.path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| reject(TokenError::Malformed("store file is not text".to_string())))
    }
}

/// Collapse every token failure into the one error callers see.
fn reject(err: TokenError) -> KeystoreError {
    debug!(kind = err.kind(), error = %err, "Stored token rejected");
    KeystoreError::WrongPasswordOrCorrupt
}

impl KeyStore for CredentialStore {
    fn is_key_saved(&self) -> bool {
        self.exists()
    }

    fn save_key(&self, key: &str, password: &str) -> Result<()> {
        self.save(key, password)
    }

    fn read_key(&self, password: &str) -> Result<Option<SecretString>> {
        self.load(password)
    }

    fn backend_name(&self) -> &'static str {
        "Encrypted File Storage"
    }
}
