//! Store configuration
//!
//! Everything a [`CredentialStore`](crate::CredentialStore) needs is carried in
//! a [`StoreConfig`] value; there is no global state. The config can be built
//! in code or read from a JSON file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::crypto::{KeyDerivationParams, DEFAULT_ITERATIONS, SALT_LEN, STATIC_SALT};
use crate::error::{KeystoreError, Result};

/// File name of the store inside the data directory
pub const STORE_FILE_NAME: &str = "secret";

/// Configuration for a single credential store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// Location of the store file
    pub path: PathBuf,
    /// PBKDF2 iteration count
    pub iterations: u32,
    /// Key derivation salt, hex encoded in JSON
    #[serde(with = "salt_hex")]
    pub salt: [u8; SALT_LEN],
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            iterations: DEFAULT_ITERATIONS,
            salt: STATIC_SALT,
        }
    }
}

impl StoreConfig {
    /// Default settings with a custom store location
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StoreConfig = serde_json::from_str(&contents)?;
        config.validate()?;

        debug!("Loaded store config from {:?}", path);
        Ok(config)
    }

    /// Check the values a store cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(KeystoreError::ConfigError(
                "iterations must be at least 1".to_string(),
            ));
        }

        if self.path.file_name().is_none() {
            return Err(KeystoreError::ConfigError(format!(
                "store path {:?} does not name a file",
                self.path
            )));
        }

        Ok(())
    }

    /// Parameters handed to the key deriver
    pub fn key_derivation_params(&self) -> KeyDerivationParams {
        KeyDerivationParams {
            iterations: self.iterations,
            salt: self.salt,
        }
    }
}

/// `<platform data dir>/secret`, or `.fasdata/secret` when no home directory
/// can be determined
pub fn default_store_path() -> PathBuf {
    ProjectDirs::from("org", "fungiarticlesearch", "fas")
        .map(|dirs| dirs.data_dir().join(STORE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(".fasdata").join(STORE_FILE_NAME))
}

mod salt_hex {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::SALT_LEN;

    pub fn serialize<S: Serializer>(salt: &[u8; SALT_LEN], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(salt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; SALT_LEN], D::Error> {
        let encoded = String::deserialize(deserializer)?;
        let bytes = hex::decode(encoded.trim()).map_err(D::Error::custom)?;
        <[u8; SALT_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            D::Error::custom(format!(
                "salt must be {} bytes, got {}",
                SALT_LEN,
                bytes.len()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();

        assert_eq!(config.iterations, 390_000);
        assert_eq!(config.salt, STATIC_SALT);
        assert_eq!(config.path.file_name().unwrap(), STORE_FILE_NAME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_path_keeps_defaults() {
        let config = StoreConfig::with_path("/tmp/fas/secret");

        assert_eq!(config.path, PathBuf::from("/tmp/fas/secret"));
        assert_eq!(config.key_derivation_params(), KeyDerivationParams::default());
    }

    #[test]
    fn test_from_file_partial() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keystore.json");
        std::fs::write(&config_path, r#"{ "path": "/var/lib/fas/secret" }"#).unwrap();

        let config = StoreConfig::from_file(&config_path).unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/fas/secret"));
        assert_eq!(config.iterations, DEFAULT_ITERATIONS);
        assert_eq!(config.salt, STATIC_SALT);
    }

    #[test]
    fn test_from_file_full() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keystore.json");
        std::fs::write(
            &config_path,
            r#"{
                "path": "data/secret",
                "iterations": 1000,
                "salt": "000102030405060708090a0b0c0d0e0f"
            }"#,
        )
        .unwrap();

        let config = StoreConfig::from_file(&config_path).unwrap();
        assert_eq!(config.iterations, 1000);
        assert_eq!(config.salt[0], 0x00);
        assert_eq!(config.salt[15], 0x0f);
    }

    #[test]
    fn test_json_roundtrip_encodes_salt_as_hex() {
        let config = StoreConfig::with_path("secret");
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("20dfeeaa2a88b744c1f96d8fe8ff4654"));
        let parsed: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bad_salt_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keystore.json");
        std::fs::write(&config_path, r#"{ "salt": "abcd" }"#).unwrap();

        assert!(matches!(
            StoreConfig::from_file(&config_path),
            Err(KeystoreError::SerializationError(_))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("keystore.json");
        std::fs::write(&config_path, r#"{ "iterations": 0 }"#).unwrap();

        assert!(matches!(
            StoreConfig::from_file(&config_path),
            Err(KeystoreError::ConfigError(_))
        ));
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = StoreConfig::from_file(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(KeystoreError::IoError(_))));
    }

    #[test]
    fn test_directory_path_rejected() {
        let config = StoreConfig::with_path("/");
        assert!(matches!(config.validate(), Err(KeystoreError::ConfigError(_))));
    }
}
