//! Password-based key derivation using PBKDF2-HMAC-SHA256

use sha2::Sha256;

use super::secure_memory::{DerivedKey, DERIVED_KEY_LEN};

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 390_000;

/// Length of the salt in bytes
pub const SALT_LEN: usize = 16;

/// Salt shared by every store. Changing it makes existing store files unreadable.
pub const STATIC_SALT: [u8; SALT_LEN] = [
    0x20, 0xdf, 0xee, 0xaa, 0x2a, 0x88, 0xb7, 0x44, 0xc1, 0xf9, 0x6d, 0x8f, 0xe8, 0xff, 0x46, 0x54,
];

/// Parameters for PBKDF2 key derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDerivationParams {
    /// Number of PBKDF2 rounds (default: 390,000)
    pub iterations: u32,
    /// Salt mixed into every derivation
    pub salt: [u8; SALT_LEN],
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            salt: STATIC_SALT,
        }
    }
}

/// Turns passwords into [`DerivedKey`]s.
///
/// Pure: the same password and parameters always give the same key.
#[derive(Debug, Clone, Default)]
pub struct PasswordKeyDeriver {
    params: KeyDerivationParams,
}

impl PasswordKeyDeriver {
    pub fn new(params: KeyDerivationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KeyDerivationParams {
        &self.params
    }

    /// Derive a 256-bit key from `password`. Empty passwords are accepted.
    pub fn derive(&self, password: &str) -> DerivedKey {
        derive_key(password, &self.params)
    }
}

/// Derive a 256-bit key from a password using PBKDF2-HMAC-SHA256
///
/// # Arguments
/// * `password` - The user's password, hashed as UTF-8
/// * `params` - Salt and iteration count
///
/// # Returns
/// A 32-byte key; the first half signs tokens, the second half encrypts them
pub fn derive_key(password: &str, params: &KeyDerivationParams) -> DerivedKey {
    pbkdf2_sha256(password.as_bytes(), &params.salt, params.iterations)
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], iterations: u32) -> DerivedKey {
    let mut key_bytes = [0u8; DERIVED_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key_bytes);

    let key = DerivedKey::new(key_bytes);
    zeroize::Zeroize::zeroize(&mut key_bytes);
    key
}
