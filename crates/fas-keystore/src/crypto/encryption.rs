//! Authenticated token encryption (Fernet layout)
//!
//! Token format, base64url encoded with padding:
//! `version(1) | issued_at(8, BE) | iv(16) | ciphertext(16n) | tag(32)`
//! - Version: always `0x80`
//! - Ciphertext: AES-128-CBC with PKCS#7 padding under the second key half
//! - Tag: HMAC-SHA256 over every preceding byte under the first key half

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use super::DerivedKey;
use crate::error::TokenError;

/// The only token version this crate reads or writes
pub const TOKEN_VERSION: u8 = 0x80;

const TIMESTAMP_LEN: usize = 8;
const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;
const TAG_LEN: usize = 32;
const HEADER_LEN: usize = 1 + TIMESTAMP_LEN + IV_LEN;
const MIN_TOKEN_LEN: usize = HEADER_LEN + BLOCK_LEN + TAG_LEN;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Decoded token fields. The tag has not necessarily been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    issued_at: u64,
    iv: [u8; IV_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl Token {
    /// Decode a base64url token and split it into fields.
    ///
    /// The version byte is checked before any length or tag validation.
    pub fn parse(encoded: &str) -> Result<Self, TokenError> {
        let data = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| TokenError::Malformed(format!("invalid base64: {}", e)))?;

        Self::from_bytes(&data)
    }

    fn from_bytes(data: &[u8]) -> Result<Self, TokenError> {
        let version = *data
            .first()
            .ok_or_else(|| TokenError::Malformed("empty token".to_string()))?;
        if version != TOKEN_VERSION {
            return Err(TokenError::UnsupportedVersion(version));
        }

        if data.len() < MIN_TOKEN_LEN || (data.len() - HEADER_LEN - TAG_LEN) % BLOCK_LEN != 0 {
            return Err(TokenError::Integrity);
        }

        let mut timestamp = [0u8; TIMESTAMP_LEN];
        timestamp.copy_from_slice(&data[1..1 + TIMESTAMP_LEN]);

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&data[1 + TIMESTAMP_LEN..HEADER_LEN]);

        let tag_start = data.len() - TAG_LEN;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&data[tag_start..]);

        Ok(Self {
            issued_at: u64::from_be_bytes(timestamp),
            iv,
            ciphertext: data[HEADER_LEN..tag_start].to_vec(),
            tag,
        })
    }

    /// Creation time in seconds since the Unix epoch
    pub fn issued_at_secs(&self) -> u64 {
        self.issued_at
    }

    /// Creation time. Recorded only; tokens never expire.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.issued_at)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Length of the padded ciphertext in bytes
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len()
    }

    fn signed_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        bytes.push(TOKEN_VERSION);
        bytes.extend_from_slice(&self.issued_at.to_be_bytes());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Raw token bytes, tag included
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.signed_bytes();
        bytes.extend_from_slice(&self.tag);
        bytes
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&URL_SAFE.encode(self.to_bytes()))
    }
}

impl FromStr for Token {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn mac_for(key: &DerivedKey, token: &Token) -> Result<HmacSha256, TokenError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.signing_key())
        .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
    mac.update(&token.signed_bytes());
    Ok(mac)
}

fn sign(token: &mut Token, key: &DerivedKey) -> Result<(), TokenError> {
    let tag = mac_for(key, token)?.finalize().into_bytes();
    token.tag.copy_from_slice(&tag);
    Ok(())
}

/// Build a token from explicit parts. `encrypt` supplies the clock and IV.
pub(crate) fn seal(
    plaintext: &[u8],
    key: &DerivedKey,
    issued_at: u64,
    iv: [u8; IV_LEN],
) -> Result<Token, TokenError> {
    let encryption_key = key.encryption_key();
    let ciphertext = Aes128CbcEnc::new_from_slices(&encryption_key[..], &iv)
        .map_err(|e| TokenError::InvalidKey(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut token = Token {
        issued_at,
        iv,
        ciphertext,
        tag: [0u8; TAG_LEN],
    };
    sign(&mut token, key)?;

    Ok(token)
}

/// Encrypt plaintext into an encoded token
///
/// # Arguments
/// * `plaintext` - The data to encrypt
/// * `key` - The derived key; both halves are used
///
/// # Returns
/// The base64url token, stamped with the current time and a fresh random IV
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> Result<String, TokenError> {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let issued_at = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
    let token = seal(plaintext, key, issued_at, iv)?;

    tracing::trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = token.ciphertext_len(),
        issued_at,
        "sealed token"
    );

    Ok(token.to_string())
}

/// Verify and decrypt a parsed token
///
/// The tag is checked in constant time before the ciphertext is touched.
/// Bad padding is reported as [`TokenError::Integrity`], same as a bad tag.
pub fn open(token: &Token, key: &DerivedKey) -> Result<Vec<u8>, TokenError> {
    mac_for(key, token)?
        .verify_slice(&token.tag)
        .map_err(|_| TokenError::Integrity)?;

    let encryption_key = key.encryption_key();
    Aes128CbcDec::new_from_slices(&encryption_key[..], &token.iv)
        .map_err(|e| TokenError::InvalidKey(e.to_string()))?
        .decrypt_padded_vec_mut::<Pkcs7>(&token.ciphertext)
        .map_err(|_| TokenError::Integrity)
}

/// Decode, verify and decrypt an encoded token
pub fn decrypt(encoded: &str, key: &DerivedKey) -> Result<Vec<u8>, TokenError> {
    let token = Token::parse(encoded)?;
    open(&token, key)
}
