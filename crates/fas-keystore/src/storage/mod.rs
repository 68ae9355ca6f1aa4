//! Persistence for the protected API key
//!
//! A single backend is provided: one encrypted token in one file, written
//! atomically.

mod credential_file;
mod fs;
mod traits;

pub use credential_file::CredentialStore;
pub use traits::KeyStore;
