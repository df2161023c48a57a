//! MS-OFFCRYPTO Standard Encryption decryption.
//!
//! This crate covers the read side of password-protected legacy compound-file Office documents:
//! - ECMA-376 Standard password → key derivation (SHA-1 iterated hash, block key 0)
//! - password verification against the `EncryptionVerifier` blobs
//! - streaming decryption of the `EncryptedPackage` stream, truncated to the declared size
//!
//! Parsing the `EncryptionInfo` stream into an [`EncryptionScheme`] is left to the caller.

mod cipher;
mod ct;
mod decryptor;
mod error;
mod key;
mod provider;
mod scheme;
mod stream;
mod verifier;

pub use cipher::build_cipher;
pub use decryptor::{DecryptOptions, StandardDecryptor, DEFAULT_MAX_SPIN_COUNT};
pub use error::OffcryptoError;
pub use key::{derive_key, hash_password, DerivedKey, DEFAULT_PASSWORD};
pub use provider::{CipherSession, CryptoProvider, RustCryptoProvider};
pub use scheme::{
    ChainingMode, CipherAlgorithm, EncryptionScheme, HashAlgorithm, CALG_AES_128, CALG_AES_192,
    CALG_AES_256, CALG_MD5, CALG_SHA1, CALG_SHA_256, CALG_SHA_384, CALG_SHA_512,
};
pub use stream::{ciphertext_len, read_declared_length, DecryptedStream, SIZE_PREFIX_LEN};
pub use verifier::verify_password;

/// Spin count Office writes for Standard encryption.
pub const STANDARD_SPIN_COUNT: u32 = 50_000;

/// Name of the compound-file stream holding the encrypted payload.
pub const ENCRYPTED_PACKAGE_STREAM: &str = "EncryptedPackage";
