use thiserror::Error;

use crate::scheme::{ChainingMode, CipherAlgorithm};

/// Errors returned by this crate.
///
/// A wrong password is *not* an error: [`crate::StandardDecryptor::verify_password`] reports it
/// as `Ok(false)`. Everything here means the document cannot be decrypted as configured, except
/// [`OffcryptoError::StreamNotOpened`], which flags a call-ordering bug in the caller.
#[derive(Debug, Error)]
pub enum OffcryptoError {
    /// Standard encryption is defined for ECB only.
    #[error("unsupported chaining mode {0:?}; Standard encryption requires ECB")]
    UnsupportedChainingMode(ChainingMode),
    /// A CryptoAPI algorithm identifier this crate does not know.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The declared key size does not fit the cipher or the 40-byte derivation output.
    #[error("invalid keySize {key_size_bits} bits for {cipher}")]
    InvalidKeySize {
        key_size_bits: u32,
        cipher: &'static str,
    },
    /// The scheme's spin count exceeds [`crate::DecryptOptions::max_spin_count`].
    #[error("spinCount {spin_count} exceeds the configured maximum {max}")]
    SpinCountTooLarge { spin_count: u32, max: u32 },
    /// Ciphertext handed to a block cipher was not block-aligned.
    #[error("ciphertext length {len} is not a multiple of the {block_size}-byte cipher block size")]
    InvalidCiphertextLength { len: usize, block_size: usize },
    /// Key bytes do not match the cipher's key size.
    #[error("invalid cipher key length {len}")]
    InvalidKeyLength { len: usize },
    /// A key derived for one cipher was handed to a scheme using another.
    #[error("key was derived for {} but the scheme uses {}", .key.name(), .scheme.name())]
    KeyAlgorithmMismatch {
        key: CipherAlgorithm,
        scheme: CipherAlgorithm,
    },
    /// Not enough bytes to read the requested structure.
    #[error("truncated data while reading {context}")]
    Truncated { context: &'static str },
    /// The declared plaintext length cannot be represented as a ciphertext bound.
    #[error("EncryptedPackage reported invalid original size {total_size}")]
    EncryptedPackageSizeOverflow { total_size: u64 },
    /// The data stream was requested before any password verified.
    #[error("password required")]
    PasswordRequired,
    /// [`crate::StandardDecryptor::length`] was called before the data stream was opened.
    #[error("data stream has not been opened; call data_stream() first")]
    StreamNotOpened,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl OffcryptoError {
    /// Returns true for misuse of the session API (as opposed to a document that cannot be
    /// decrypted).
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, OffcryptoError::StreamNotOpened)
    }
}

impl From<OffcryptoError> for std::io::Error {
    fn from(err: OffcryptoError) -> Self {
        match err {
            OffcryptoError::Io(err) => err,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}
