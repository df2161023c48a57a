//! Hash and block-cipher primitives, looked up by algorithm identifier.
//!
//! Key derivation and the cipher factory take a [`CryptoProvider`] instead of reaching for
//! process-wide lookups, so tests (or an alternate backend) can substitute their own.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use sha1::Digest as _;

use crate::scheme::{ChainingMode, CipherAlgorithm, HashAlgorithm};
use crate::OffcryptoError;

/// A configured decrypt-mode block cipher.
pub trait CipherSession: Send {
    fn block_size(&self) -> usize;

    /// Decrypt `buf` in place. `buf.len()` must be a multiple of [`Self::block_size`].
    fn decrypt_in_place(&self, buf: &mut [u8]) -> Result<(), OffcryptoError>;
}

/// Supplier of message digests and block ciphers.
pub trait CryptoProvider {
    fn digest(&self, alg: HashAlgorithm, data: &[u8]) -> Vec<u8>;

    fn cipher(
        &self,
        key: &[u8],
        alg: CipherAlgorithm,
        chaining: ChainingMode,
    ) -> Result<Box<dyn CipherSession>, OffcryptoError>;
}

impl<P: CryptoProvider + ?Sized> CryptoProvider for &P {
    fn digest(&self, alg: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        (**self).digest(alg, data)
    }

    fn cipher(
        &self,
        key: &[u8],
        alg: CipherAlgorithm,
        chaining: ChainingMode,
    ) -> Result<Box<dyn CipherSession>, OffcryptoError> {
        (**self).cipher(key, alg, chaining)
    }
}

/// [`CryptoProvider`] backed by the RustCrypto `aes`, `sha1`, `sha2` and `md-5` crates.
///
/// Only ECB is provided; other chaining modes are not used by Standard encryption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RustCryptoProvider;

impl CryptoProvider for RustCryptoProvider {
    fn digest(&self, alg: HashAlgorithm, data: &[u8]) -> Vec<u8> {
        match alg {
            HashAlgorithm::Md5 => md5::Md5::digest(data).to_vec(),
            HashAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => sha2::Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }

    fn cipher(
        &self,
        key: &[u8],
        alg: CipherAlgorithm,
        chaining: ChainingMode,
    ) -> Result<Box<dyn CipherSession>, OffcryptoError> {
        if chaining != ChainingMode::Ecb {
            return Err(OffcryptoError::UnsupportedChainingMode(chaining));
        }
        if key.len() != alg.key_len() {
            return Err(OffcryptoError::InvalidKeyLength { len: key.len() });
        }
        let invalid_key = |_| OffcryptoError::InvalidKeyLength { len: key.len() };
        let ecb = match alg {
            CipherAlgorithm::Aes128 => {
                AesEcb::Aes128(Aes128::new_from_slice(key).map_err(invalid_key)?)
            }
            CipherAlgorithm::Aes192 => {
                AesEcb::Aes192(Aes192::new_from_slice(key).map_err(invalid_key)?)
            }
            CipherAlgorithm::Aes256 => {
                AesEcb::Aes256(Aes256::new_from_slice(key).map_err(invalid_key)?)
            }
        };
        Ok(Box::new(ecb))
    }
}

const AES_BLOCK_SIZE: usize = 16;

enum AesEcb {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl CipherSession for AesEcb {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn decrypt_in_place(&self, buf: &mut [u8]) -> Result<(), OffcryptoError> {
        if buf.len() % AES_BLOCK_SIZE != 0 {
            return Err(OffcryptoError::InvalidCiphertextLength {
                len: buf.len(),
                block_size: AES_BLOCK_SIZE,
            });
        }

        fn decrypt_with<C: BlockDecrypt>(cipher: &C, buf: &mut [u8]) {
            for block in buf.chunks_exact_mut(AES_BLOCK_SIZE) {
                cipher.decrypt_block(GenericArray::from_mut_slice(block));
            }
        }

        match self {
            AesEcb::Aes128(cipher) => decrypt_with(cipher, buf),
            AesEcb::Aes192(cipher) => decrypt_with(cipher, buf),
            AesEcb::Aes256(cipher) => decrypt_with(cipher, buf),
        }
        Ok(())
    }
}
