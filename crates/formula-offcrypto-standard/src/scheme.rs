//! Algorithm identifiers and the immutable description of one Standard-encrypted document.

use crate::OffcryptoError;

// CryptoAPI algorithm identifiers used by Standard encryption (WinCrypt.h).
pub const CALG_AES_128: u32 = 0x0000_660E;
pub const CALG_AES_192: u32 = 0x0000_660F;
pub const CALG_AES_256: u32 = 0x0000_6610;
pub const CALG_MD5: u32 = 0x0000_8003;
pub const CALG_SHA1: u32 = 0x0000_8004;
pub const CALG_SHA_256: u32 = 0x0000_800C;
pub const CALG_SHA_384: u32 = 0x0000_800D;
pub const CALG_SHA_512: u32 = 0x0000_800E;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Map an `EncryptionHeader.algIdHash` value.
    pub fn from_alg_id_hash(alg_id_hash: u32) -> Result<Self, OffcryptoError> {
        match alg_id_hash {
            CALG_MD5 => Ok(HashAlgorithm::Md5),
            CALG_SHA1 => Ok(HashAlgorithm::Sha1),
            CALG_SHA_256 => Ok(HashAlgorithm::Sha256),
            CALG_SHA_384 => Ok(HashAlgorithm::Sha384),
            CALG_SHA_512 => Ok(HashAlgorithm::Sha512),
            other => Err(OffcryptoError::UnsupportedAlgorithm(format!(
                "algIdHash=0x{other:08x}"
            ))),
        }
    }

    /// Digest size in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    Aes128,
    Aes192,
    Aes256,
}

impl CipherAlgorithm {
    /// Map an `EncryptionHeader.algId` value.
    pub fn from_alg_id(alg_id: u32) -> Result<Self, OffcryptoError> {
        match alg_id {
            CALG_AES_128 => Ok(CipherAlgorithm::Aes128),
            CALG_AES_192 => Ok(CipherAlgorithm::Aes192),
            CALG_AES_256 => Ok(CipherAlgorithm::Aes256),
            other => Err(OffcryptoError::UnsupportedAlgorithm(format!(
                "algId=0x{other:08x}"
            ))),
        }
    }

    pub fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128 => 16,
            CipherAlgorithm::Aes192 => 24,
            CipherAlgorithm::Aes256 => 32,
        }
    }

    pub fn block_size(self) -> usize {
        16
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes128 => "AES-128",
            CipherAlgorithm::Aes192 => "AES-192",
            CipherAlgorithm::Aes256 => "AES-256",
        }
    }
}

/// Block cipher mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainingMode {
    Ecb,
    Cbc,
    Cfb,
}

/// Parameters of one Standard-encrypted document, as produced by an `EncryptionInfo` parser.
///
/// The value is never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionScheme {
    pub hash_algorithm: HashAlgorithm,
    pub cipher_algorithm: CipherAlgorithm,
    /// `EncryptionHeader.keySize`.
    pub key_size_bits: u32,
    pub chaining_mode: ChainingMode,
    pub salt: Vec<u8>,
    pub spin_count: u32,
    pub encrypted_verifier: Vec<u8>,
    /// Block-padded ciphertext of the verifier hash (32 bytes for SHA-1).
    pub encrypted_verifier_hash: Vec<u8>,
}

impl EncryptionScheme {
    /// The usual Excel 2007 parameters: AES-ECB + SHA-1 with Office's fixed 50,000 spin count.
    pub fn standard_aes(
        cipher_algorithm: CipherAlgorithm,
        salt: Vec<u8>,
        encrypted_verifier: Vec<u8>,
        encrypted_verifier_hash: Vec<u8>,
    ) -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha1,
            cipher_algorithm,
            key_size_bits: (cipher_algorithm.key_len() * 8) as u32,
            chaining_mode: ChainingMode::Ecb,
            salt,
            spin_count: crate::STANDARD_SPIN_COUNT,
            encrypted_verifier,
            encrypted_verifier_hash,
        }
    }

    /// Key size in bytes (`keySize / 8`).
    pub fn key_size_bytes(&self) -> usize {
        (self.key_size_bits / 8) as usize
    }

    pub fn block_size(&self) -> usize {
        self.cipher_algorithm.block_size()
    }

    /// Check the parameters a decryption session relies on.
    pub(crate) fn validate(&self, max_spin_count: u32) -> Result<(), OffcryptoError> {
        if self.chaining_mode != ChainingMode::Ecb {
            return Err(OffcryptoError::UnsupportedChainingMode(self.chaining_mode));
        }
        if self.key_size_bits % 8 != 0
            || self.key_size_bytes() != self.cipher_algorithm.key_len()
            || self.key_size_bytes() > crate::key::MAX_DERIVED_KEY_LEN
        {
            return Err(OffcryptoError::InvalidKeySize {
                key_size_bits: self.key_size_bits,
                cipher: self.cipher_algorithm.name(),
            });
        }
        if self.spin_count > max_spin_count {
            return Err(OffcryptoError::SpinCountTooLarge {
                spin_count: self.spin_count,
                max: max_spin_count,
            });
        }
        Ok(())
    }
}
