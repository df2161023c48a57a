//! Standard Encryption password → key derivation (MS-OFFCRYPTO 2.3.4.7, block index 0).

use core::fmt;

use zeroize::Zeroizing;

use crate::ct::ct_eq;
use crate::provider::CryptoProvider;
use crate::scheme::{CipherAlgorithm, EncryptionScheme, HashAlgorithm};

/// Password Office uses when a document is encrypted without a user-supplied password.
pub const DEFAULT_PASSWORD: &str = "VelvetSweatshop";

/// Length of the `x1 || x2` derivation output (two SHA-1 digests).
pub(crate) const MAX_DERIVED_KEY_LEN: usize = 40;

const BLOCK_KEY: u32 = 0;

/// Symmetric key derived from a password, tagged with the cipher it is meant for.
///
/// Key bytes are wiped on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: Zeroizing<Vec<u8>>,
    algorithm: CipherAlgorithm,
}

impl DerivedKey {
    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("algorithm", &self.algorithm)
            .field("key_len", &self.bytes.len())
            .finish()
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && ct_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for DerivedKey {}

fn password_to_utf16le_bytes(password: &str) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(Vec::with_capacity(password.len() * 2));
    for unit in password.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Iterated password hash `H`.
///
/// ```text
/// H = Hash(salt || password_utf16le)
/// for i in 0..spinCount:
///     H = Hash(LE32(i) || H)
/// ```
///
/// `None` hashes [`DEFAULT_PASSWORD`].
pub fn hash_password<P: CryptoProvider + ?Sized>(
    provider: &P,
    password: Option<&str>,
    hash_alg: HashAlgorithm,
    salt: &[u8],
    spin_count: u32,
) -> Zeroizing<Vec<u8>> {
    let password_utf16 = password_to_utf16le_bytes(password.unwrap_or(DEFAULT_PASSWORD));

    let mut buf = Zeroizing::new(Vec::with_capacity(salt.len() + password_utf16.len()));
    buf.extend_from_slice(salt);
    buf.extend_from_slice(&password_utf16);
    let mut h = Zeroizing::new(provider.digest(hash_alg, &buf));

    let mut round = Zeroizing::new(Vec::with_capacity(4 + h.len()));
    for i in 0..spin_count {
        round.clear();
        round.extend_from_slice(&i.to_le_bytes());
        round.extend_from_slice(&h);
        h = Zeroizing::new(provider.digest(hash_alg, &round));
    }
    h
}

/// `Hfinal = Hash(H || LE32(block))`, sized to the hash algorithm's digest length.
fn block_hash<P: CryptoProvider + ?Sized>(
    provider: &P,
    h: &[u8],
    block: u32,
    hash_alg: HashAlgorithm,
) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(h.len() + 4));
    buf.extend_from_slice(h);
    buf.extend_from_slice(&block.to_le_bytes());
    let mut out = Zeroizing::new(provider.digest(hash_alg, &buf));
    out.resize(hash_alg.digest_len(), 0x36);
    out
}

/// SHA-1 of a 64-byte `fill` buffer whose leading bytes are XORed with `hash`.
fn fill_and_xor<P: CryptoProvider + ?Sized>(
    provider: &P,
    hash: &[u8],
    fill: u8,
) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new([fill; 64]);
    for (dst, src) in buf.iter_mut().zip(hash) {
        *dst ^= src;
    }
    Zeroizing::new(provider.digest(HashAlgorithm::Sha1, buf.as_slice()))
}

/// Derive the Standard Encryption key for `password`.
///
/// The derivation produces 40 bytes (`SHA1(0x36-pad) || SHA1(0x5c-pad)`) which are truncated to
/// `key_size_bytes`.
///
/// `key_size_bytes` must not exceed 40. This is a precondition, not a checked error: a session
/// built with [`crate::StandardDecryptor::new`] rejects such schemes before deriving anything.
/// Violating it directly yields the 40 derived bytes zero-extended (and trips a debug assertion).
pub fn derive_key<P: CryptoProvider + ?Sized>(
    provider: &P,
    password: Option<&str>,
    scheme: &EncryptionScheme,
    key_size_bytes: usize,
) -> DerivedKey {
    debug_assert!(
        key_size_bytes <= MAX_DERIVED_KEY_LEN,
        "key size {key_size_bytes} exceeds the {MAX_DERIVED_KEY_LEN}-byte derivation output"
    );

    let hash_alg = scheme.hash_algorithm;
    let h = hash_password(provider, password, hash_alg, &scheme.salt, scheme.spin_count);
    let hfinal = block_hash(provider, &h, BLOCK_KEY, hash_alg);

    let x1 = fill_and_xor(provider, &hfinal, 0x36);
    let x2 = fill_and_xor(provider, &hfinal, 0x5c);

    let mut bytes = Zeroizing::new(Vec::with_capacity(x1.len() + x2.len()));
    bytes.extend_from_slice(&x1);
    bytes.extend_from_slice(&x2);
    bytes.resize(key_size_bytes, 0);

    DerivedKey {
        bytes,
        algorithm: scheme.cipher_algorithm,
    }
}
