#![allow(dead_code)]

use std::io::{Cursor, Write};

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use sha1::Digest as _;

use formula_offcrypto_standard::{
    derive_key, CipherAlgorithm, EncryptionScheme, HashAlgorithm, RustCryptoProvider,
    ENCRYPTED_PACKAGE_STREAM,
};

pub const AES_BLOCK_LEN: usize = 16;

/// Fixed verifier plaintext used by every fixture.
pub const VERIFIER: [u8; 16] = *b"standard-verify!";

/// AES-ECB encrypt `data`, zero-padding it to a whole number of blocks.
pub fn aes_ecb_encrypt(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut buf = data.to_vec();
    buf.resize(data.len().div_ceil(AES_BLOCK_LEN) * AES_BLOCK_LEN, 0);

    fn encrypt_with<C: BlockEncrypt>(cipher: C, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(AES_BLOCK_LEN) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }

    match key.len() {
        16 => encrypt_with(Aes128::new_from_slice(key).expect("AES-128 key"), &mut buf),
        24 => encrypt_with(Aes192::new_from_slice(key).expect("AES-192 key"), &mut buf),
        32 => encrypt_with(Aes256::new_from_slice(key).expect("AES-256 key"), &mut buf),
        other => panic!("unsupported AES key length {other}"),
    }
    buf
}

/// Digest computed with the hash crates directly, independent of the crate's provider.
pub fn digest(alg: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    match alg {
        HashAlgorithm::Md5 => md5::Md5::digest(data).to_vec(),
        HashAlgorithm::Sha1 => sha1::Sha1::digest(data).to_vec(),
        HashAlgorithm::Sha256 => sha2::Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => sha2::Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => sha2::Sha512::digest(data).to_vec(),
    }
}

/// Build a scheme whose verifier blobs accept `password`.
///
/// The verifier hash blob is the digest zero-padded to whole AES blocks: 32 bytes for SHA-1 and
/// SHA-256, 16 for MD5, 48 for SHA-384 and 64 for SHA-512.
pub fn scheme_for(
    cipher: CipherAlgorithm,
    hash: HashAlgorithm,
    password: Option<&str>,
    salt: &[u8],
    spin_count: u32,
) -> EncryptionScheme {
    let mut scheme =
        EncryptionScheme::standard_aes(cipher, salt.to_vec(), Vec::new(), Vec::new());
    scheme.hash_algorithm = hash;
    scheme.spin_count = spin_count;

    let key = derive_key(&RustCryptoProvider, password, &scheme, scheme.key_size_bytes());
    let verifier_hash = digest(hash, &VERIFIER);
    scheme.encrypted_verifier = aes_ecb_encrypt(key.as_bytes(), &VERIFIER);
    scheme.encrypted_verifier_hash = aes_ecb_encrypt(key.as_bytes(), &verifier_hash);
    scheme
}

/// `EncryptedPackage` stream bytes: LE64 size prefix followed by zero-padded ECB ciphertext.
pub fn encrypt_package(
    scheme: &EncryptionScheme,
    password: Option<&str>,
    plaintext: &[u8],
) -> Vec<u8> {
    let key = derive_key(&RustCryptoProvider, password, scheme, scheme.key_size_bytes());
    let mut out = (plaintext.len() as u64).to_le_bytes().to_vec();
    out.extend_from_slice(&aes_ecb_encrypt(key.as_bytes(), plaintext));
    out
}

/// Deterministic, non-repeating-looking plaintext.
pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| ((i as u32).wrapping_mul(2_654_435_761) >> 24) as u8)
        .collect()
}

/// A compound file holding `package` as its `EncryptedPackage` stream.
pub fn compound_file_with_package(package: &[u8]) -> Vec<u8> {
    let cursor = Cursor::new(Vec::new());
    let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
    ole.create_stream(ENCRYPTED_PACKAGE_STREAM)
        .expect("create EncryptedPackage")
        .write_all(package)
        .expect("write EncryptedPackage");
    ole.into_inner().into_inner()
}
