use crate::key::DerivedKey;
use crate::provider::{CipherSession, CryptoProvider};
use crate::scheme::{ChainingMode, EncryptionScheme};
use crate::OffcryptoError;

/// Build the decrypt-mode cipher for `scheme` from a derived key.
///
/// Standard encryption always uses ECB (no IV, no chaining); any other mode is rejected.
pub fn build_cipher<P: CryptoProvider + ?Sized>(
    provider: &P,
    key: &DerivedKey,
    scheme: &EncryptionScheme,
) -> Result<Box<dyn CipherSession>, OffcryptoError> {
    if scheme.chaining_mode != ChainingMode::Ecb {
        return Err(OffcryptoError::UnsupportedChainingMode(scheme.chaining_mode));
    }
    if key.algorithm() != scheme.cipher_algorithm {
        return Err(OffcryptoError::KeyAlgorithmMismatch {
            key: key.algorithm(),
            scheme: scheme.cipher_algorithm,
        });
    }
    provider.cipher(key.as_bytes(), scheme.cipher_algorithm, ChainingMode::Ecb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::derive_key;
    use crate::provider::RustCryptoProvider;
    use crate::scheme::CipherAlgorithm;

    fn scheme() -> EncryptionScheme {
        let mut scheme = EncryptionScheme::standard_aes(
            CipherAlgorithm::Aes128,
            vec![7u8; 16],
            vec![0u8; 16],
            vec![0u8; 32],
        );
        scheme.spin_count = 1;
        scheme
    }

    #[test]
    fn builds_ecb_cipher_with_scheme_block_size() {
        let scheme = scheme();
        let key = derive_key(&RustCryptoProvider, Some("pw"), &scheme, 16);
        let cipher = build_cipher(&RustCryptoProvider, &key, &scheme).expect("cipher");
        assert_eq!(cipher.block_size(), 16);
    }

    #[test]
    fn non_ecb_chaining_is_rejected() {
        let mut scheme = scheme();
        let key = derive_key(&RustCryptoProvider, Some("pw"), &scheme, 16);
        scheme.chaining_mode = ChainingMode::Cfb;
        let err = build_cipher(&RustCryptoProvider, &key, &scheme)
            .err()
            .expect("expected chaining mode error");
        assert!(matches!(
            err,
            OffcryptoError::UnsupportedChainingMode(ChainingMode::Cfb)
        ));
    }

    #[test]
    fn key_for_another_cipher_is_rejected() {
        let scheme = scheme();
        let mut aes256 = scheme.clone();
        aes256.cipher_algorithm = CipherAlgorithm::Aes256;
        let key = derive_key(&RustCryptoProvider, Some("pw"), &aes256, 32);
        let err = build_cipher(&RustCryptoProvider, &key, &scheme)
            .err()
            .expect("expected key/cipher mismatch");
        assert!(matches!(
            err,
            OffcryptoError::KeyAlgorithmMismatch {
                key: CipherAlgorithm::Aes256,
                scheme: CipherAlgorithm::Aes128,
            }
        ));
        assert_eq!(
            err.to_string(),
            "key was derived for AES-256 but the scheme uses AES-128"
        );
    }
}
