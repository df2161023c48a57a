use zeroize::Zeroizing;

use crate::cipher::build_cipher;
use crate::ct::ct_eq;
use crate::key::{derive_key, DerivedKey};
use crate::provider::CryptoProvider;
use crate::scheme::EncryptionScheme;
use crate::OffcryptoError;

/// Check `password` against the scheme's encrypted verifier.
///
/// Returns the derived key when `Hash(Decrypt(encryptedVerifier))` matches the leading bytes of
/// `Decrypt(encryptedVerifierHash)`, `None` on a wrong password. The comparison covers the
/// computed digest's length (the decrypted hash is block-padded); a decrypted hash shorter than
/// the digest never matches.
///
/// Malformed verifier ciphertext is an error, not a mismatch.
pub fn verify_password<P: CryptoProvider + ?Sized>(
    provider: &P,
    scheme: &EncryptionScheme,
    password: Option<&str>,
) -> Result<Option<DerivedKey>, OffcryptoError> {
    let key = derive_key(provider, password, scheme, scheme.key_size_bytes());
    let cipher = build_cipher(provider, &key, scheme)?;

    let mut verifier = Zeroizing::new(scheme.encrypted_verifier.clone());
    cipher.decrypt_in_place(&mut verifier)?;
    let calc_hash = Zeroizing::new(provider.digest(scheme.hash_algorithm, &verifier));

    let mut decrypted_hash = Zeroizing::new(scheme.encrypted_verifier_hash.clone());
    cipher.decrypt_in_place(&mut decrypted_hash)?;

    let Some(expected) = decrypted_hash.get(..calc_hash.len()) else {
        return Ok(None);
    };
    if ct_eq(&calc_hash, expected) {
        Ok(Some(key))
    } else {
        Ok(None)
    }
}
