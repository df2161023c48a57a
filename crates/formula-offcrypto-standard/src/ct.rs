use subtle::ConstantTimeEq;

/// Constant-time byte slice equality.
///
/// The verifier check compares a digest computed from a candidate password against bytes
/// decrypted with that password's key. An early-exit compare there would report, per guess, how
/// many leading digest bytes matched.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    bool::from(a.ct_eq(b))
}
