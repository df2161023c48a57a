use std::fmt;
use std::io::{Read, Seek};

use crate::cipher::build_cipher;
use crate::key::DerivedKey;
use crate::provider::{CryptoProvider, RustCryptoProvider};
use crate::scheme::EncryptionScheme;
use crate::stream::{read_declared_length, DecryptedStream};
use crate::{verifier, OffcryptoError, ENCRYPTED_PACKAGE_STREAM};

/// Default maximum accepted `spinCount`.
///
/// Office writes 50,000; the cap bounds the CPU spent on an attacker-controlled header field.
pub const DEFAULT_MAX_SPIN_COUNT: u32 = 10_000_000;

/// Options for [`StandardDecryptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptOptions {
    /// Maximum accepted `spinCount`; larger schemes are rejected by [`StandardDecryptor::new`].
    pub max_spin_count: u32,
    /// Whether [`StandardDecryptor::data_stream`] tries [`crate::DEFAULT_PASSWORD`] when no
    /// password has been verified yet.
    pub try_default_password: bool,
}

impl Default for DecryptOptions {
    fn default() -> Self {
        Self {
            max_spin_count: DEFAULT_MAX_SPIN_COUNT,
            try_default_password: true,
        }
    }
}

#[derive(Clone)]
enum SessionState {
    Unverified,
    Verified { key: DerivedKey },
    StreamOpened { key: DerivedKey, length: u64 },
}

impl SessionState {
    fn key(&self) -> Option<&DerivedKey> {
        match self {
            SessionState::Unverified => None,
            SessionState::Verified { key } | SessionState::StreamOpened { key, .. } => Some(key),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Unverified => "Unverified",
            SessionState::Verified { .. } => "Verified",
            SessionState::StreamOpened { .. } => "StreamOpened",
        }
    }
}

/// Decryption session for one Standard-encrypted document.
///
/// The session moves through `Unverified → Verified → StreamOpened`. The first password that
/// verifies fixes the key; the first stream that opens fixes [`Self::length`]. Neither is cleared
/// afterwards. `Clone` yields an independent session carrying the same state.
///
/// ```no_run
/// use std::io::Read;
/// use formula_offcrypto_standard::{StandardDecryptor, EncryptionScheme};
///
/// # fn open(
/// #     scheme: EncryptionScheme,
/// #     payload: std::fs::File,
/// # ) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
/// let mut session = StandardDecryptor::new(scheme)?;
/// if !session.verify_password(Some("hunter2"))? {
///     return Err("wrong password".into());
/// }
/// let mut plaintext = Vec::new();
/// session.data_stream(payload)?.read_to_end(&mut plaintext)?;
/// # Ok(plaintext)
/// # }
/// ```
#[derive(Clone)]
pub struct StandardDecryptor<P = RustCryptoProvider> {
    scheme: EncryptionScheme,
    options: DecryptOptions,
    provider: P,
    state: SessionState,
}

impl StandardDecryptor<RustCryptoProvider> {
    /// Start a session with default options.
    ///
    /// Fails if the scheme is not usable for Standard decryption: non-ECB chaining, a key size
    /// inconsistent with the cipher, or a spin count above [`DEFAULT_MAX_SPIN_COUNT`].
    pub fn new(scheme: EncryptionScheme) -> Result<Self, OffcryptoError> {
        Self::with_options(scheme, DecryptOptions::default())
    }

    pub fn with_options(
        scheme: EncryptionScheme,
        options: DecryptOptions,
    ) -> Result<Self, OffcryptoError> {
        Self::with_provider(scheme, options, RustCryptoProvider)
    }
}

impl<P: CryptoProvider> StandardDecryptor<P> {
    /// Start a session whose hashing and block decryption go through `provider`.
    pub fn with_provider(
        scheme: EncryptionScheme,
        options: DecryptOptions,
        provider: P,
    ) -> Result<Self, OffcryptoError> {
        scheme.validate(options.max_spin_count)?;
        Ok(Self {
            scheme,
            options,
            provider,
            state: SessionState::Unverified,
        })
    }

    pub fn scheme(&self) -> &EncryptionScheme {
        &self.scheme
    }

    pub fn options(&self) -> &DecryptOptions {
        &self.options
    }

    /// True once some password has verified.
    pub fn is_verified(&self) -> bool {
        self.state.key().is_some()
    }

    /// Check a candidate password. `None` tries [`crate::DEFAULT_PASSWORD`].
    ///
    /// Returns `Ok(false)` for a wrong password, leaving the session unchanged. On the first
    /// success the derived key is retained; later successes return `true` without replacing it.
    pub fn verify_password(&mut self, password: Option<&str>) -> Result<bool, OffcryptoError> {
        match verifier::verify_password(&self.provider, &self.scheme, password)? {
            Some(key) => {
                log::debug!(
                    "Standard encryption password verified ({} / {:?})",
                    self.scheme.cipher_algorithm.name(),
                    self.scheme.hash_algorithm
                );
                if let SessionState::Unverified = self.state {
                    self.state = SessionState::Verified { key };
                }
                Ok(true)
            }
            None => {
                log::debug!("Standard encryption password rejected");
                Ok(false)
            }
        }
    }

    /// Open the decrypted view of an `EncryptedPackage` payload.
    ///
    /// `raw` must be positioned at the 8-byte size prefix. If no password has verified yet and
    /// [`DecryptOptions::try_default_password`] is set, the default password is tried first.
    ///
    /// The returned stream yields exactly the declared number of plaintext bytes. Each call needs
    /// a fresh raw handle; pass `&mut reader` to keep ownership of it.
    pub fn data_stream<R: Read>(
        &mut self,
        mut raw: R,
    ) -> Result<DecryptedStream<R>, OffcryptoError> {
        let declared_len = read_declared_length(&mut raw)?;

        if !self.is_verified() && self.options.try_default_password {
            log::warn!("no password verified; trying the default Office password");
            self.verify_password(None)?;
        }

        let key = self.state.key().ok_or(OffcryptoError::PasswordRequired)?;
        let cipher = build_cipher(&self.provider, key, &self.scheme)?;
        let stream = DecryptedStream::new(raw, cipher, declared_len)?;

        self.record_length(declared_len);
        Ok(stream)
    }

    /// Open the `EncryptedPackage` stream of `ole` and decrypt it like [`Self::data_stream`].
    pub fn data_stream_from_compound_file<F: Read + Seek>(
        &mut self,
        ole: &mut cfb::CompoundFile<F>,
    ) -> Result<DecryptedStream<cfb::Stream<F>>, OffcryptoError> {
        let stream = match ole.open_stream(ENCRYPTED_PACKAGE_STREAM) {
            Ok(stream) => stream,
            Err(_) => ole.open_stream(format!("/{ENCRYPTED_PACKAGE_STREAM}"))?,
        };
        self.data_stream(stream)
    }

    /// Plaintext length declared by the first successfully opened data stream.
    ///
    /// Returns [`OffcryptoError::StreamNotOpened`] until [`Self::data_stream`] has succeeded.
    pub fn length(&self) -> Result<u64, OffcryptoError> {
        match self.state {
            SessionState::StreamOpened { length, .. } => Ok(length),
            _ => Err(OffcryptoError::StreamNotOpened),
        }
    }

    fn record_length(&mut self, length: u64) {
        let state = std::mem::replace(&mut self.state, SessionState::Unverified);
        self.state = match state {
            SessionState::Verified { key } => SessionState::StreamOpened { key, length },
            SessionState::StreamOpened {
                key,
                length: recorded,
            } => {
                if recorded != length {
                    log::warn!(
                        "EncryptedPackage declares {length} bytes; keeping recorded {recorded}"
                    );
                }
                SessionState::StreamOpened {
                    key,
                    length: recorded,
                }
            }
            SessionState::Unverified => SessionState::Unverified,
        };
    }
}

impl<P> fmt::Debug for StandardDecryptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardDecryptor")
            .field("cipher", &self.scheme.cipher_algorithm)
            .field("hash", &self.scheme.hash_algorithm)
            .field("spin_count", &self.scheme.spin_count)
            .field("options", &self.options)
            .field("state", &self.state.name())
            .finish_non_exhaustive()
    }
}
