//! Streaming decryption of an `EncryptedPackage` payload.
//!
//! The payload is an 8-byte little-endian plaintext length `L` followed by block-padded ECB
//! ciphertext. [`DecryptedStream`] bounds the raw stream to the ciphertext needed for `L` bytes,
//! decrypts lazily as the caller pulls, and yields exactly `L` bytes.

use std::fmt;
use std::io::{self, Read};

use zeroize::Zeroizing;

use crate::provider::CipherSession;
use crate::OffcryptoError;

/// Size of the plaintext length prefix at the start of the payload.
pub const SIZE_PREFIX_LEN: usize = 8;

const READ_CHUNK_LEN: usize = 0x1000;

/// Read the 8-byte little-endian declared plaintext length.
pub fn read_declared_length<R: Read + ?Sized>(raw: &mut R) -> Result<u64, OffcryptoError> {
    let mut prefix = [0u8; SIZE_PREFIX_LEN];
    raw.read_exact(&mut prefix).map_err(|err| {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            OffcryptoError::Truncated {
                context: "EncryptedPackage size prefix",
            }
        } else {
            OffcryptoError::Io(err)
        }
    })?;
    Ok(u64::from_le_bytes(prefix))
}

/// Ciphertext bytes needed to recover `declared_len` plaintext bytes: `ceil(L / B) * B`.
///
/// Returns `None` for a zero block size or when the result does not fit in a `u64`.
pub fn ciphertext_len(declared_len: u64, block_size: usize) -> Option<u64> {
    let block_size = u64::try_from(block_size).ok().filter(|b| *b > 0)?;
    declared_len.div_ceil(block_size).checked_mul(block_size)
}

/// Pull-based block decryptor over a ciphertext reader.
///
/// Only whole blocks are decrypted. A trailing partial block is reported as `InvalidData` once
/// the caller actually asks for bytes past the last whole block.
struct CipherReader<R> {
    inner: R,
    cipher: Box<dyn CipherSession>,
    // buf[pos..plain_end] is decrypted and unread, buf[plain_end..data_end] is ciphertext that
    // does not yet form a whole block.
    buf: Zeroizing<Vec<u8>>,
    pos: usize,
    plain_end: usize,
    data_end: usize,
    eof: bool,
}

impl<R: Read> CipherReader<R> {
    fn new(inner: R, cipher: Box<dyn CipherSession>) -> Self {
        let block_size = cipher.block_size().max(1);
        let chunk_len = READ_CHUNK_LEN.max(block_size) / block_size * block_size;
        Self {
            inner,
            cipher,
            buf: Zeroizing::new(vec![0u8; chunk_len]),
            pos: 0,
            plain_end: 0,
            data_end: 0,
            eof: false,
        }
    }

    /// Decrypt the next run of whole blocks. Returns `false` at a clean end of ciphertext.
    fn fill(&mut self) -> io::Result<bool> {
        let block_size = self.cipher.block_size().max(1);

        self.buf.copy_within(self.plain_end..self.data_end, 0);
        self.data_end -= self.plain_end;
        self.pos = 0;
        self.plain_end = 0;

        while self.data_end < block_size && !self.eof {
            match self.inner.read(&mut self.buf[self.data_end..]) {
                Ok(0) => self.eof = true,
                Ok(n) => self.data_end += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }

        let aligned = self.data_end - self.data_end % block_size;
        if aligned == 0 {
            if self.data_end == 0 {
                return Ok(false);
            }
            return Err(OffcryptoError::InvalidCiphertextLength {
                len: self.data_end,
                block_size,
            }
            .into());
        }

        self.cipher.decrypt_in_place(&mut self.buf[..aligned])?;
        self.plain_end = aligned;
        Ok(true)
    }
}

impl<R: Read> Read for CipherReader<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos == self.plain_end && !self.fill()? {
            return Ok(0);
        }
        let take = out.len().min(self.plain_end - self.pos);
        out[..take].copy_from_slice(&self.buf[self.pos..self.pos + take]);
        self.pos += take;
        Ok(take)
    }
}

/// Decrypted view over an `EncryptedPackage` payload.
///
/// Yields exactly [`Self::declared_len`] bytes, then end-of-stream. Forward-only and not
/// restartable; open a new stream from a fresh raw handle to read again. A payload that ends
/// before the declared length is reported as `UnexpectedEof`.
pub struct DecryptedStream<R> {
    inner: CipherReader<io::Take<R>>,
    declared_len: u64,
    remaining: u64,
}

impl<R: Read> DecryptedStream<R> {
    /// `raw` must be positioned just past the size prefix.
    pub(crate) fn new(
        raw: R,
        cipher: Box<dyn CipherSession>,
        declared_len: u64,
    ) -> Result<Self, OffcryptoError> {
        let cipher_len = ciphertext_len(declared_len, cipher.block_size()).ok_or(
            OffcryptoError::EncryptedPackageSizeOverflow {
                total_size: declared_len,
            },
        )?;
        log::debug!(
            "opened EncryptedPackage: {declared_len} plaintext bytes, {cipher_len} ciphertext"
        );
        Ok(Self {
            inner: CipherReader::new(raw.take(cipher_len), cipher),
            declared_len,
            remaining: declared_len,
        })
    }

    /// Plaintext length from the payload's size prefix.
    pub fn declared_len(&self) -> u64 {
        self.declared_len
    }

    /// Plaintext bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Give back the raw payload reader, positioned wherever decryption stopped.
    pub fn into_inner(self) -> R {
        self.inner.inner.into_inner()
    }
}

impl<R: Read> Read for DecryptedStream<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() || self.remaining == 0 {
            return Ok(0);
        }
        let max = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(out.len());
        let n = self.inner.read(&mut out[..max])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "EncryptedPackage ciphertext ended {} bytes before the declared length {}",
                    self.remaining, self.declared_len
                ),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl<R> fmt::Debug for DecryptedStream<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptedStream")
            .field("declared_len", &self.declared_len)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
