#![no_main]

use std::io::{Cursor, Read};

use libfuzzer_sys::fuzz_target;

use formula_offcrypto_standard::{CipherAlgorithm, EncryptionScheme, StandardDecryptor};

/// Bound the raw payload so a single input cannot drive large reads.
const MAX_INPUT_BYTES: usize = 256 * 1024;
const HEADER_LEN: usize = 2 + 16 + 16 + 32;

fuzz_target!(|data: &[u8]| {
    if data.len() < HEADER_LEN || data.len() > MAX_INPUT_BYTES {
        return;
    }

    let (header, raw) = data.split_at(HEADER_LEN);
    let cipher = match header[0] % 3 {
        0 => CipherAlgorithm::Aes128,
        1 => CipherAlgorithm::Aes192,
        _ => CipherAlgorithm::Aes256,
    };
    let mut scheme = EncryptionScheme::standard_aes(
        cipher,
        header[2..18].to_vec(),
        header[18..34].to_vec(),
        header[34..66].to_vec(),
    );
    // Keep derivation cheap; the spin count only changes how long hashing takes.
    scheme.spin_count = u32::from(header[1] % 4);

    let Ok(mut session) = StandardDecryptor::new(scheme) else {
        return;
    };
    let _ = session.verify_password(Some("fuzz"));

    if let Ok(mut stream) = session.data_stream(Cursor::new(raw)) {
        let mut buf = [0u8; 4096];
        while let Ok(n) = stream.read(&mut buf) {
            if n == 0 {
                break;
            }
        }
        let _ = session.length();
    }
});
