mod common;

use std::io::{Cursor, Read, Write};

use common::{compound_file_with_package, encrypt_package, plaintext, scheme_for};
use formula_offcrypto_standard::{CipherAlgorithm, HashAlgorithm, OffcryptoError, StandardDecryptor};

const SALT: [u8; 16] = [0x5A; 16];

#[test]
fn decrypts_encrypted_package_from_compound_file() {
    let scheme = scheme_for(
        CipherAlgorithm::Aes128,
        HashAlgorithm::Sha1,
        Some("ole"),
        &SALT,
        2_000,
    );
    let plain = plaintext(10_000);
    let package = encrypt_package(&scheme, Some("ole"), &plain);
    let ole_bytes = compound_file_with_package(&package);

    let mut ole = cfb::CompoundFile::open(Cursor::new(ole_bytes)).expect("open cfb");
    let mut session = StandardDecryptor::new(scheme.clone()).expect("session");
    assert!(session.verify_password(Some("ole")).expect("verify"));

    let mut from_ole = Vec::new();
    session
        .data_stream_from_compound_file(&mut ole)
        .expect("open EncryptedPackage")
        .read_to_end(&mut from_ole)
        .expect("read");

    let mut direct_session = StandardDecryptor::new(scheme).expect("session");
    assert!(direct_session.verify_password(Some("ole")).expect("verify"));
    let mut direct = Vec::new();
    direct_session
        .data_stream(Cursor::new(package))
        .expect("open")
        .read_to_end(&mut direct)
        .expect("read");

    assert_eq!(from_ole, plain);
    assert_eq!(from_ole, direct);
    assert_eq!(session.length().expect("length"), 10_000);
}

#[test]
fn missing_encrypted_package_stream_is_an_io_error() {
    let scheme = scheme_for(
        CipherAlgorithm::Aes128,
        HashAlgorithm::Sha1,
        Some("ole"),
        &SALT,
        10,
    );

    let mut ole = cfb::CompoundFile::create(Cursor::new(Vec::new())).expect("create cfb");
    ole.create_stream("WordDocument")
        .expect("create WordDocument")
        .write_all(b"not encrypted")
        .expect("write");

    let mut session = StandardDecryptor::new(scheme).expect("session");
    assert!(session.verify_password(Some("ole")).expect("verify"));
    assert!(matches!(
        session.data_stream_from_compound_file(&mut ole),
        Err(OffcryptoError::Io(_))
    ));
    assert!(session.length().is_err());
}
