//! Unit tests for the smime-signer library surface.

use crate::*;

#[test]
fn test_signing_config_defaults() {
    let config = SigningConfig::default();
    assert!(matches!(config.hash_algorithm, HashAlgorithm::Sha256));
    assert!(matches!(
        config.signature_algorithm,
        SignatureAlgorithm::RsaPkcs1v15
    ));
    assert!(!config.wrap_html);
    assert_eq!(config.headers.from, "sender@example.com");
    assert_eq!(config.headers.to, "recipient@example.com");
}

#[test]
fn test_hash_algorithm_properties() {
    assert_eq!(HashAlgorithm::Sha256.as_str(), "sha256");
    assert_eq!(HashAlgorithm::Sha256.digest_size(), 32);
    assert_eq!(HashAlgorithm::Sha384.digest_size(), 48);
    assert_eq!(HashAlgorithm::Sha512.digest_size(), 64);
    assert_eq!(HashAlgorithm::Sha256.oid(), "2.16.840.1.101.3.4.2.1");
    assert_eq!(
        HashAlgorithm::Sha256.rsa_signature_oid(),
        "1.2.840.113549.1.1.11"
    );
}

#[test]
fn test_hash_algorithm_parsing() {
    assert_eq!(
        "sha256".parse::<HashAlgorithm>().unwrap(),
        HashAlgorithm::Sha256
    );
    assert_eq!(
        "SHA-384".parse::<HashAlgorithm>().unwrap(),
        HashAlgorithm::Sha384
    );
    assert!("md5".parse::<HashAlgorithm>().is_err());
}

#[test]
fn test_hash_algorithm_oid_lookup() {
    for algo in [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ] {
        assert_eq!(HashAlgorithm::from_oid(algo.oid()), Some(algo));
    }
    assert_eq!(HashAlgorithm::from_oid("1.3.14.3.2.26"), None);
}

#[test]
fn test_sign_with_invalid_pem_inputs() {
    let result = smime_sign(
        "hello",
        "not a pem key",
        "not a pem cert",
        &SigningConfig::default(),
    );
    match result.unwrap_err() {
        SmimeError::FormatError(_) => {}
        other => panic!("Expected FormatError, got: {other:?}"),
    }
}

#[test]
fn test_verify_with_non_smime_body() {
    let result = smime_verify("just a plain email body", "irrelevant");
    match result.unwrap_err() {
        SmimeError::ParseError(msg) => assert!(msg.contains("Content-Type")),
        other => panic!("Expected ParseError, got: {other:?}"),
    }
}
