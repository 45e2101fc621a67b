//! End-to-end sign/verify tests with the fixture key pairs.

use smime_signer::{smime_sign, smime_verify, HashAlgorithm, SigningConfig, SmimeError};

const ALICE_KEY: &str = include_str!("fixtures/alice_key.pem");
const ALICE_CERT: &str = include_str!("fixtures/alice_cert.pem");
const BOB_CERT: &str = include_str!("fixtures/bob_cert.pem");

const PLAINTEXT: &str = "This is some plaintext.";

fn sign_plaintext() -> String {
    smime_sign(PLAINTEXT, ALICE_KEY, ALICE_CERT, &SigningConfig::default())
        .expect("signing with the fixture pair succeeds")
}

#[test]
fn sign_and_verify_some_plaintext() {
    let signed = sign_plaintext();
    assert!(signed.contains(
        "Content-Type: application/pkcs7-mime; name=smime.p7m;\r\n smime-type=signed-data"
    ));
    assert!(signed.contains("Content-Transfer-Encoding: base64"));

    let report = smime_verify(&signed, ALICE_CERT).expect("verification is decidable");
    assert!(report.signature_verified);
    let signer = report.signer_certificate.expect("signer cert returned");
    let alice_der = smime_signer::domain::pem::decode(ALICE_CERT).unwrap().remove(0);
    assert_eq!(signer.as_der(), alice_der.as_slice());
}

#[test]
fn sign_and_verify_across_hash_algorithms() {
    for hash in [
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ] {
        let config = SigningConfig {
            hash_algorithm: hash,
            ..SigningConfig::default()
        };
        let signed = smime_sign(PLAINTEXT, ALICE_KEY, ALICE_CERT, &config).unwrap();
        let report = smime_verify(&signed, ALICE_CERT).unwrap();
        assert!(report.signature_verified, "hash {:?}", hash);
    }
}

#[test]
fn signing_is_deterministic() {
    // RSASSA-PKCS1-v1_5 is deterministic and no Date/Message-Id headers are
    // stamped, so identical inputs produce identical output.
    assert_eq!(sign_plaintext(), sign_plaintext());
}

#[test]
fn verify_rejects_wrong_certificate() {
    let signed = sign_plaintext();
    let report = smime_verify(&signed, BOB_CERT).expect("decidable verdict");
    assert!(!report.signature_verified);
    assert!(report.signer_certificate.is_none());
}

#[test]
fn tampered_body_never_verifies() {
    let signed = sign_plaintext();

    // Flip one base64 character in the middle of the body.
    let body_start = signed.find("\r\n\r\n").unwrap() + 4;
    let target = body_start + (signed.len() - body_start) / 2;
    let mut tampered: Vec<u8> = signed.clone().into_bytes();
    tampered[target] = if tampered[target] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();
    assert_ne!(tampered, signed);

    // Either a definite negative or a parse error is acceptable; a positive
    // verdict never is.
    match smime_verify(&tampered, ALICE_CERT) {
        Ok(report) => assert!(!report.signature_verified),
        Err(SmimeError::ParseError(_) | SmimeError::FormatError(_) | SmimeError::CryptoError(_)) => {}
        Err(other) => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn tampering_every_region_is_detected() {
    let signed = sign_plaintext();
    let body_start = signed.find("\r\n\r\n").unwrap() + 4;
    let span = signed.len() - body_start;

    // Probe positions spread across the whole base64 body (certificate,
    // content and signature regions all get hit).
    for step in 1..10 {
        let target = body_start + span * step / 10;
        let mut tampered: Vec<u8> = signed.clone().into_bytes();
        let original = tampered[target];
        if original == b'\r' || original == b'\n' || original == b'=' {
            continue;
        }
        tampered[target] = if original == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        match smime_verify(&tampered, ALICE_CERT) {
            Ok(report) => assert!(!report.signature_verified, "position {target}"),
            Err(_) => {}
        }
    }
}

#[test]
fn end_to_end_through_html_transport() {
    // Sign for an HTML body: the part gets wrapped in <pre> markers.
    let config = SigningConfig {
        wrap_html: true,
        ..SigningConfig::default()
    };
    let signed = smime_sign(PLAINTEXT, ALICE_KEY, ALICE_CERT, &config).unwrap();
    assert!(signed.starts_with("<pre>"));
    assert!(signed.ends_with("</pre>"));

    // The host client HTML-escapes the stored body and splices its own
    // wrapper markup around it.
    let escaped: String = signed
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    let hosted = format!("<div><span>{escaped}</span></div>");

    let report = smime_verify(&hosted, ALICE_CERT).unwrap();
    assert!(report.signature_verified);
}

#[test]
fn verify_tolerates_span_and_pre_wrapping_without_escaping() {
    let signed = sign_plaintext();
    let hosted = format!("<span><pre>{signed}</pre></span>");
    let report = smime_verify(&hosted, ALICE_CERT).unwrap();
    assert!(report.signature_verified);
}

#[test]
fn plain_body_is_not_an_smime_message() {
    let err = smime_verify("hello, no MIME here", ALICE_CERT).unwrap_err();
    match err {
        SmimeError::ParseError(msg) => assert!(msg.contains("Content-Type")),
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn multiple_certificate_blocks_decode_in_order() {
    let both = format!("{ALICE_CERT}\n{BOB_CERT}");
    let blocks = smime_signer::domain::pem::decode(&both).unwrap();
    assert_eq!(blocks.len(), 2);
    let alice = smime_signer::domain::pem::decode(ALICE_CERT).unwrap().remove(0);
    let bob = smime_signer::domain::pem::decode(BOB_CERT).unwrap().remove(0);
    assert_eq!(blocks[0], alice);
    assert_eq!(blocks[1], bob);
}

#[test]
fn signed_output_round_trips_unicode_content() {
    let text = "Grüße aus München — ¡hola! 你好\r\nSecond line.";
    let signed = smime_sign(text, ALICE_KEY, ALICE_CERT, &SigningConfig::default()).unwrap();
    let report = smime_verify(&signed, ALICE_CERT).unwrap();
    assert!(report.signature_verified);
}
