//! Cryptographic verification of CMS `SignedData`.
//!
//! Sequences the structural parse, certificate lookup and RSA signature
//! check, and folds the outcome into a domain `VerificationReport`. The
//! supplied certificate names the *expected* signer: a cryptographically
//! valid signature made by any other certificate is reported as a definite
//! negative, not a success.

use rsa::pkcs1v15;
use rsa::signature::Verifier;
use sha2::{Sha256, Sha384, Sha512};

use crate::domain::constants;
use crate::domain::crypto::SignerCertificate;
use crate::domain::verification::VerificationReport;
use crate::infra::error::{SmimeError, SmimeResult};
use crate::services::signed_data_parser::{parse_content_info, ParsedSignerInfo};
use crate::HashAlgorithm;

/// Service performing cryptographic verification of a CMS SignedData blob.
pub struct SignedDataVerifier;

impl Default for SignedDataVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignedDataVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verify `cms_der` against the expected signer certificate.
    ///
    /// Returns a definite positive or negative report for checkable input;
    /// malformed structure, unsupported algorithms or a signer with no
    /// candidate certificate propagate as errors instead.
    pub fn verify(
        &self,
        cms_der: &[u8],
        expected_certificate: &SignerCertificate,
    ) -> SmimeResult<VerificationReport> {
        let parsed = parse_content_info(cms_der)?;

        // Out-of-band certificate joins the candidate set unless the message
        // already carries it.
        let mut certificates = parsed.certificates;
        if !certificates
            .iter()
            .any(|c| c.as_der() == expected_certificate.as_der())
        {
            certificates.push(expected_certificate.clone());
        }

        let signer = parsed
            .signers
            .first()
            .ok_or_else(|| SmimeError::ParseError("no SignerInfo present".to_string()))?;
        if parsed.signers.len() > 1 {
            log::warn!(
                "message carries {} signers; verifying the first only",
                parsed.signers.len()
            );
        }

        let signer_certificate = certificates
            .iter()
            .find(|c| c.matches_issuer_serial(&signer.issuer_der, &signer.serial))
            .ok_or_else(|| {
                SmimeError::CryptoError(
                    "no certificate matches the signer's issuer and serial number".to_string(),
                )
            })?;

        check_signature_algorithm(signer)?;

        let public_key = signer_certificate.rsa_public_key()?;
        // A malformed signature value (e.g. wrong length after tampering) is
        // a definite negative, the same as a mismatching one.
        let signature = pkcs1v15::Signature::try_from(signer.signature.as_slice());
        let signature_ok = match (signature, signer.digest_algorithm) {
            (Err(_), _) => false,
            (Ok(sig), HashAlgorithm::Sha256) => pkcs1v15::VerifyingKey::<Sha256>::new(public_key)
                .verify(&parsed.econtent, &sig)
                .is_ok(),
            (Ok(sig), HashAlgorithm::Sha384) => pkcs1v15::VerifyingKey::<Sha384>::new(public_key)
                .verify(&parsed.econtent, &sig)
                .is_ok(),
            (Ok(sig), HashAlgorithm::Sha512) => pkcs1v15::VerifyingKey::<Sha512>::new(public_key)
                .verify(&parsed.econtent, &sig)
                .is_ok(),
        };

        if !signature_ok {
            log::info!("signature value does not verify against the signer certificate");
            return Ok(VerificationReport::failed());
        }

        if signer_certificate.as_der() != expected_certificate.as_der() {
            log::info!("signature is valid but made by a different certificate than expected");
            return Ok(VerificationReport::failed());
        }

        Ok(VerificationReport::verified(signer_certificate.clone()))
    }
}

/// Check the declared signature algorithm is RSASSA-PKCS1-v1_5 and, when the
/// OID pins a hash, that it agrees with the declared digest algorithm.
fn check_signature_algorithm(signer: &ParsedSignerInfo) -> SmimeResult<()> {
    let oid = signer.signature_algorithm_oid.as_str();
    let pinned_hash = match oid {
        constants::OID_RSA_ENCRYPTION => None,
        constants::OID_SHA256_WITH_RSA => Some(HashAlgorithm::Sha256),
        constants::OID_SHA384_WITH_RSA => Some(HashAlgorithm::Sha384),
        constants::OID_SHA512_WITH_RSA => Some(HashAlgorithm::Sha512),
        other => {
            return Err(SmimeError::CryptoError(format!(
                "unsupported signature algorithm {other}"
            )));
        }
    };
    if let Some(hash) = pinned_hash {
        if hash != signer.digest_algorithm {
            return Err(SmimeError::CryptoError(format!(
                "signature algorithm {oid} disagrees with digest algorithm {}",
                signer.digest_algorithm.as_str()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crypto::CmsSignature;
    use crate::services::signed_data_builder::SignedDataBuilder;
    use crate::SignatureAlgorithm;

    const ALICE_CERT_PEM: &str = include_str!("../../tests/fixtures/alice_cert.pem");
    const BOB_CERT_PEM: &str = include_str!("../../tests/fixtures/bob_cert.pem");

    #[test]
    fn garbage_signature_is_a_definite_negative() {
        // Structurally valid message with a nonsense signature value: the
        // verifier must answer false rather than erroring out.
        let alice = SignerCertificate::from_pem(ALICE_CERT_PEM).unwrap();
        let signature = CmsSignature::new(
            SignatureAlgorithm::RsaPkcs1v15,
            crate::HashAlgorithm::Sha256,
            vec![0x42; 256],
        );
        let cms = SignedDataBuilder::new(crate::HashAlgorithm::Sha256)
            .build(b"some text", &alice, &signature)
            .unwrap();
        let report = SignedDataVerifier::new()
            .verify(cms.as_der(), &alice)
            .unwrap();
        assert!(!report.signature_verified);
        assert!(report.signer_certificate.is_none());
    }

    #[test]
    fn unparseable_blob_is_an_error_not_a_negative() {
        let bob = SignerCertificate::from_pem(BOB_CERT_PEM).unwrap();
        let err = SignedDataVerifier::new().verify(&[0x00, 0x01], &bob);
        assert!(err.is_err());
    }
}
