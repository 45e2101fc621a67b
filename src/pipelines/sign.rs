//! `SignWorkflow` orchestrates core signing steps.
//!
//! text + private key PEM + certificate PEM -> signed S/MIME part.
//! Uses service layer components for a modular, testable signing pipeline.

use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Sha256, Sha384, Sha512};

use crate::domain::crypto::{CmsSignature, SignerCertificate};
use crate::domain::pem;
use crate::infra::error::{SmimeError, SmimeResult};
use crate::services::mime_envelope::{self, MimeHeaders};
use crate::services::signed_data_builder::SignedDataBuilder;
use crate::{HashAlgorithm, SignatureAlgorithm};

pub struct SignWorkflow {
    hash_algorithm: HashAlgorithm,
    headers: MimeHeaders,
}

impl SignWorkflow {
    #[must_use]
    pub fn new(hash_algorithm: HashAlgorithm) -> Self {
        Self {
            hash_algorithm,
            headers: MimeHeaders::default(),
        }
    }

    /// Override the From/To/Subject headers stamped onto the part.
    #[must_use]
    pub fn with_headers(mut self, headers: MimeHeaders) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Sign a text and wrap the resulting CMS blob into an S/MIME part.
    ///
    /// The eContent is the exact UTF-8 bytes of `text`; the signature is
    /// RSASSA-PKCS1-v1_5 over those bytes (deterministic — no randomized
    /// scheme is substituted).
    pub fn sign_text(
        &self,
        text: &str,
        private_key_pem: &str,
        certificate_pem: &str,
    ) -> SmimeResult<String> {
        log::info!(
            "Signing {} bytes of text with {}",
            text.len(),
            self.hash_algorithm.as_str()
        );

        // 1. Certificate: PEM -> DER -> issuer/serial/public key
        let cert_der = first_pem_block(certificate_pem, "certificate")?;
        let certificate = SignerCertificate::from_der(cert_der)?;

        // 2. Private key: PEM (PKCS#8) -> RSA signing key
        let key_der = first_pem_block(private_key_pem, "private key")?;
        let private_key = RsaPrivateKey::from_pkcs8_der(&key_der).map_err(|e| {
            SmimeError::CryptoError(format!("failed to import PKCS#8 private key: {e}"))
        })?;

        // 3. Sign the exact content bytes
        let econtent = text.as_bytes();
        let signature_bytes = match self.hash_algorithm {
            HashAlgorithm::Sha256 => SigningKey::<Sha256>::new(private_key)
                .try_sign(econtent)
                .map(|s| s.to_vec()),
            HashAlgorithm::Sha384 => SigningKey::<Sha384>::new(private_key)
                .try_sign(econtent)
                .map(|s| s.to_vec()),
            HashAlgorithm::Sha512 => SigningKey::<Sha512>::new(private_key)
                .try_sign(econtent)
                .map(|s| s.to_vec()),
        }
        .map_err(|e| SmimeError::CryptoError(format!("signature computation failed: {e}")))?;
        let signature = CmsSignature::new(
            SignatureAlgorithm::RsaPkcs1v15,
            self.hash_algorithm,
            signature_bytes,
        );

        // 4. Assemble the CMS structure and the MIME envelope
        let builder = SignedDataBuilder::new(self.hash_algorithm);
        let signed_data = builder.build(econtent, &certificate, &signature)?;
        Ok(mime_envelope::wrap_signed_data(&signed_data, &self.headers))
    }
}

fn first_pem_block(text: &str, what: &str) -> SmimeResult<Vec<u8>> {
    let blocks = pem::decode(text)?;
    blocks.into_iter().next().ok_or_else(|| {
        SmimeError::FormatError(format!("no PEM block found in {what} input"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_workflow() {
        let wf = SignWorkflow::new(HashAlgorithm::Sha256);
        assert!(matches!(wf.hash_algorithm(), HashAlgorithm::Sha256));
    }

    #[test]
    fn missing_pem_block_is_a_format_error() {
        let wf = SignWorkflow::new(HashAlgorithm::Sha256);
        let err = wf.sign_text("hi", "not a key", "not a cert").unwrap_err();
        assert!(matches!(err, SmimeError::FormatError(_)));
    }

    // End-to-end sign/verify coverage lives in tests/sign_verify.rs
}
