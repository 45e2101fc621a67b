//! `VerifyWorkflow`: high-level facade for verifying signed mail bodies.
//!
//! Scrubs the body text, locates and unwraps the S/MIME part, then delegates
//! to `SignedDataVerifier`; keeps symmetry with the sign workflow.

use crate::domain::crypto::SignerCertificate;
use crate::domain::verification::VerificationReport;
use crate::infra::error::SmimeResult;
use crate::services::body_scrubber;
use crate::services::mime_envelope;
use crate::services::verifier::SignedDataVerifier;

/// Orchestrates recovery and verification of a signed mail body.
pub struct VerifyWorkflow {
    svc: SignedDataVerifier,
}

impl Default for VerifyWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl VerifyWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            svc: SignedDataVerifier::new(),
        }
    }

    /// Verify a mail body (possibly HTML-escaped and tag-wrapped by the host
    /// client) against the expected signer certificate PEM.
    pub fn run(&self, body_text: &str, certificate_pem: &str) -> SmimeResult<VerificationReport> {
        let smime_section = body_scrubber::recover_smime_text(body_text)?;
        let cms_der = mime_envelope::unwrap_signed_data(&smime_section)?;
        let expected = SignerCertificate::from_pem(certificate_pem)?;
        self.svc.verify(&cms_der, &expected)
    }
}
