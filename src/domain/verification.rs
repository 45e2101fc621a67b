//! Verification domain types for S/MIME signed messages.
//!
//! A report is only produced for messages that parsed and were checkable:
//! an undecidable or malformed input propagates as an error instead, so a
//! definite negative here is always distinguishable from "could not parse".

use crate::domain::crypto::SignerCertificate;

/// Result of verifying a signed S/MIME message.
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// True if the signature validates against the expected certificate.
    pub signature_verified: bool,
    /// The signer's certificate, present only on a positive verdict.
    pub signer_certificate: Option<SignerCertificate>,
}

impl VerificationReport {
    /// Positive verdict carrying the signer's certificate.
    #[must_use]
    pub fn verified(signer_certificate: SignerCertificate) -> Self {
        Self {
            signature_verified: true,
            signer_certificate: Some(signer_certificate),
        }
    }

    /// Definite negative: structurally valid but cryptographically failing,
    /// or signed by a different certificate than expected.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            signature_verified: false,
            signer_certificate: None,
        }
    }

    /// Overall success indicator.
    #[must_use]
    pub fn success(&self) -> bool {
        self.signature_verified
    }
}
