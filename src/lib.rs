//! S/MIME Signer Library
//!
//! A self-contained library for S/MIME message signing and verification
//! built on CMS (PKCS#7) `SignedData`. Covers the PEM codec, the minimal
//! DER/ASN.1 structures CMS needs, signing with RSASSA-PKCS1-v1_5, and
//! verification including recovery of the S/MIME section from an
//! HTML-capable mail body.

pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

#[cfg(test)]
mod lib_tests;

pub use domain::cms::CmsSignedData;
pub use domain::crypto::{CmsSignature, SignerCertificate};
pub use domain::verification::VerificationReport;
pub use infra::error::{SmimeError, SmimeResult};
pub use pipelines::{SignWorkflow, VerifyWorkflow};
pub use services::mime_envelope::{wrap_for_html_body, MimeHeaders};

/// Main signing configuration
#[derive(Debug, Clone)]
pub struct SigningConfig {
    /// Hash algorithm for the content digest
    pub hash_algorithm: HashAlgorithm,
    /// Signature scheme (RSASSA-PKCS1-v1_5)
    pub signature_algorithm: SignatureAlgorithm,
    /// From/To/Subject headers stamped onto the signed part
    pub headers: MimeHeaders,
    /// Whether to wrap the output in `<pre>` markers for an HTML body
    pub wrap_html: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::Sha256,
            signature_algorithm: SignatureAlgorithm::RsaPkcs1v15,
            headers: MimeHeaders::default(),
            wrap_html: false,
        }
    }
}

/// Supported hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Digest algorithm OID (dotted decimal).
    #[must_use]
    pub fn oid(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => domain::constants::OID_SHA256,
            HashAlgorithm::Sha384 => domain::constants::OID_SHA384,
            HashAlgorithm::Sha512 => domain::constants::OID_SHA512,
        }
    }

    /// shaNNNWithRSAEncryption OID for this digest.
    #[must_use]
    pub fn rsa_signature_oid(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => domain::constants::OID_SHA256_WITH_RSA,
            HashAlgorithm::Sha384 => domain::constants::OID_SHA384_WITH_RSA,
            HashAlgorithm::Sha512 => domain::constants::OID_SHA512_WITH_RSA,
        }
    }

    /// Look up a digest algorithm by its OID.
    #[must_use]
    pub fn from_oid(oid: &str) -> Option<Self> {
        match oid {
            domain::constants::OID_SHA256 => Some(HashAlgorithm::Sha256),
            domain::constants::OID_SHA384 => Some(HashAlgorithm::Sha384),
            domain::constants::OID_SHA512 => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = SmimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha384" | "sha-384" => Ok(HashAlgorithm::Sha384),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            other => Err(SmimeError::ConfigurationError(format!(
                "unknown hash algorithm: {other}"
            ))),
        }
    }
}

/// Supported signature schemes.
///
/// RSASSA-PKCS1-v1_5 is deterministic; a randomized scheme (PSS) is never
/// silently substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    #[default]
    RsaPkcs1v15,
}

impl SignatureAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaPkcs1v15 => "RSASSA-PKCS1-v1_5",
        }
    }
}

/// Sign `text` into an S/MIME part using a PEM private key and certificate.
///
/// Convenience wrapper over [`SignWorkflow`]; see [`SigningConfig`] for the
/// knobs. With `wrap_html` set the output is additionally wrapped in literal
/// `<pre>` markers for HTML-bodied transports.
pub fn smime_sign(
    text: &str,
    private_key_pem: &str,
    certificate_pem: &str,
    config: &SigningConfig,
) -> SmimeResult<String> {
    let workflow =
        SignWorkflow::new(config.hash_algorithm).with_headers(config.headers.clone());
    let signed = workflow.sign_text(text, private_key_pem, certificate_pem)?;
    Ok(if config.wrap_html {
        wrap_for_html_body(&signed)
    } else {
        signed
    })
}

/// Verify a mail body against the expected signer certificate PEM.
///
/// The body may be HTML-escaped and wrapped in host-injected markup; it is
/// scrubbed before the S/MIME section is located. A definite negative is a
/// normal `Ok` return with `signature_verified == false`; an unrecoverable
/// body is an error.
pub fn smime_verify(body_text: &str, certificate_pem: &str) -> SmimeResult<VerificationReport> {
    VerifyWorkflow::new().run(body_text, certificate_pem)
}
