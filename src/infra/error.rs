//! Error types for S/MIME signing and verification operations.
//! Error handling types and result definitions shared across the crate.

use thiserror::Error;

/// Result type for S/MIME operations
pub type SmimeResult<T> = Result<T, SmimeError>;

/// Error taxonomy for the signing/verification pipeline.
///
/// A structurally valid signature that simply does not match is NOT an error:
/// it is reported as a definite negative through
/// [`crate::domain::verification::VerificationReport`]. Only undecidable or
/// malformed inputs surface here, so callers can always tell "the signature
/// is wrong" apart from "I couldn't even parse this".
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SmimeError {
    #[error("PEM/base64 format error: {0}")]
    FormatError(String),

    #[error("CMS/MIME parse error: {0}")]
    ParseError(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::io::Error> for SmimeError {
    fn from(error: std::io::Error) -> Self {
        SmimeError::IoError(error.to_string())
    }
}

impl From<der::Error> for SmimeError {
    fn from(error: der::Error) -> Self {
        SmimeError::ParseError(error.to_string())
    }
}

impl From<base64::DecodeError> for SmimeError {
    fn from(error: base64::DecodeError) -> Self {
        SmimeError::FormatError(error.to_string())
    }
}

impl From<rsa::Error> for SmimeError {
    fn from(error: rsa::Error) -> Self {
        SmimeError::CryptoError(error.to_string())
    }
}

impl From<rsa::pkcs8::Error> for SmimeError {
    fn from(error: rsa::pkcs8::Error) -> Self {
        SmimeError::CryptoError(error.to_string())
    }
}

impl From<rsa::pkcs1::Error> for SmimeError {
    fn from(error: rsa::pkcs1::Error) -> Self {
        SmimeError::CryptoError(error.to_string())
    }
}
