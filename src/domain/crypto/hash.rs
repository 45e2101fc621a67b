//! Hash algorithm domain type.
//!
//! Re-exports the core `HashAlgorithm` enumeration supporting SHA-256,
//! SHA-384, and SHA-512 for S/MIME signatures.

pub use crate::HashAlgorithm;
