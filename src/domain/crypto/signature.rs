use std::fmt;

use crate::{HashAlgorithm, SignatureAlgorithm};

/// Wrapper over a CMS signature value: the raw signature octets paired with
/// the algorithms that produced them. For RSASSA-PKCS1-v1_5 the bytes are the
/// padded modular exponentiation output, exactly what goes into the
/// SignerInfo `signatureValue` OCTET STRING.
#[derive(Clone, Eq, PartialEq)]
pub struct CmsSignature {
    algorithm: SignatureAlgorithm,
    hash: HashAlgorithm,
    bytes: Box<[u8]>,
}

impl CmsSignature {
    #[must_use]
    pub fn new(algorithm: SignatureAlgorithm, hash: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            algorithm,
            hash,
            bytes: bytes.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for CmsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CmsSignature(algorithm={:?}, hash={:?}, len={})",
            self.algorithm,
            self.hash,
            self.bytes.len()
        )
    }
}
