//! CMS `SignedData` domain wrapper.
//! Newtype around the DER encoding of a complete ContentInfo/SignedData.

use std::fmt;

pub struct CmsSignedData {
    der: Vec<u8>,
}

impl CmsSignedData {
    #[must_use]
    pub fn from_der(der: Vec<u8>) -> Self {
        Self { der }
    }
    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.der.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.der.is_empty()
    }
    #[must_use]
    pub fn into_der(self) -> Vec<u8> {
        self.der
    }
}

impl fmt::Debug for CmsSignedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CmsSignedData(len={})", self.der.len())
    }
}
