//! Signer certificate wrapper.
//!
//! Owns the certificate DER and exposes the narrow set of fields CMS
//! SignedData needs: the raw issuer Name encoding, the serial number
//! (arbitrary precision, raw INTEGER content), the RSA public key, and the
//! validity window strings. Field extraction walks the DER tree directly so
//! issuer/serial stay byte-identical to what the signer embedded.

use std::fmt;

use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::RsaPublicKey;

use crate::domain::asn1::{self, DerNode};
use crate::domain::pem;
use crate::infra::error::{SmimeError, SmimeResult};

#[derive(Clone, PartialEq, Eq)]
pub struct SignerCertificate {
    der: Box<[u8]>,
    issuer_der: Vec<u8>,
    serial: Vec<u8>,
    spki_algorithm: String,
    public_key_der: Vec<u8>,
    not_before: String,
    not_after: String,
}

impl SignerCertificate {
    /// Parse a DER-encoded X.509 certificate.
    pub fn from_der(der: Vec<u8>) -> SmimeResult<Self> {
        let root = DerNode::parse(&der)
            .map_err(|e| SmimeError::ParseError(format!("certificate: {e}")))?;
        if !root.is_universal(asn1::TAG_SEQUENCE) {
            return Err(SmimeError::ParseError(
                "certificate is not a SEQUENCE".to_string(),
            ));
        }
        let tbs = root.child(0)?;
        if !tbs.is_universal(asn1::TAG_SEQUENCE) {
            return Err(SmimeError::ParseError(
                "tbsCertificate is not a SEQUENCE".to_string(),
            ));
        }

        // version [0] is optional; when absent the fields shift up by one.
        let base = usize::from(tbs.child(0)?.is_context(0));

        let serial_node = tbs.child(base)?;
        if !serial_node.is_universal(asn1::TAG_INTEGER) {
            return Err(SmimeError::ParseError(
                "certificate serial number is not an INTEGER".to_string(),
            ));
        }
        let issuer = tbs.child(base + 2)?;
        let validity = tbs.child(base + 3)?;
        let spki = tbs.child(base + 5)?;

        let spki_algorithm = spki.child(0)?.child(0)?.oid_string()?;
        let key_bits = spki.child(1)?;
        if !key_bits.is_universal(asn1::TAG_BIT_STRING) || key_bits.content().is_empty() {
            return Err(SmimeError::ParseError(
                "subjectPublicKey is not a BIT STRING".to_string(),
            ));
        }
        if key_bits.content()[0] != 0 {
            return Err(SmimeError::ParseError(
                "subjectPublicKey has unused bits".to_string(),
            ));
        }

        Ok(Self {
            issuer_der: issuer.to_der(),
            serial: serial_node.content().to_vec(),
            spki_algorithm,
            public_key_der: key_bits.content()[1..].to_vec(),
            not_before: time_string(validity.child(0)?)?,
            not_after: time_string(validity.child(1)?)?,
            der: der.into_boxed_slice(),
        })
    }

    /// Parse the first PEM block of `text` as a certificate.
    pub fn from_pem(text: &str) -> SmimeResult<Self> {
        let blocks = pem::decode(text)?;
        let der = blocks
            .into_iter()
            .next()
            .ok_or_else(|| SmimeError::FormatError("no PEM block found".to_string()))?;
        Self::from_der(der)
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Raw DER encoding of the issuer Name, as embedded in the certificate.
    #[must_use]
    pub fn issuer_der(&self) -> &[u8] {
        &self.issuer_der
    }

    /// Serial number as raw INTEGER content octets (big-endian, may exceed
    /// machine word range).
    #[must_use]
    pub fn serial_der(&self) -> &[u8] {
        &self.serial
    }

    #[must_use]
    pub fn not_before(&self) -> &str {
        &self.not_before
    }

    #[must_use]
    pub fn not_after(&self) -> &str {
        &self.not_after
    }

    /// True when this certificate is identified by the given
    /// IssuerAndSerialNumber pair.
    #[must_use]
    pub fn matches_issuer_serial(&self, issuer_der: &[u8], serial: &[u8]) -> bool {
        self.issuer_der == issuer_der && self.serial == serial
    }

    /// Decode the subject public key as an RSA key.
    pub fn rsa_public_key(&self) -> SmimeResult<RsaPublicKey> {
        if self.spki_algorithm != crate::domain::constants::OID_RSA_ENCRYPTION {
            return Err(SmimeError::CryptoError(format!(
                "unsupported public key algorithm {}",
                self.spki_algorithm
            )));
        }
        RsaPublicKey::from_pkcs1_der(&self.public_key_der).map_err(|e| {
            SmimeError::CryptoError(format!("failed to decode RSA public key: {e}"))
        })
    }

    /// Serial number rendered as lowercase hex for display.
    #[must_use]
    pub fn serial_hex(&self) -> String {
        self.serial
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    }
}

fn time_string(node: &DerNode) -> SmimeResult<String> {
    if !node.is_universal(asn1::TAG_UTC_TIME) && !node.is_universal(asn1::TAG_GENERALIZED_TIME) {
        return Err(SmimeError::ParseError(
            "certificate validity is not a UTCTime/GeneralizedTime".to_string(),
        ));
    }
    String::from_utf8(node.content().to_vec())
        .map_err(|_| SmimeError::ParseError("certificate validity is not ASCII".to_string()))
}

impl fmt::Debug for SignerCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignerCertificate(len={}, serial={})",
            self.der.len(),
            self.serial_hex()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_CERT_PEM: &str = include_str!("../../../tests/fixtures/alice_cert.pem");

    #[test]
    fn parses_fixture_certificate() {
        let cert = SignerCertificate::from_pem(ALICE_CERT_PEM).expect("parse fixture");
        assert!(!cert.issuer_der().is_empty());
        assert!(!cert.serial_der().is_empty());
        // self-signed fixture: issuer == subject, validity strings are UTC times
        assert!(cert.not_before().len() >= 13);
        assert!(cert.not_after().len() >= 13);
        cert.rsa_public_key().expect("RSA public key");
        assert!(cert.matches_issuer_serial(
            &cert.issuer_der().to_vec(),
            &cert.serial_der().to_vec()
        ));
    }

    #[test]
    fn rejects_garbage() {
        let err = SignerCertificate::from_der(vec![0x02, 0x01, 0x01]).unwrap_err();
        assert!(matches!(err, SmimeError::ParseError(_)));
    }

    #[test]
    fn from_pem_requires_a_block() {
        let err = SignerCertificate::from_pem("no armor here").unwrap_err();
        assert!(matches!(err, SmimeError::FormatError(_)));
    }
}
