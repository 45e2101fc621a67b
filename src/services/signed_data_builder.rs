//! CMS `SignedData` construction for S/MIME messages.
//!
//! Assembles `ContentInfo { contentType = signedData, content = SignedData }`
//! around a content payload, the signer's IssuerAndSerialNumber identity and
//! a precomputed signature. Exactly one SignerInfo is produced; the signing
//! certificate is embedded in the certificates field so recipients can verify
//! without out-of-band material.

use crate::domain::cms::CmsSignedData;
use crate::domain::constants;
use crate::domain::asn1::DerNode;
use crate::domain::crypto::{CmsSignature, SignerCertificate};
use crate::infra::error::SmimeResult;
use crate::HashAlgorithm;

pub struct SignedDataBuilder {
    hash_algorithm: HashAlgorithm,
}

impl SignedDataBuilder {
    #[must_use]
    pub fn new(hash_algorithm: HashAlgorithm) -> Self {
        Self { hash_algorithm }
    }

    #[must_use]
    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Assemble the complete DER-encoded ContentInfo.
    ///
    /// `econtent` is the exact payload that was signed (the UTF-8 bytes of
    /// the message text), stored unmodified as the eContent OCTET STRING.
    pub fn build(
        &self,
        econtent: &[u8],
        certificate: &SignerCertificate,
        signature: &CmsSignature,
    ) -> SmimeResult<CmsSignedData> {
        let signed_data = DerNode::sequence(vec![
            // version CMSVersion (1 for issuerAndSerialNumber signers)
            DerNode::integer(vec![0x01]),
            DerNode::set(vec![self.digest_algorithm_identifier()?]),
            self.encapsulated_content_info(econtent)?,
            // certificates [0] IMPLICIT: bare concatenation of Certificate DER
            DerNode::context_implicit(0, certificate.as_der().to_vec()),
            DerNode::set(vec![self.signer_info(certificate, signature)?]),
        ]);

        let content_info = DerNode::sequence(vec![
            DerNode::object_identifier(constants::OID_CMS_SIGNED_DATA)?,
            DerNode::context(0, vec![signed_data]),
        ]);

        let der = content_info.to_der();
        log::debug!("Assembled CMS SignedData: {} bytes", der.len());
        Ok(CmsSignedData::from_der(der))
    }

    /// AlgorithmIdentifier for the digest, with NULL parameters per RFC 3370.
    fn digest_algorithm_identifier(&self) -> SmimeResult<DerNode> {
        Ok(DerNode::sequence(vec![
            DerNode::object_identifier(self.hash_algorithm.oid())?,
            DerNode::null(),
        ]))
    }

    /// AlgorithmIdentifier for the signature (shaNNNWithRSAEncryption).
    /// RSA signature algorithms carry NULL parameters, unlike ECDSA.
    fn signature_algorithm_identifier(&self) -> SmimeResult<DerNode> {
        Ok(DerNode::sequence(vec![
            DerNode::object_identifier(self.hash_algorithm.rsa_signature_oid())?,
            DerNode::null(),
        ]))
    }

    /// EncapsulatedContentInfo with the "data" content type and the payload
    /// wrapped as an OCTET STRING under [0] EXPLICIT.
    fn encapsulated_content_info(&self, econtent: &[u8]) -> SmimeResult<DerNode> {
        Ok(DerNode::sequence(vec![
            DerNode::object_identifier(constants::OID_CMS_DATA)?,
            DerNode::context(0, vec![DerNode::octet_string(econtent.to_vec())]),
        ]))
    }

    /// IssuerAndSerialNumber: the issuer Name DER is lifted verbatim from the
    /// certificate so the encoding matches byte for byte.
    fn issuer_and_serial_number(&self, certificate: &SignerCertificate) -> SmimeResult<DerNode> {
        let issuer = DerNode::parse(certificate.issuer_der())?;
        Ok(DerNode::sequence(vec![
            issuer,
            DerNode::integer(certificate.serial_der().to_vec()),
        ]))
    }

    fn signer_info(
        &self,
        certificate: &SignerCertificate,
        signature: &CmsSignature,
    ) -> SmimeResult<DerNode> {
        Ok(DerNode::sequence(vec![
            // version 1: sid is issuerAndSerialNumber, never subjectKeyIdentifier
            DerNode::integer(vec![0x01]),
            self.issuer_and_serial_number(certificate)?,
            self.digest_algorithm_identifier()?,
            self.signature_algorithm_identifier()?,
            DerNode::octet_string(signature.as_slice().to_vec()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asn1;
    use crate::SignatureAlgorithm;

    const ALICE_CERT_PEM: &str = include_str!("../../tests/fixtures/alice_cert.pem");

    fn sample_signature() -> CmsSignature {
        CmsSignature::new(
            SignatureAlgorithm::RsaPkcs1v15,
            HashAlgorithm::Sha256,
            vec![0xab; 256],
        )
    }

    #[test]
    fn builds_well_formed_content_info() {
        let cert = SignerCertificate::from_pem(ALICE_CERT_PEM).unwrap();
        let builder = SignedDataBuilder::new(HashAlgorithm::Sha256);
        let cms = builder
            .build(b"This is some plaintext.", &cert, &sample_signature())
            .unwrap();

        let root = DerNode::parse(cms.as_der()).unwrap();
        assert!(root.is_universal(asn1::TAG_SEQUENCE));
        assert_eq!(
            root.child(0).unwrap().oid_string().unwrap(),
            constants::OID_CMS_SIGNED_DATA
        );

        let signed_data = root.child(1).unwrap().child(0).unwrap();
        // version
        assert_eq!(signed_data.child(0).unwrap().content(), &[0x01]);
        // encapContentInfo carries the exact payload
        let encap = signed_data.child(2).unwrap();
        assert_eq!(
            encap.child(0).unwrap().oid_string().unwrap(),
            constants::OID_CMS_DATA
        );
        let econtent = encap.child(1).unwrap().child(0).unwrap();
        assert_eq!(econtent.content(), b"This is some plaintext.");
        // embedded certificate is byte-identical
        let certs = signed_data.child(3).unwrap();
        assert!(certs.is_context(0));
        assert_eq!(certs.child(0).unwrap().to_der(), cert.as_der());
        // exactly one signer
        let signer_infos = signed_data.child(4).unwrap();
        assert_eq!(signer_infos.children().len(), 1);
    }

    #[test]
    fn signer_identity_matches_certificate() {
        let cert = SignerCertificate::from_pem(ALICE_CERT_PEM).unwrap();
        let builder = SignedDataBuilder::new(HashAlgorithm::Sha256);
        let cms = builder.build(b"payload", &cert, &sample_signature()).unwrap();

        let root = DerNode::parse(cms.as_der()).unwrap();
        let signer = root
            .child(1)
            .unwrap()
            .child(0)
            .unwrap()
            .child(4)
            .unwrap()
            .child(0)
            .unwrap();
        let sid = signer.child(1).unwrap();
        assert_eq!(sid.child(0).unwrap().to_der(), cert.issuer_der());
        assert_eq!(sid.child(1).unwrap().content(), cert.serial_der());
    }
}
