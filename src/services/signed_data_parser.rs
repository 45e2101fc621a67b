//! Structural parsing of CMS `ContentInfo`/`SignedData` DER.
//!
//! Walks the tagged tree and lifts out the fields verification needs: the
//! encapsulated content bytes, the embedded certificates, and every
//! SignerInfo (sid, algorithms, signature value). Cryptographic checks live
//! in the verifier service; this module only answers "what does this
//! structure say".

use crate::domain::asn1::{self, DerNode};
use crate::domain::constants;
use crate::domain::crypto::SignerCertificate;
use crate::infra::error::{SmimeError, SmimeResult};
use crate::HashAlgorithm;

/// One parsed SignerInfo, identified by IssuerAndSerialNumber.
#[derive(Debug, Clone)]
pub struct ParsedSignerInfo {
    /// Raw DER of the issuer Name from the sid.
    pub issuer_der: Vec<u8>,
    /// Serial number content octets from the sid.
    pub serial: Vec<u8>,
    /// Declared digest algorithm.
    pub digest_algorithm: HashAlgorithm,
    /// Declared signature algorithm OID (dotted decimal).
    pub signature_algorithm_oid: String,
    /// The signatureValue octets.
    pub signature: Vec<u8>,
}

/// The parts of a SignedData that verification consumes.
#[derive(Debug)]
pub struct ParsedSignedData {
    /// Exact bytes of the encapsulated content.
    pub econtent: Vec<u8>,
    /// Certificates embedded in the message, in order.
    pub certificates: Vec<SignerCertificate>,
    /// All signers; the verifier uses the first.
    pub signers: Vec<ParsedSignerInfo>,
}

/// Parse a DER-encoded ContentInfo carrying SignedData.
///
/// Truncated or trailing-garbage input, a content type other than
/// signedData, or a missing eContent are all `ParseError`s. Structures using
/// subjectKeyIdentifier signer identification or signed attributes are
/// recognized but unsupported (`CryptoError`).
pub fn parse_content_info(der: &[u8]) -> SmimeResult<ParsedSignedData> {
    let root = DerNode::parse(der).map_err(|e| match e {
        SmimeError::ParseError(msg) => {
            SmimeError::ParseError(format!("not an S/MIME message: {msg}"))
        }
        other => other,
    })?;
    if !root.is_universal(asn1::TAG_SEQUENCE) {
        return Err(SmimeError::ParseError(
            "ContentInfo is not a SEQUENCE".to_string(),
        ));
    }

    let content_type = root.child(0)?.oid_string()?;
    if content_type != constants::OID_CMS_SIGNED_DATA {
        return Err(SmimeError::ParseError(format!(
            "unsupported CMS content type {content_type} (expected signedData)"
        )));
    }

    let wrapper = root.child(1)?;
    if !wrapper.is_context(0) {
        return Err(SmimeError::ParseError(
            "ContentInfo content is not [0] tagged".to_string(),
        ));
    }
    let signed_data = wrapper.child(0)?;
    if !signed_data.is_universal(asn1::TAG_SEQUENCE) {
        return Err(SmimeError::ParseError(
            "SignedData is not a SEQUENCE".to_string(),
        ));
    }

    let version = signed_data.child(0)?;
    if !version.is_universal(asn1::TAG_INTEGER) {
        return Err(SmimeError::ParseError(
            "SignedData version is not an INTEGER".to_string(),
        ));
    }
    log::debug!("SignedData version {:?}", version.content());

    // child(1) digestAlgorithms SET is informational; each SignerInfo
    // re-declares its digest algorithm, which is what verification uses.

    let econtent = parse_encap_content_info(signed_data.child(2)?)?;

    let mut index = 3;
    let mut certificates = Vec::new();
    if let Ok(node) = signed_data.child(index) {
        if node.is_context(0) {
            for kid in node.children() {
                certificates.push(SignerCertificate::from_der(kid.to_der())?);
            }
            index += 1;
        }
    }
    if let Ok(node) = signed_data.child(index) {
        // crls [1] IMPLICIT, not used by this pipeline
        if node.is_context(1) {
            index += 1;
        }
    }

    let signer_infos = signed_data.child(index)?;
    if !signer_infos.is_universal(asn1::TAG_SET) {
        return Err(SmimeError::ParseError(
            "signerInfos is not a SET".to_string(),
        ));
    }
    if signer_infos.children().is_empty() {
        return Err(SmimeError::ParseError(
            "SignedData carries no SignerInfo".to_string(),
        ));
    }
    let signers = signer_infos
        .children()
        .iter()
        .map(parse_signer_info)
        .collect::<SmimeResult<Vec<_>>>()?;

    log::debug!(
        "Parsed SignedData: {} content bytes, {} certificates, {} signers",
        econtent.len(),
        certificates.len(),
        signers.len()
    );

    Ok(ParsedSignedData {
        econtent,
        certificates,
        signers,
    })
}

fn parse_encap_content_info(encap: &DerNode) -> SmimeResult<Vec<u8>> {
    if !encap.is_universal(asn1::TAG_SEQUENCE) {
        return Err(SmimeError::ParseError(
            "encapContentInfo is not a SEQUENCE".to_string(),
        ));
    }
    let content_type = encap.child(0)?.oid_string()?;
    if content_type != constants::OID_CMS_DATA {
        log::warn!("encapContentInfo content type is {content_type}, not data");
    }
    let wrapper = encap
        .children()
        .get(1)
        .filter(|n| n.is_context(0))
        .ok_or_else(|| {
            SmimeError::ParseError(
                "detached signatures are not supported (no eContent)".to_string(),
            )
        })?;
    let octets = wrapper.child(0)?;
    if !octets.is_universal(asn1::TAG_OCTET_STRING) || octets.is_constructed() {
        return Err(SmimeError::ParseError(
            "eContent is not a primitive OCTET STRING".to_string(),
        ));
    }
    Ok(octets.content().to_vec())
}

fn parse_signer_info(signer: &DerNode) -> SmimeResult<ParsedSignerInfo> {
    if !signer.is_universal(asn1::TAG_SEQUENCE) {
        return Err(SmimeError::ParseError(
            "SignerInfo is not a SEQUENCE".to_string(),
        ));
    }
    let version = signer.child(0)?;
    if !version.is_universal(asn1::TAG_INTEGER) {
        return Err(SmimeError::ParseError(
            "SignerInfo version is not an INTEGER".to_string(),
        ));
    }

    let sid = signer.child(1)?;
    if sid.is_context(0) {
        return Err(SmimeError::CryptoError(
            "subjectKeyIdentifier signer identification is not supported".to_string(),
        ));
    }
    if !sid.is_universal(asn1::TAG_SEQUENCE) {
        return Err(SmimeError::ParseError(
            "SignerInfo sid is not an IssuerAndSerialNumber SEQUENCE".to_string(),
        ));
    }
    let issuer_der = sid.child(0)?.to_der();
    let serial_node = sid.child(1)?;
    if !serial_node.is_universal(asn1::TAG_INTEGER) {
        return Err(SmimeError::ParseError(
            "IssuerAndSerialNumber serial is not an INTEGER".to_string(),
        ));
    }

    let digest_oid = signer.child(2)?.child(0)?.oid_string()?;
    let digest_algorithm = HashAlgorithm::from_oid(&digest_oid).ok_or_else(|| {
        SmimeError::CryptoError(format!("unsupported digest algorithm {digest_oid}"))
    })?;

    let mut index = 3;
    if signer.child(index)?.is_context(0) {
        // signedAttrs change what the signature covers; this pipeline signs
        // the eContent directly and does not produce them.
        return Err(SmimeError::CryptoError(
            "signed attributes are not supported".to_string(),
        ));
    }
    let signature_algorithm_oid = signer.child(index)?.child(0)?.oid_string()?;
    index += 1;

    let signature_node = signer.child(index)?;
    if !signature_node.is_universal(asn1::TAG_OCTET_STRING) {
        return Err(SmimeError::ParseError(
            "signatureValue is not an OCTET STRING".to_string(),
        ));
    }

    Ok(ParsedSignerInfo {
        issuer_der,
        serial: serial_node.content().to_vec(),
        digest_algorithm,
        signature_algorithm_oid,
        signature: signature_node.content().to_vec(),
    })
}
