//! Centralized constants for commonly repeated DER tags and OIDs.
//! Keep this intentionally small; only broadly reused literals should live here.

// === ASN.1 DER Constants ===

/// ASN.1 NULL value (tag + zero length)
pub const ASN1_NULL: &[u8] = &[0x05, 0x00];

/// ASN.1 SEQUENCE tag
pub const ASN1_SEQUENCE_TAG: u8 = 0x30;

/// ASN.1 SET tag
pub const ASN1_SET_TAG: u8 = 0x31;

/// ASN.1 INTEGER tag
pub const ASN1_INTEGER_TAG: u8 = 0x02;

/// ASN.1 OBJECT IDENTIFIER tag
pub const ASN1_OID_TAG: u8 = 0x06;

/// ASN.1 OCTET STRING tag
pub const ASN1_OCTET_STRING_TAG: u8 = 0x04;

/// ASN.1 context-specific tag [0], constructed
pub const ASN1_CONTEXT_0_TAG: u8 = 0xa0;

/// DER long form length encoding: 1-byte length follows
pub const DER_LONG_FORM_1_BYTE: u8 = 0x81;

/// DER long form length encoding: 2-byte length follows
pub const DER_LONG_FORM_2_BYTE: u8 = 0x82;

/// DER long form length encoding: 3-byte length follows
pub const DER_LONG_FORM_3_BYTE: u8 = 0x83;

/// DER long form length encoding: 4-byte length follows
pub const DER_LONG_FORM_4_BYTE: u8 = 0x84;

// === CMS Content Type OIDs ===

/// CMS "data" content type (1.2.840.113549.1.7.1)
pub const OID_CMS_DATA: &str = "1.2.840.113549.1.7.1";

/// CMS "signedData" content type (1.2.840.113549.1.7.2)
pub const OID_CMS_SIGNED_DATA: &str = "1.2.840.113549.1.7.2";

/// CMS "envelopedData" content type (1.2.840.113549.1.7.3).
/// Reserved for the encryption path, which this crate does not implement.
pub const OID_CMS_ENVELOPED_DATA: &str = "1.2.840.113549.1.7.3";

// === Hash Algorithm OIDs ===

/// SHA-256 (2.16.840.1.101.3.4.2.1)
pub const OID_SHA256: &str = "2.16.840.1.101.3.4.2.1";

/// SHA-384 (2.16.840.1.101.3.4.2.2)
pub const OID_SHA384: &str = "2.16.840.1.101.3.4.2.2";

/// SHA-512 (2.16.840.1.101.3.4.2.3)
pub const OID_SHA512: &str = "2.16.840.1.101.3.4.2.3";

// === Signature Algorithm OIDs ===

/// rsaEncryption (1.2.840.113549.1.1.1), also the SPKI algorithm for RSA keys
pub const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";

/// sha256WithRSAEncryption (1.2.840.113549.1.1.11)
pub const OID_SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";

/// sha384WithRSAEncryption (1.2.840.113549.1.1.12)
pub const OID_SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";

/// sha512WithRSAEncryption (1.2.840.113549.1.1.13)
pub const OID_SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";

// === X.509 Extended Key Usage OIDs ===

/// id-kp-emailProtection (1.3.6.1.5.5.7.3.4)
pub const OID_EMAIL_PROTECTION: &str = "1.3.6.1.5.5.7.3.4";
