//! Certificate validation service.
//!
//! Analyzes a certificate for S/MIME signing suitability: validity window,
//! key usage, email-protection extended key usage and self-signed status.
//! Purely advisory — the verifier does not gate on this analysis.

use der::asn1::ObjectIdentifier;
use der::{Decode, Encode};
use x509_cert::ext::pkix::{ExtendedKeyUsage, KeyUsage, KeyUsages};
use x509_cert::Certificate;

use crate::domain::constants;
use crate::infra::error::{SmimeError, SmimeResult};

#[derive(Debug, Clone)]
pub struct CertificateAnalysis {
    pub is_email_signing_suitable: bool,
    pub days_until_expiry: i64,
    pub can_digital_sign: bool,
    pub has_email_protection_eku: bool,
    pub is_self_signed: bool,
    pub warnings: Vec<String>,
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
}

pub struct CertificateValidator;

impl CertificateValidator {
    /// Analyze a DER-encoded certificate for S/MIME signing.
    pub fn validate_for_email_signing(certificate_der: &[u8]) -> SmimeResult<CertificateAnalysis> {
        let certificate = Certificate::from_der(certificate_der)
            .map_err(|e| SmimeError::ParseError(format!("failed to parse certificate: {e}")))?;

        let mut analysis = CertificateAnalysis {
            is_email_signing_suitable: false,
            days_until_expiry: 0,
            can_digital_sign: false,
            has_email_protection_eku: false,
            is_self_signed: Self::is_self_signed(&certificate),
            warnings: Vec::new(),
            subject: certificate.tbs_certificate.subject.to_string(),
            issuer: certificate.tbs_certificate.issuer.to_string(),
            serial_number: Self::serial_hex(&certificate),
        };

        log::info!("Performing certificate validation for S/MIME signing");
        log::debug!("Certificate subject: {}", analysis.subject);
        log::debug!("Certificate issuer: {}", analysis.issuer);

        analysis.days_until_expiry = Self::days_until_expiry(&certificate);
        if analysis.days_until_expiry < 0 {
            analysis.warnings.push("Certificate has expired".to_string());
        } else if analysis.days_until_expiry < 30 {
            analysis.warnings.push(format!(
                "Certificate expires in {} days",
                analysis.days_until_expiry
            ));
        }

        analysis.can_digital_sign = Self::check_digital_signature_usage(&certificate)?;
        if !analysis.can_digital_sign {
            analysis
                .warnings
                .push("Certificate cannot be used for digital signatures".to_string());
        }

        analysis.has_email_protection_eku = Self::check_email_protection_eku(&certificate)?;
        if !analysis.has_email_protection_eku {
            analysis
                .warnings
                .push("Certificate lacks Email Protection Extended Key Usage".to_string());
        }

        if analysis.is_self_signed {
            analysis
                .warnings
                .push("Certificate is self-signed - may not be trusted by recipients".to_string());
        }

        analysis.is_email_signing_suitable =
            analysis.days_until_expiry >= 0 && analysis.can_digital_sign;

        if analysis.is_email_signing_suitable {
            log::info!("Certificate is suitable for S/MIME signing");
        } else {
            log::warn!("Certificate is NOT suitable for S/MIME signing");
            for warning in &analysis.warnings {
                log::warn!("  - {warning}");
            }
        }

        Ok(analysis)
    }

    fn serial_hex(certificate: &Certificate) -> String {
        certificate
            .tbs_certificate
            .serial_number
            .as_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":")
    }

    fn days_until_expiry(certificate: &Certificate) -> i64 {
        let not_after = certificate
            .tbs_certificate
            .validity
            .not_after
            .to_unix_duration()
            .as_secs() as i64;
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        (not_after - now) / 86_400
    }

    /// KeyUsage digitalSignature bit; absence of the extension counts as
    /// unconstrained.
    fn check_digital_signature_usage(certificate: &Certificate) -> SmimeResult<bool> {
        let Some(extensions) = &certificate.tbs_certificate.extensions else {
            return Ok(true);
        };
        for ext in extensions {
            if ext.extn_id == ObjectIdentifier::new_unwrap("2.5.29.15") {
                let key_usage = KeyUsage::from_der(ext.extn_value.as_bytes())
                    .map_err(|e| SmimeError::ParseError(format!("bad KeyUsage extension: {e}")))?;
                return Ok(key_usage.0.contains(KeyUsages::DigitalSignature));
            }
        }
        Ok(true)
    }

    fn check_email_protection_eku(certificate: &Certificate) -> SmimeResult<bool> {
        let Some(extensions) = &certificate.tbs_certificate.extensions else {
            return Ok(false);
        };
        let email_protection = ObjectIdentifier::new_unwrap(constants::OID_EMAIL_PROTECTION);
        for ext in extensions {
            if ext.extn_id == ObjectIdentifier::new_unwrap("2.5.29.37") {
                let eku = ExtendedKeyUsage::from_der(ext.extn_value.as_bytes()).map_err(|e| {
                    SmimeError::ParseError(format!("bad ExtendedKeyUsage extension: {e}"))
                })?;
                return Ok(eku.0.iter().any(|oid| *oid == email_protection));
            }
        }
        Ok(false)
    }

    fn is_self_signed(certificate: &Certificate) -> bool {
        let subject = certificate.tbs_certificate.subject.to_der().unwrap_or_default();
        let issuer = certificate.tbs_certificate.issuer.to_der().unwrap_or_default();
        subject == issuer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pem;

    const ALICE_CERT_PEM: &str = include_str!("../../tests/fixtures/alice_cert.pem");

    #[test]
    fn analyzes_fixture_certificate() {
        let der = pem::decode(ALICE_CERT_PEM).unwrap().remove(0);
        let analysis = CertificateValidator::validate_for_email_signing(&der).unwrap();
        assert!(analysis.is_self_signed);
        assert!(analysis.subject.contains("Alice Example"));
        assert!(!analysis.serial_number.is_empty());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = CertificateValidator::validate_for_email_signing(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, SmimeError::ParseError(_)));
    }
}
