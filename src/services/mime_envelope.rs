//! MIME envelope for S/MIME parts.
//!
//! Wraps a DER-encoded CMS blob into a base64 `application/pkcs7-mime` part
//! with the standard S/MIME headers, and recovers the blob from such a part
//! again. The parser tolerates folded headers and both CRLF and bare LF line
//! endings, since host mail clients rewrite both freely.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::domain::cms::CmsSignedData;
use crate::infra::error::{SmimeError, SmimeResult};

/// Base64 body line width used by MIME transfer encoding.
const BODY_LINE_WIDTH: usize = 76;

/// Standard header values for signed parts.
pub const SIGNED_CONTENT_DESCRIPTION: &str = "Signed Data";

/// Address headers stamped onto the signed part.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MimeHeaders {
    pub from: String,
    pub to: String,
    pub subject: String,
}

impl Default for MimeHeaders {
    fn default() -> Self {
        Self {
            from: "sender@example.com".to_string(),
            to: "recipient@example.com".to_string(),
            subject: "Example S/MIME signed message".to_string(),
        }
    }
}

/// Build the signed MIME part around a CMS blob.
///
/// Output is deterministic for identical input: no Date or Message-Id headers
/// are stamped.
#[must_use]
pub fn wrap_signed_data(signed_data: &CmsSignedData, headers: &MimeHeaders) -> String {
    let base64 = BASE64.encode(signed_data.as_der());
    let mut lines: Vec<String> = vec![
        "Content-Type: application/pkcs7-mime; name=smime.p7m;".to_string(),
        " smime-type=signed-data".to_string(),
        format!("Content-Description: {SIGNED_CONTENT_DESCRIPTION}"),
        "Content-Disposition: attachment; filename=smime.p7m".to_string(),
        "Content-Transfer-Encoding: base64".to_string(),
        format!("From: {}", headers.from),
        format!("To: {}", headers.to),
        format!("Subject: {}", headers.subject),
        "MIME-Version: 1.0".to_string(),
        String::new(),
    ];
    let bytes = base64.as_bytes();
    let mut offset = 0;
    while offset < bytes.len() {
        let end = usize::min(offset + BODY_LINE_WIDTH, bytes.len());
        lines.push(String::from_utf8_lossy(&bytes[offset..end]).into_owned());
        offset = end;
    }
    lines.join("\r\n")
}

/// Wrap a signed MIME text in literal `<pre>` markers for HTML-bodied
/// transports, deterring the host client from reflowing the payload.
#[must_use]
pub fn wrap_for_html_body(signed_text: &str) -> String {
    format!("<pre>{signed_text}</pre>")
}

/// Recover the raw CMS DER from an S/MIME part.
pub fn unwrap_signed_data(mime_text: &str) -> SmimeResult<Vec<u8>> {
    let (headers, body) = split_part(mime_text)?;

    let content_type = header_value(&headers, "content-type").ok_or_else(|| {
        SmimeError::ParseError("not an S/MIME message: no Content-Type header".to_string())
    })?;
    if !content_type.contains("pkcs7-mime") {
        return Err(SmimeError::ParseError(format!(
            "Content-Type is not an S/MIME part: {content_type}"
        )));
    }

    if let Some(encoding) = header_value(&headers, "content-transfer-encoding") {
        if !encoding.trim().eq_ignore_ascii_case("base64") {
            return Err(SmimeError::ParseError(format!(
                "unsupported Content-Transfer-Encoding: {encoding}"
            )));
        }
    }

    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| SmimeError::FormatError(format!("invalid base64 part body: {e}")))
}

/// Split a MIME part into unfolded (name, value) headers and the body text.
fn split_part(text: &str) -> SmimeResult<(Vec<(String, String)>, &str)> {
    let (header_block, body) = if let Some(pos) = text.find("\r\n\r\n") {
        (&text[..pos], &text[pos + 4..])
    } else if let Some(pos) = text.find("\n\n") {
        (&text[..pos], &text[pos + 2..])
    } else {
        return Err(SmimeError::ParseError(
            "malformed MIME part: no blank line after headers".to_string(),
        ));
    };

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in header_block.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            // folded continuation of the previous header
            if let Some(last) = headers.last_mut() {
                last.1.push(' ');
                last.1.push_str(line.trim_start());
            }
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Err(SmimeError::ParseError(format!(
                "malformed MIME header line: {line}"
            )));
        };
        headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
    }
    Ok((headers, body))
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_then_unwrap_round_trips() {
        let payload: Vec<u8> = (0u8..=255).cycle().take(700).collect();
        let part = wrap_signed_data(&CmsSignedData::from_der(payload.clone()), &MimeHeaders::default());
        assert!(part.contains(
            "Content-Type: application/pkcs7-mime; name=smime.p7m;\r\n smime-type=signed-data"
        ));
        assert!(part.contains("Content-Transfer-Encoding: base64"));
        assert!(part.contains("From: sender@example.com"));
        assert_eq!(unwrap_signed_data(&part).unwrap(), payload);
    }

    #[test]
    fn body_lines_stay_within_transfer_width() {
        let part = wrap_signed_data(&CmsSignedData::from_der(vec![0x5a; 500]), &MimeHeaders::default());
        let body = part.split("\r\n\r\n").nth(1).unwrap();
        for line in body.lines() {
            assert!(line.len() <= 76);
        }
    }

    #[test]
    fn unwrap_accepts_bare_lf() {
        let part = wrap_signed_data(&CmsSignedData::from_der(vec![1, 2, 3]), &MimeHeaders::default());
        let lf_only = part.replace("\r\n", "\n");
        assert_eq!(unwrap_signed_data(&lf_only).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_content_type_is_not_smime() {
        let err =
            unwrap_signed_data("Subject: hello\r\n\r\nAAAA").unwrap_err();
        assert!(err.to_string().contains("no Content-Type"));
    }

    #[test]
    fn non_base64_transfer_encoding_is_rejected() {
        let text = "Content-Type: application/pkcs7-mime\r\nContent-Transfer-Encoding: 7bit\r\n\r\nAAAA";
        let err = unwrap_signed_data(text).unwrap_err();
        assert!(err.to_string().contains("Content-Transfer-Encoding"));
    }

    #[test]
    fn corrupt_base64_is_a_format_error() {
        let text = "Content-Type: application/pkcs7-mime\r\nContent-Transfer-Encoding: base64\r\n\r\n!!!!";
        let err = unwrap_signed_data(text).unwrap_err();
        assert!(matches!(err, SmimeError::FormatError(_)));
    }

    #[test]
    fn html_wrap_is_literal() {
        assert_eq!(wrap_for_html_body("abc"), "<pre>abc</pre>");
    }
}
