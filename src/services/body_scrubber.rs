//! Recovery of a pristine S/MIME section from an HTML-capable mail body.
//!
//! Host mail clients HTML-escape the stored body and splice wrapper markup
//! (`<div>`, `<span>`, `<br>`) into it; the signer additionally wraps the
//! payload in `<pre>` markers to deter reflowing. Recovery undoes exactly
//! these transformations by literal string surgery — not a general HTML
//! parser — because the payload must come back byte-exact. Every step is a
//! no-op on text that never had the corresponding markup.

use crate::infra::error::{SmimeError, SmimeResult};

/// Marker locating the start of the S/MIME section inside a scrubbed body.
const SECTION_MARKER: &str = "Content-Type:";

/// Tags the host client may splice into a stored body.
const WRAPPER_TAGS: [&str; 5] = ["<div>", "</div>", "<span>", "</span>", "<br>"];

/// Tags the signer added around the payload.
const PRE_TAGS: [&str; 2] = ["<pre>", "</pre>"];

/// Full recovery: entity decode, wrapper strip, `<pre>` strip, then take the
/// remainder from the first `Content-Type:` onward.
///
/// Locating the section by the first `Content-Type:` occurrence is a known
/// best-effort heuristic; a body that merely mentions the literal earlier
/// will mislead it.
pub fn recover_smime_text(body: &str) -> SmimeResult<String> {
    let decoded = decode_html_entities(body);
    let stripped = strip_pre_tags(&strip_wrapper_tags(&decoded));
    match stripped.find(SECTION_MARKER) {
        Some(index) => Ok(stripped[index..].to_string()),
        None => Err(SmimeError::ParseError(
            "not an S/MIME message: no Content-Type section found".to_string(),
        )),
    }
}

/// Decode HTML entities back to literal characters in a single left-to-right
/// pass, so already-literal text (including freshly decoded `&amp;lt;` →
/// `&lt;`) is never decoded twice.
#[must_use]
pub fn decode_html_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match parse_entity(tail) {
            Some((replacement, consumed)) => {
                out.push_str(&replacement);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse one entity at the start of `text` (which begins with `&`).
/// Returns the decoded replacement and the number of bytes consumed.
fn parse_entity(text: &str) -> Option<(String, usize)> {
    let semi = text[1..].find(';')? + 1;
    if semi > 10 {
        return None;
    }
    let name = &text[1..semi];
    let consumed = semi + 1;
    let replacement = match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => "\u{a0}".to_string(),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)?.to_string()
        }
    };
    Some((replacement, consumed))
}

/// Remove host-injected `<div>`, `</div>`, `<span>`, `</span>`, `<br>`
/// by literal deletion.
#[must_use]
pub fn strip_wrapper_tags(text: &str) -> String {
    let mut out = text.to_string();
    for tag in WRAPPER_TAGS {
        out = out.replace(tag, "");
    }
    out
}

/// Remove the signer's own `<pre>`/`</pre>` payload markers.
#[must_use]
pub fn strip_pre_tags(text: &str) -> String {
    let mut out = text.to_string();
    for tag in PRE_TAGS {
        out = out.replace(tag, "");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_html_entities("a &lt; b &amp; c &gt; d"), "a < b & c > d");
        assert_eq!(decode_html_entities("&quot;x&quot; &apos;y&apos;"), "\"x\" 'y'");
        assert_eq!(decode_html_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn single_pass_never_double_decodes() {
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn unknown_entities_stay_literal() {
        assert_eq!(decode_html_entities("&unknown; & plain"), "&unknown; & plain");
        assert_eq!(decode_html_entities("trailing &"), "trailing &");
    }

    #[test]
    fn strips_wrapper_and_pre_tags() {
        let input = "<div><span>Content</span></div><br><pre>body</pre>";
        assert_eq!(strip_pre_tags(&strip_wrapper_tags(input)), "Contentbody");
    }

    #[test]
    fn scrubbing_clean_text_is_a_no_op() {
        let clean = "Content-Type: application/pkcs7-mime\r\n\r\nAAAA";
        assert_eq!(recover_smime_text(clean).unwrap(), clean);
        // idempotence: a second pass changes nothing
        let once = recover_smime_text(clean).unwrap();
        assert_eq!(recover_smime_text(&once).unwrap(), once);
    }

    #[test]
    fn recovers_section_from_wrapped_body() {
        let body = format!(
            "<div>preamble</div><pre>{}</pre>",
            "Content-Type: application/pkcs7-mime\r\n\r\nQUJD"
        );
        let recovered = recover_smime_text(&body).unwrap();
        assert!(recovered.starts_with("Content-Type:"));
        assert!(recovered.ends_with("QUJD"));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let err = recover_smime_text("<div>just chatter</div>").unwrap_err();
        assert!(matches!(err, SmimeError::ParseError(_)));
        assert!(err.to_string().contains("no Content-Type"));
    }
}
