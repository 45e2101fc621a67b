//! Minimal DER encoder/decoder for the ASN.1 constructs CMS needs.
//!
//! Decodes raw bytes into a tagged tree (`DerNode`) carrying tag class,
//! constructed flag, content octets, absolute offset, and parsed children for
//! constructed values. Encoding is definite-length DER only, with minimal
//! length encoding (short form under 128, long form otherwise) — verification
//! interop depends on canonical DER, not flexible BER.
//!
//! Supported node kinds: SEQUENCE, SET, OCTET STRING, OBJECT IDENTIFIER
//! (dotted-decimal string <-> bytes), INTEGER (arbitrary precision via raw
//! big-endian content bytes, used for certificate serial numbers), NULL, and
//! the context-specific constructed tags CMS uses.

use crate::domain::constants;
use crate::infra::error::{SmimeError, SmimeResult};

/// ASN.1 tag class (bits 7-8 of the identifier octet).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

impl TagClass {
    fn from_identifier(byte: u8) -> Self {
        match byte >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    fn class_bits(self) -> u8 {
        match self {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xc0,
        }
    }
}

// Universal tag numbers used by CMS SignedData.
pub const TAG_INTEGER: u32 = 0x02;
pub const TAG_BIT_STRING: u32 = 0x03;
pub const TAG_OCTET_STRING: u32 = 0x04;
pub const TAG_NULL: u32 = 0x05;
pub const TAG_OBJECT_IDENTIFIER: u32 = 0x06;
pub const TAG_SEQUENCE: u32 = 0x10;
pub const TAG_SET: u32 = 0x11;
pub const TAG_UTC_TIME: u32 = 0x17;
pub const TAG_GENERALIZED_TIME: u32 = 0x18;

/// One node of a parsed (or assembled) DER tree.
///
/// Parsed nodes keep their content octets verbatim, so `to_der()` on a parsed
/// node reproduces the input bytes exactly — certificate subtrees lifted out
/// of a message stay byte-identical to what was signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerNode {
    class: TagClass,
    constructed: bool,
    number: u32,
    offset: usize,
    content: Vec<u8>,
    children: Vec<DerNode>,
}

impl DerNode {
    /// Decode a complete DER value, requiring the input to be fully consumed.
    pub fn parse(bytes: &[u8]) -> SmimeResult<DerNode> {
        if bytes.is_empty() {
            return Err(SmimeError::ParseError("empty DER input".to_string()));
        }
        let (node, consumed) = Self::parse_at(bytes, 0)?;
        if consumed != bytes.len() {
            return Err(SmimeError::ParseError(format!(
                "trailing bytes after DER value ({consumed} of {} consumed)",
                bytes.len()
            )));
        }
        Ok(node)
    }

    /// Decode one value at `offset` within `bytes`; returns the node and the
    /// offset one past its encoding.
    fn parse_at(bytes: &[u8], offset: usize) -> SmimeResult<(DerNode, usize)> {
        let identifier = *bytes.get(offset).ok_or_else(|| {
            SmimeError::ParseError(format!("truncated DER value at offset {offset}"))
        })?;
        if identifier & 0x1f == 0x1f {
            return Err(SmimeError::ParseError(format!(
                "high tag numbers are not supported (offset {offset})"
            )));
        }
        let class = TagClass::from_identifier(identifier);
        let constructed = identifier & 0x20 != 0;
        let number = u32::from(identifier & 0x1f);

        let (content_len, len_octets) = decode_length(bytes, offset + 1)?;
        let content_start = offset + 1 + len_octets;
        let content_end = content_start.checked_add(content_len).ok_or_else(|| {
            SmimeError::ParseError(format!("DER length overflow at offset {offset}"))
        })?;
        if content_end > bytes.len() {
            return Err(SmimeError::ParseError(format!(
                "DER length overruns buffer at offset {offset} (need {content_end}, have {})",
                bytes.len()
            )));
        }

        let content = bytes[content_start..content_end].to_vec();
        let children = if constructed {
            let mut kids = Vec::new();
            let mut pos = content_start;
            while pos < content_end {
                let (kid, next) = Self::parse_at(bytes, pos)?;
                if next > content_end {
                    return Err(SmimeError::ParseError(format!(
                        "child value overruns parent at offset {pos}"
                    )));
                }
                kids.push(kid);
                pos = next;
            }
            kids
        } else {
            Vec::new()
        };

        Ok((
            DerNode {
                class,
                constructed,
                number,
                offset,
                content,
                children,
            },
            content_end,
        ))
    }

    /// Serialize this node (tag, minimal definite length, content).
    #[must_use]
    pub fn to_der(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.content.len() + 6);
        out.push(self.class.class_bits() | if self.constructed { 0x20 } else { 0x00 } | self.number as u8);
        out.extend_from_slice(&encode_length(self.content.len()));
        out.extend_from_slice(&self.content);
        out
    }

    fn assemble(class: TagClass, number: u32, children: Vec<DerNode>) -> DerNode {
        let mut content = Vec::new();
        for child in &children {
            content.extend_from_slice(&child.to_der());
        }
        DerNode {
            class,
            constructed: true,
            number,
            offset: 0,
            content,
            children,
        }
    }

    fn primitive(number: u32, content: Vec<u8>) -> DerNode {
        DerNode {
            class: TagClass::Universal,
            constructed: false,
            number,
            offset: 0,
            content,
            children: Vec::new(),
        }
    }

    /// SEQUENCE of the given children, in order.
    #[must_use]
    pub fn sequence(children: Vec<DerNode>) -> DerNode {
        Self::assemble(TagClass::Universal, TAG_SEQUENCE, children)
    }

    /// SET of the given children, in order.
    #[must_use]
    pub fn set(children: Vec<DerNode>) -> DerNode {
        Self::assemble(TagClass::Universal, TAG_SET, children)
    }

    /// OCTET STRING carrying `bytes` verbatim.
    #[must_use]
    pub fn octet_string(bytes: Vec<u8>) -> DerNode {
        Self::primitive(TAG_OCTET_STRING, bytes)
    }

    /// INTEGER with raw (already canonical) content octets.
    #[must_use]
    pub fn integer(content: Vec<u8>) -> DerNode {
        Self::primitive(TAG_INTEGER, content)
    }

    /// INTEGER from an unsigned big-endian value: leading zeros stripped,
    /// a 0x00 pad prepended when the high bit is set to keep it positive.
    #[must_use]
    pub fn integer_from_unsigned_be(bytes: &[u8]) -> DerNode {
        let mut start = 0;
        while start < bytes.len() && bytes[start] == 0 {
            start += 1;
        }
        let mut v = if start == bytes.len() {
            vec![0]
        } else {
            bytes[start..].to_vec()
        };
        if v[0] & 0x80 != 0 {
            v.insert(0, 0x00);
        }
        Self::primitive(TAG_INTEGER, v)
    }

    /// NULL.
    #[must_use]
    pub fn null() -> DerNode {
        Self::primitive(TAG_NULL, Vec::new())
    }

    /// OBJECT IDENTIFIER from a dotted-decimal string.
    pub fn object_identifier(dotted: &str) -> SmimeResult<DerNode> {
        Ok(Self::primitive(TAG_OBJECT_IDENTIFIER, oid_to_bytes(dotted)?))
    }

    /// Context-specific constructed tag `[number]` wrapping children
    /// (EXPLICIT tagging: the children keep their own tags).
    #[must_use]
    pub fn context(number: u32, children: Vec<DerNode>) -> DerNode {
        Self::assemble(TagClass::ContextSpecific, number, children)
    }

    /// Context-specific constructed tag `[number]` with raw content octets
    /// (IMPLICIT tagging over a stripped SET, e.g. the certificates field).
    #[must_use]
    pub fn context_implicit(number: u32, content: Vec<u8>) -> DerNode {
        DerNode {
            class: TagClass::ContextSpecific,
            constructed: true,
            number,
            offset: 0,
            content,
            children: Vec::new(),
        }
    }

    // === accessors ===

    #[must_use]
    pub fn class(&self) -> TagClass {
        self.class
    }

    #[must_use]
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    #[must_use]
    pub fn tag_number(&self) -> u32 {
        self.number
    }

    /// Byte offset of this value's identifier octet within the parsed buffer
    /// (0 for assembled nodes).
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn children(&self) -> &[DerNode] {
        &self.children
    }

    /// Child at `index`, or a parse error naming the missing position.
    pub fn child(&self, index: usize) -> SmimeResult<&DerNode> {
        self.children.get(index).ok_or_else(|| {
            SmimeError::ParseError(format!(
                "missing child {index} of value at offset {} ({} present)",
                self.offset,
                self.children.len()
            ))
        })
    }

    /// True for a universal-class value with the given tag number.
    #[must_use]
    pub fn is_universal(&self, number: u32) -> bool {
        self.class == TagClass::Universal && self.number == number
    }

    /// True for a context-specific value with the given tag number.
    #[must_use]
    pub fn is_context(&self, number: u32) -> bool {
        self.class == TagClass::ContextSpecific && self.number == number
    }

    /// Dotted-decimal form of an OBJECT IDENTIFIER value.
    pub fn oid_string(&self) -> SmimeResult<String> {
        if !self.is_universal(TAG_OBJECT_IDENTIFIER) {
            return Err(SmimeError::ParseError(format!(
                "expected OBJECT IDENTIFIER at offset {}, got tag {}",
                self.offset, self.number
            )));
        }
        oid_to_string(&self.content)
    }
}

/// Decode a definite-length field at `pos`; returns (length, octets used).
fn decode_length(bytes: &[u8], pos: usize) -> SmimeResult<(usize, usize)> {
    let first = *bytes
        .get(pos)
        .ok_or_else(|| SmimeError::ParseError(format!("truncated DER length at offset {pos}")))?;
    if first < 0x80 {
        return Ok((usize::from(first), 1));
    }
    if first == 0x80 {
        return Err(SmimeError::ParseError(format!(
            "indefinite length is not valid DER (offset {pos})"
        )));
    }
    let count = usize::from(first & 0x7f);
    if count > 4 {
        return Err(SmimeError::ParseError(format!(
            "unsupported DER length of {count} octets (offset {pos})"
        )));
    }
    let mut len: usize = 0;
    for i in 0..count {
        let b = *bytes.get(pos + 1 + i).ok_or_else(|| {
            SmimeError::ParseError(format!("truncated DER long-form length at offset {pos}"))
        })?;
        len = (len << 8) | usize::from(b);
    }
    // DER requires the minimal length form.
    if len < 128 || (count > 1 && len < (1 << (8 * (count - 1)))) {
        return Err(SmimeError::ParseError(format!(
            "non-minimal DER length encoding at offset {pos}"
        )));
    }
    Ok((len, 1 + count))
}

/// Encode a length field, choosing the minimal form (short under 128,
/// long form otherwise).
#[must_use]
pub fn encode_length(length: usize) -> Vec<u8> {
    if length < 128 {
        vec![length as u8]
    } else if length < 256 {
        vec![constants::DER_LONG_FORM_1_BYTE, length as u8]
    } else if length < 65536 {
        vec![
            constants::DER_LONG_FORM_2_BYTE,
            (length >> 8) as u8,
            (length & 0xFF) as u8,
        ]
    } else if length < 1 << 24 {
        vec![
            constants::DER_LONG_FORM_3_BYTE,
            ((length >> 16) & 0xFF) as u8,
            ((length >> 8) & 0xFF) as u8,
            (length & 0xFF) as u8,
        ]
    } else {
        vec![
            constants::DER_LONG_FORM_4_BYTE,
            ((length >> 24) & 0xFF) as u8,
            ((length >> 16) & 0xFF) as u8,
            ((length >> 8) & 0xFF) as u8,
            (length & 0xFF) as u8,
        ]
    }
}

/// Dotted-decimal OID string to content octets.
pub fn oid_to_bytes(dotted: &str) -> SmimeResult<Vec<u8>> {
    let arcs: Vec<u128> = dotted
        .split('.')
        .map(|part| {
            part.parse::<u128>().map_err(|_| {
                SmimeError::ParseError(format!("invalid OID component in \"{dotted}\""))
            })
        })
        .collect::<SmimeResult<_>>()?;
    if arcs.len() < 2 {
        return Err(SmimeError::ParseError(format!(
            "OID \"{dotted}\" needs at least two components"
        )));
    }
    if arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
        return Err(SmimeError::ParseError(format!(
            "invalid OID root arcs in \"{dotted}\""
        )));
    }
    let mut out = Vec::new();
    encode_base128(arcs[0] * 40 + arcs[1], &mut out);
    for &arc in &arcs[2..] {
        encode_base128(arc, &mut out);
    }
    Ok(out)
}

fn encode_base128(value: u128, out: &mut Vec<u8>) {
    let mut stack = [0u8; 19];
    let mut n = 0;
    let mut v = value;
    loop {
        stack[n] = (v & 0x7f) as u8;
        n += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    while n > 1 {
        n -= 1;
        out.push(stack[n] | 0x80);
    }
    out.push(stack[0]);
}

/// OID content octets to dotted-decimal string.
pub fn oid_to_string(bytes: &[u8]) -> SmimeResult<String> {
    if bytes.is_empty() {
        return Err(SmimeError::ParseError("empty OID value".to_string()));
    }
    let mut arcs: Vec<u128> = Vec::new();
    let mut acc: u128 = 0;
    let mut in_arc = false;
    for &b in bytes {
        acc = acc
            .checked_shl(7)
            .ok_or_else(|| SmimeError::ParseError("OID component overflow".to_string()))?
            | u128::from(b & 0x7f);
        in_arc = true;
        if b & 0x80 == 0 {
            arcs.push(acc);
            acc = 0;
            in_arc = false;
        }
    }
    if in_arc {
        return Err(SmimeError::ParseError(
            "truncated OID component".to_string(),
        ));
    }
    let first = arcs[0];
    let (root, second) = if first < 40 {
        (0, first)
    } else if first < 80 {
        (1, first - 40)
    } else {
        (2, first - 80)
    };
    let mut parts = vec![root.to_string(), second.to_string()];
    parts.extend(arcs[1..].iter().map(u128::to_string));
    Ok(parts.join("."))
}
