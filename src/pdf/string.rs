//! Literal-string escaping, hex-string codec, and text-string encoding
//!
//! These transforms bracket the cipher: parsed payloads are unescaped or
//! hex-decoded back to raw bytes before encryption, then re-encoded so
//! the emitted token stays valid literal/hex syntax.

use crate::error::ProtectionResult;

/// Escape special characters for literal-string embedding.
///
/// Backslash, parentheses, CR, LF, and TAB are escaped; every other byte
/// passes through untouched.
pub fn escape_literal(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\t' => out.extend_from_slice(b"\\t"),
            _ => out.push(byte),
        }
    }
    out
}

/// Undo literal-string escaping, recovering raw bytes.
///
/// Accepts the full literal-string grammar: the named escapes, 1-3 digit
/// octal escapes (value taken mod 256), and escaped line breaks, which
/// are swallowed. Malformed sequences pass through literally; a trailing
/// backslash is kept as-is.
pub fn unescape_literal(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let byte = data[i];
        if byte != b'\\' || i == data.len() - 1 {
            out.push(byte);
            i += 1;
            continue;
        }
        i += 1;
        match data[i] {
            b'(' | b')' | b'\\' => {
                out.push(data[i]);
                i += 1;
            }
            b'n' => {
                out.push(0x0A);
                i += 1;
            }
            b'r' => {
                out.push(0x0D);
                i += 1;
            }
            b't' => {
                out.push(0x09);
                i += 1;
            }
            b'b' => {
                out.push(0x08);
                i += 1;
            }
            b'f' => {
                out.push(0x0C);
                i += 1;
            }
            b'\r' => {
                // escaped line break, either CR or CRLF
                i += 1;
                if i < data.len() && data[i] == b'\n' {
                    i += 1;
                }
            }
            b'\n' => {
                i += 1;
            }
            b'0'..=b'7' => {
                let mut value = 0u32;
                let mut digits = 0;
                while digits < 3 && i < data.len() && matches!(data[i], b'0'..=b'7') {
                    value = value * 8 + u32::from(data[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                out.push((value & 0xFF) as u8);
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

/// Decode a hex-string payload to raw bytes.
///
/// Whitespace between digits is stripped first; an odd digit count
/// implies a trailing zero digit.
pub fn hex_to_bytes(hex_digits: &[u8]) -> ProtectionResult<Vec<u8>> {
    let mut digits: Vec<u8> = hex_digits
        .iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        digits.push(b'0');
    }
    Ok(hex::decode(&digits)?)
}

/// Re-encode raw bytes as hex-string digits.
pub fn bytes_to_hex(data: &[u8]) -> Vec<u8> {
    hex::encode(data).into_bytes()
}

/// Encode a text string for literal embedding.
///
/// Non-ASCII text converts to UTF-16BE with a byte-order mark, per the
/// PDF text-string convention; ASCII passes through as-is.
pub fn text_string_bytes(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFE, 0xFF]);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
