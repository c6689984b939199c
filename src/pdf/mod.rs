//! PDF token types and string encoding utilities

mod string;

pub use string::{bytes_to_hex, escape_literal, hex_to_bytes, text_string_bytes, unescape_literal};

/// A string-bearing token passing through the writer on its way out.
///
/// Payloads carry the token's wire form: `Literal` holds escaped bytes,
/// `Hex` holds hex digits, `Stream` holds the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentToken {
    /// Literal string `(...)` payload, still escaped
    Literal(Vec<u8>),
    /// Hex string `<...>` payload, hex digits
    Hex(Vec<u8>),
    /// Stream body bytes
    Stream(Vec<u8>),
}
