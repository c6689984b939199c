//! Key material and derivation for the standard security handler

mod key_derivation;
mod object_encryption;

pub(crate) use key_derivation::derive_document_keys;
pub(crate) use object_encryption::object_key;

use zeroize::ZeroizeOnDrop;

/// Padding string from the PDF spec. Pads short passwords to 32 bytes and
/// is the plaintext behind the revision-2 U value.
pub(crate) const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
    0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
    0x69, 0x7A,
];

/// Values fixed once per session by `set_protection`.
#[derive(Clone, ZeroizeOnDrop)]
pub(crate) struct DocumentKeys {
    /// 40-bit document encryption key; never written to the file
    pub(crate) encryption_key: [u8; 5],
    /// O entry of the encryption dictionary
    pub(crate) o_value: [u8; 32],
    /// U entry of the encryption dictionary
    pub(crate) u_value: [u8; 32],
    /// P entry of the encryption dictionary
    #[zeroize(skip)]
    pub(crate) p_value: i32,
}
