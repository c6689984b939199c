//! Revision-2 key derivation: O value, U value, P value, document key

use log::debug;

use super::{DocumentKeys, PASSWORD_PADDING};
use crate::crypto::{md5_16, rc4_process, Rc4KeyCache};
use crate::error::ProtectionResult;

/// Length of the document encryption key in bytes (40-bit, revision 2).
pub(crate) const KEY_LENGTH: usize = 5;

/// Pad or truncate a password to exactly 32 bytes.
pub(crate) fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let len = password.len().min(32);
    padded[..len].copy_from_slice(&password[..len]);
    padded[len..].copy_from_slice(&PASSWORD_PADDING[..32 - len]);
    padded
}

/// O value: the padded user password under RC4, keyed by the first five
/// digest bytes of the padded owner password.
fn compute_o_value(
    cache: &mut Rc4KeyCache,
    padded_user: &[u8; 32],
    padded_owner: &[u8; 32],
) -> ProtectionResult<[u8; 32]> {
    let digest = md5_16(padded_owner);
    let encrypted = rc4_process(cache, &digest[..KEY_LENGTH], padded_user)?;

    let mut o_value = [0u8; 32];
    o_value.copy_from_slice(&encrypted);
    Ok(o_value)
}

/// Document key: first five bytes of MD5 over the padded user password,
/// the O value, the protection byte, and three 0xFF bytes.
fn compute_encryption_key(
    padded_user: &[u8; 32],
    o_value: &[u8; 32],
    protection: u8,
) -> [u8; KEY_LENGTH] {
    let mut message = Vec::with_capacity(68);
    message.extend_from_slice(padded_user);
    message.extend_from_slice(o_value);
    message.push(protection);
    message.extend_from_slice(&[0xFF, 0xFF, 0xFF]);

    let digest = md5_16(&message);
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&digest[..KEY_LENGTH]);
    key
}

/// U value (revision 2): the padding string under RC4 with the document
/// key. Higher revisions mix in the file identifier here; revision 2 does
/// not, which is why the trailer carries an empty /ID array.
fn compute_u_value(
    cache: &mut Rc4KeyCache,
    key: &[u8; KEY_LENGTH],
) -> ProtectionResult<[u8; 32]> {
    let encrypted = rc4_process(cache, key, &PASSWORD_PADDING)?;

    let mut u_value = [0u8; 32];
    u_value.copy_from_slice(&encrypted);
    Ok(u_value)
}

/// P value: the protection byte complemented to 8 bits, plus one, negated.
pub(crate) fn compute_p_value(protection: u8) -> i32 {
    -((i32::from(protection) ^ 255) + 1)
}

/// Derive every per-document value in one pass.
pub(crate) fn derive_document_keys(
    cache: &mut Rc4KeyCache,
    user_password: &[u8],
    owner_password: &[u8],
    protection: u8,
) -> ProtectionResult<DocumentKeys> {
    let padded_user = pad_password(user_password);
    let padded_owner = pad_password(owner_password);

    let o_value = compute_o_value(cache, &padded_user, &padded_owner)?;
    let encryption_key = compute_encryption_key(&padded_user, &o_value, protection);
    let u_value = compute_u_value(cache, &encryption_key)?;
    let p_value = compute_p_value(protection);
    debug!("derived document keys, protection byte {:#04x}", protection);

    Ok(DocumentKeys {
        encryption_key,
        o_value,
        u_value,
        p_value,
    })
}
