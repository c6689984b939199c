//! Per-object key derivation

use super::key_derivation::KEY_LENGTH;
use crate::crypto::md5_16;

/// Length of a derived per-object key: `min(KEY_LENGTH + 5, 16)`.
pub(crate) const OBJECT_KEY_LENGTH: usize = KEY_LENGTH + 5;

/// Derive the RC4 key for one object: MD5 over the document key, the
/// three low-order bytes of the object id, and a two-byte generation
/// number.
///
/// The generation number is always written as zero, matching objects
/// produced by a fresh build. A source object carrying a nonzero
/// generation after incremental update would derive a different key under
/// a conforming reader; that case is a known limitation of this handler.
pub(crate) fn object_key(
    encryption_key: &[u8; KEY_LENGTH],
    object_id: u32,
) -> [u8; OBJECT_KEY_LENGTH] {
    let mut message = Vec::with_capacity(KEY_LENGTH + 5);
    message.extend_from_slice(encryption_key);
    message.extend_from_slice(&object_id.to_le_bytes()[..3]);
    message.extend_from_slice(&[0, 0]);

    let digest = md5_16(&message);
    let mut key = [0u8; OBJECT_KEY_LENGTH];
    key.copy_from_slice(&digest[..OBJECT_KEY_LENGTH]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 5] = [0x11, 0x22, 0x33, 0x44, 0x55];

    #[test]
    fn test_object_keys_differ_by_id() {
        assert_ne!(object_key(&KEY, 0), object_key(&KEY, 1));
    }

    #[test]
    fn test_object_key_is_idempotent() {
        assert_eq!(object_key(&KEY, 42), object_key(&KEY, 42));
    }

    #[test]
    fn test_object_key_digest_input() {
        // The digest message is key || id low 3 bytes LE || 00 00.
        let id = 0x0001_0203u32;
        let mut message = KEY.to_vec();
        message.extend_from_slice(&[0x03, 0x02, 0x01, 0x00, 0x00]);
        assert_eq!(object_key(&KEY, id), &md5_16(&message)[..OBJECT_KEY_LENGTH]);
    }
}
