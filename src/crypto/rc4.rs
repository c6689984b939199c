//! RC4 stream cipher with a last-key schedule cache
//!
//! RC4 is the cipher the revision-2 security handler applies to every
//! string and stream. Scheduling the 256-byte permutation table dominates
//! the cost of encrypting short strings, so the scheduled table for the
//! most recent key is kept in a session-owned cache and reused whenever a
//! call presents byte-identical key material.

use zeroize::ZeroizeOnDrop;

use crate::error::{ProtectionError, ProtectionResult};

/// Scheduled permutation table for the most recently used RC4 key.
///
/// Owned by a single protection session and never shared between
/// sessions. The cache is transparent: hits and misses produce identical
/// output.
#[derive(Clone, ZeroizeOnDrop)]
pub(crate) struct Rc4KeyCache {
    key: Vec<u8>,
    schedule: [u8; 256],
}

impl Rc4KeyCache {
    pub(crate) fn new() -> Self {
        Self {
            key: Vec::new(),
            schedule: [0; 256],
        }
    }
}

impl Default for Rc4KeyCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Key-scheduling algorithm, with the key repeated to fill 256 bytes.
fn key_schedule(key: &[u8]) -> [u8; 256] {
    let mut s = [0u8; 256];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }
    s
}

/// Encrypt or decrypt `data` with `key` (RC4 is symmetric).
///
/// The schedule is recomputed only when `key` differs from the bytes held
/// in `cache`; the generation loop always starts from a fresh copy of the
/// scheduled table.
pub(crate) fn rc4_process(
    cache: &mut Rc4KeyCache,
    key: &[u8],
    data: &[u8],
) -> ProtectionResult<Vec<u8>> {
    if key.is_empty() {
        return Err(ProtectionError::InvalidKeyLength(0));
    }

    if cache.key != key {
        cache.schedule = key_schedule(key);
        cache.key.clear();
        cache.key.extend_from_slice(key);
    }
    let mut s = cache.schedule;

    let mut out = Vec::with_capacity(data.len());
    let mut a = 0u8;
    let mut b = 0u8;
    for &byte in data {
        a = a.wrapping_add(1);
        b = b.wrapping_add(s[a as usize]);
        s.swap(a as usize, b as usize);
        let k = s[s[a as usize].wrapping_add(s[b as usize]) as usize];
        out.push(byte ^ k);
    }
    Ok(out)
}
