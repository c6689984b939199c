//! Cryptographic primitives for the standard security handler

mod rc4;

pub(crate) use rc4::{rc4_process, Rc4KeyCache};

use md5::{Digest, Md5};

/// Get MD5 as a 16-byte binary digest
pub(crate) fn md5_16(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}
