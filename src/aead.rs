//! AEAD: AES-256-GCM, used both by the sealed-box primitive and by the
//! recovery-payload / stream-chunk encryption (spec sections 4.2, 4.4, 4.7).

extern crate alloc;

use alloc::vec::Vec;

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use getrandom::getrandom;

use crate::error::{EboxError, Result};

pub const NONCE_BYTES: usize = 12;
pub const TAG_BYTES: usize = 16;

/// Generate a random 12-byte nonce.
pub fn random_nonce() -> Result<[u8; NONCE_BYTES]> {
    let mut n = [0u8; NONCE_BYTES];
    getrandom(&mut n).map_err(|e| EboxError::Crypto(alloc::format!("RNG failure: {e}")))?;
    Ok(n)
}

/// Seal (encrypt + authenticate) `plaintext` under `key`, binding `aad`.
pub fn seal(key: &[u8; 32], nonce: &[u8; NONCE_BYTES], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| EboxError::Crypto("invalid AES-256-GCM key length".into()))?;
    let n = Nonce::from_slice(nonce);
    cipher
        .encrypt(n, Payload { msg: plaintext, aad })
        .map_err(|_| EboxError::Crypto("AEAD seal failed".into()))
}

/// Open (verify + decrypt) `ciphertext` under `key`. Returns `AUTH_FAILED`
/// on any tag mismatch; the plaintext is never released otherwise.
pub fn open(key: &[u8; 32], nonce: &[u8; NONCE_BYTES], ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| EboxError::AuthFailed)?;
    let n = Nonce::from_slice(nonce);
    cipher
        .decrypt(n, Payload { msg: ciphertext, aad })
        .map_err(|_| EboxError::AuthFailed)
}
