//! HKDF-SHA256 key derivation (spec section 4.2).
//!
//! `key = HKDF-SHA256(ecdh_shared_secret, salt=None, info=ephemeral_pub || recipient_pub)`

extern crate alloc;

use alloc::vec::Vec;

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{EboxError, Result};

/// Domain-separation label mixed into every derivation, so an ebox key
/// can never be confused with a key derived for an unrelated protocol
/// even if a shared secret were ever reused.
pub const INFO_LABEL: &[u8] = b"ebox-sealedbox-v1";

/// Domain-separation label for stream container subkeys (spec section 4.7).
pub const STREAM_INFO_LABEL: &[u8] = b"ebox-stream-v1";

/// Derive a 32-byte AEAD key from an ECDH shared secret and the two public
/// keys that produced it, per spec section 4.2: `info = ephemeral_pub || recipient_pub`.
pub fn derive_sealedbox_key(
    shared_secret: &[u8],
    ephemeral_pub: &[u8],
    recipient_pub: &[u8],
) -> Result<[u8; 32]> {
    let mut info = Vec::with_capacity(INFO_LABEL.len() + ephemeral_pub.len() + recipient_pub.len());
    info.extend_from_slice(INFO_LABEL);
    info.extend_from_slice(ephemeral_pub);
    info.extend_from_slice(recipient_pub);

    let hk = Hkdf::<Sha256>::new(None, shared_secret);
    let mut out = [0u8; 32];
    hk.expand(&info, &mut out)
        .map_err(|_| EboxError::Crypto("HKDF expand failed (output too long)".into()))?;
    Ok(out)
}

/// Derive a 32-byte AEAD subkey for one stream session: `HKDF-SHA256(key,
/// salt=None, info=STREAM_INFO_LABEL || session_prefix)` (spec section 4.7).
/// Binding the random per-stream prefix into the subkey means a key that
/// repeatedly seals streams never reuses the same AEAD key twice.
pub fn derive_stream_key(key: &[u8], session_prefix: &[u8]) -> Result<[u8; 32]> {
    let mut info = Vec::with_capacity(STREAM_INFO_LABEL.len() + session_prefix.len());
    info.extend_from_slice(STREAM_INFO_LABEL);
    info.extend_from_slice(session_prefix);

    let hk = Hkdf::<Sha256>::new(None, key);
    let mut out = [0u8; 32];
    hk.expand(&info, &mut out)
        .map_err(|_| EboxError::Crypto("HKDF expand failed (output too long)".into()))?;
    Ok(out)
}
