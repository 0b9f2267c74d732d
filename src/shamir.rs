//! Shamir secret sharing (spec section 4.4/4.6): byte-wise GF(2^8)
//! polynomial splitting, delegated to the `sharks` crate (the external
//! "Shamir secret sharing arithmetic" collaborator named in spec section 1).
//!
//! Share indices run 1..=n and correspond to part index within a recovery
//! config (spec section 4.4 step c). Combining always uses the
//! lowest-indexed `k` available shares, for deterministic replay (spec
//! section 4.6 "Ordering & tie-breaking").

extern crate alloc;

use alloc::vec::Vec;

use sharks::{Share, Sharks};

use crate::error::{EboxError, Result};

/// One Shamir share, tagged with its 1-based part index.
#[derive(Clone)]
pub struct ShamirShare {
    pub index: u8,
    pub bytes: Vec<u8>,
}

/// Split `secret` into `n` shares with reconstruction threshold `k`.
/// Share `i` (1-based) is meant for part `i` of the recovery config.
pub fn split(secret: &[u8], n: u8, k: u8) -> Result<Vec<ShamirShare>> {
    if k == 0 || n == 0 || k > n {
        return Err(EboxError::InvalidArg(alloc::format!(
            "threshold {k} must be in 1..={n}"
        )));
    }
    let sharks = Sharks(k);
    let dealer = sharks.dealer(secret);
    Ok(dealer
        .take(n as usize)
        .map(|share| ShamirShare {
            index: share.x.0,
            bytes: Vec::from(&share),
        })
        .collect())
}

/// Reconstruct the secret from at least `k` shares. The caller is
/// responsible for picking the deterministic lowest-indexed subset when
/// more than `k` shares are on hand (spec section 4.6).
pub fn combine(k: u8, shares: &[ShamirShare]) -> Result<Vec<u8>> {
    if shares.len() < k as usize {
        return Err(EboxError::Insufficient {
            have: shares.len(),
            need: k as usize,
        });
    }
    let parsed: Result<Vec<Share>> = shares
        .iter()
        .map(|s| Share::try_from(s.bytes.as_slice()).map_err(|_| {
            EboxError::InvalidFormat("malformed Shamir share".into())
        }))
        .collect();
    let parsed = parsed?;
    Sharks(k)
        .recover(parsed.as_slice())
        .map_err(|_| EboxError::Corrupt("Shamir reconstruction failed".into()))
}
