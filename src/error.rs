//! Unified error vocabulary for the ebox core (spec section 7).
//!
//! Every fallible operation in this crate returns `Result<_, EboxError>`.
//! Errors are reported, never swallowed, and the library never retries
//! internally; callers decide whether a failure (e.g. `AUTH_FAILED` on one
//! part) is recoverable by trying another part/config.

extern crate alloc;

use alloc::string::String;
use core::fmt;

/// One of the error kinds named in the core's error table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EboxError {
    /// Malformed serialized input.
    InvalidFormat(String),
    /// Version field beyond what this implementation understands.
    UnsupportedVersion { found: u8, max_supported: u8 },
    /// Violated precondition (threshold out of range, empty key, ...).
    InvalidArg(String),
    /// Operation not legal in the object's current state.
    InvalidState(String),
    /// AEAD tag or signature mismatch.
    AuthFailed,
    /// Provider lacks the required key material.
    NoKey,
    /// Fewer than threshold shares available.
    Insufficient { have: usize, need: usize },
    /// Integrity-checked payload failed to verify.
    Corrupt(String),
    /// Part/config already satisfied.
    Again(String),
    /// RNG or cryptographic primitive failure.
    Crypto(String),
    /// Allocation failure.
    NoMemory,
}

impl fmt::Display for EboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(msg) => write!(f, "invalid format: {msg}"),
            Self::UnsupportedVersion { found, max_supported } => write!(
                f,
                "unsupported version: {found} (this build supports up to {max_supported})"
            ),
            Self::InvalidArg(msg) => write!(f, "invalid argument: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::AuthFailed => write!(f, "authentication failed"),
            Self::NoKey => write!(f, "no matching key material"),
            Self::Insufficient { have, need } => {
                write!(f, "insufficient shares: have {have}, need {need}")
            }
            Self::Corrupt(msg) => write!(f, "corrupt payload: {msg}"),
            Self::Again(msg) => write!(f, "already satisfied: {msg}"),
            Self::Crypto(msg) => write!(f, "crypto failure: {msg}"),
            Self::NoMemory => write!(f, "allocation failure"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EboxError {}

/// Shorthand used across modules to avoid repeating `EboxError::` everywhere.
pub type Result<T> = core::result::Result<T, EboxError>;
