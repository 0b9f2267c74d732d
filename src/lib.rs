//! # ebox
//!
//! Key-escrow containers: seal a secret under one or more recovery
//! policies, each policy backed by a hardware token's ECDH oracle.
//!
//! A [`Template`] describes the policies (one primary token, or a
//! k-of-n threshold over recovery tokens) without holding any secret.
//! [`Ebox::create`] seals a key (and optional companion token) against a
//! template, producing an [`Ebox`] that can be serialized, stored, and
//! later unlocked by whichever token the template names.
//!
//! ## Quick start
//!
//! ```rust
//! use ebox::{Ebox, StaticSecretOracle, TemplateBuilder, TemplatePart};
//! use x25519_dalek::StaticSecret;
//!
//! // The token's secret never leaves the token; the oracle models that boundary.
//! let token_secret = StaticSecret::random_from_rng(rand_core::OsRng);
//! let oracle = StaticSecretOracle::new(token_secret);
//! let pubkey = oracle.pubkey().clone();
//!
//! let template = TemplateBuilder::new()
//!     .add_config(
//!         ebox::ConfigBuilder::primary()
//!             .add_part(TemplatePart::new(pubkey))
//!             .unwrap()
//!             .finish()
//!             .unwrap(),
//!     )
//!     .build();
//!
//! let mut container = Ebox::create(&template, b"a 32-byte master key.........!!", None).unwrap();
//! container.unseal_primary_part(0, &oracle).unwrap();
//! container.unlock(0).unwrap();
//! assert_eq!(container.key().unwrap(), b"a 32-byte master key.........!!");
//! ```
//!
//! ## Security properties
//!
//! - **Token secrets never touch this crate**: every unseal goes through
//!   the [`EcdhOracle`] trait, which a real hardware token implements
//!   without ever exporting its private scalar.
//! - **Threshold recovery**: an n-of-k recovery policy tolerates the loss
//!   of up to `n - k` tokens without losing the escrowed secret, and
//!   cannot be reconstructed by fewer than `k`.
//! - **Uniform auth failures**: a wrong share, a tampered ciphertext, and
//!   a corrupted wire format are all reported as the error table in
//!   [`EboxError`] describes, never as a panic.
//! - **Zeroized secret memory**: every key, share, and token that
//!   transits this crate lives in a [`SecretBytes`], wiped on drop.
//!
//! ## What's NOT provided
//!
//! - Storage, transport, or discovery of ebox/challenge bytes
//! - The hardware-token side of [`EcdhOracle`] (PIN entry, touch policy,
//!   on-device key generation)
//! - FIPS certification or constant-time guarantees beyond what the
//!   underlying AEAD/ECDH crates themselves provide

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc(html_root_url = "https://docs.rs/ebox/0.1.0")]

extern crate alloc;

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

mod aead;
pub mod codec;
pub mod curve;
mod error;
mod kdf;
mod secret;
mod shamir;

mod sealedbox;
mod template;

mod challenge;
mod ebox;
mod stream;

#[doc(hidden)]
pub mod wordlist;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub use error::EboxError;
pub use secret::SecretBytes;

pub use curve::{EcPubkey, CURVE_X25519};

pub use sealedbox::{EcdhOracle, SealedBox, StaticSecretOracle, MAX_CIPHERTEXT_BYTES};

pub use template::{
    ConfigBuilder, Template, TemplateBuilder, TemplateConfig, TemplatePart, TEMPLATE_MAGIC,
    TEMPLATE_VERSION,
};

pub use ebox::{Ebox, EboxConfig, EboxPart, EBOX_MAGIC, EBOX_VERSION};

pub use challenge::{Challenge, ChallengeType, RecoverySession};

pub use stream::{Stream, StreamHeader, StreamItem, AEAD_ID_AES256_GCM, DEFAULT_CHUNK_SIZE};

/// Result alias used throughout the public API.
pub type Result<T> = core::result::Result<T, EboxError>;

/// Wire format version this build writes and the newest it understands
/// when reading (spec section 4.1/8).
pub const PROTOCOL_VERSION: u8 = EBOX_VERSION;

/// Crate version, exposed for diagnostics and `ebox inspect`-style tooling.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
