//! Sealed-box interface (spec section 4.2): the contract with the external
//! hardware-token oracle. A `SealedBox` carries `{recipient_pubkey,
//! ephemeral_pubkey, nonce, ciphertext}`. `seal` needs no external device;
//! `unseal` needs a capability that can perform the recipient's private-key
//! half of ECDH.

extern crate alloc;

use alloc::vec::Vec;

use rand_core::OsRng;
use x25519_dalek::{EphemeralSecret, PublicKey as X25519PublicKey, StaticSecret};

use crate::aead;
use crate::codec::{require_field, Reader, Writer};
use crate::curve::EcPubkey;
use crate::error::{EboxError, Result};
use crate::kdf;

/// Maximum ciphertext length a sealed box may carry (spec section 4.2).
pub const MAX_CIPHERTEXT_BYTES: usize = 1 << 24;

const WIRE_VERSION: u8 = 1;

const TAG_RECIPIENT_PUBKEY: u8 = 1;
const TAG_EPHEMERAL_PUBKEY: u8 = 2;
const TAG_NONCE: u8 = 3;
const TAG_CIPHERTEXT: u8 = 4;

/// An ECDH+AEAD envelope addressed to a recipient's EC public key.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SealedBox {
    recipient_pubkey: EcPubkey,
    ephemeral_pubkey: EcPubkey,
    nonce: [u8; aead::NONCE_BYTES],
    ciphertext: Vec<u8>,
}

/// Capability supplied by the external hardware-token oracle: perform ECDH
/// between the device-resident private key matching `recipient_pubkey` and
/// `ephemeral_pubkey`. Returns `NO_KEY` if the device holds no matching key.
///
/// The core never sees a raw private key; this trait is the entire surface
/// it needs from the oracle (spec section 1 / section 9 "Oracle abstraction").
pub trait EcdhOracle {
    /// Compute the ECDH shared secret for `recipient_pubkey` against
    /// `ephemeral_pubkey`, using private key material held by the oracle.
    fn ecdh(&self, recipient_pubkey: &EcPubkey, ephemeral_pubkey: &EcPubkey) -> Result<[u8; 32]>;
}

/// An oracle backed by an in-process `StaticSecret`, for tests and for
/// callers who hold the private key directly rather than through a
/// hardware device.
pub struct StaticSecretOracle {
    pubkey: EcPubkey,
    secret: StaticSecret,
}

impl StaticSecretOracle {
    pub fn new(secret: StaticSecret) -> Self {
        let pubkey = EcPubkey::from_x25519(X25519PublicKey::from(&secret));
        Self { pubkey, secret }
    }

    pub fn pubkey(&self) -> &EcPubkey {
        &self.pubkey
    }
}

impl EcdhOracle for StaticSecretOracle {
    fn ecdh(&self, recipient_pubkey: &EcPubkey, ephemeral_pubkey: &EcPubkey) -> Result<[u8; 32]> {
        // Constant-time: which key(s) a token holds should not leak through
        // a timing side channel on an attacker-suppliable recipient pubkey.
        if !recipient_pubkey.ct_eq(&self.pubkey) {
            return Err(EboxError::NoKey);
        }
        let ephemeral = ephemeral_pubkey.to_x25519()?;
        Ok(*self.secret.diffie_hellman(&ephemeral).as_bytes())
    }
}

impl SealedBox {
    /// Seal `plaintext` to `recipient_pubkey`. Generates a fresh ephemeral
    /// EC keypair, derives an AEAD key via ECDH + HKDF-SHA256, and encrypts
    /// with a random 12-byte nonce. No external device needed.
    pub fn seal(recipient_pubkey: &EcPubkey, plaintext: &[u8]) -> Result<Self> {
        if plaintext.len() > MAX_CIPHERTEXT_BYTES {
            return Err(EboxError::InvalidArg(
                "plaintext too large for a sealed box".into(),
            ));
        }
        let recipient = recipient_pubkey.to_x25519()?;

        let ephemeral_secret = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_pub = EcPubkey::from_x25519(X25519PublicKey::from(&ephemeral_secret));
        let shared = ephemeral_secret.diffie_hellman(&recipient);

        let key = kdf::derive_sealedbox_key(
            shared.as_bytes(),
            ephemeral_pub.point(),
            recipient_pubkey.point(),
        )?;
        let nonce = aead::random_nonce()?;
        let ciphertext = aead::seal(&key, &nonce, plaintext, &[])?;

        if ciphertext.len() > MAX_CIPHERTEXT_BYTES {
            return Err(EboxError::InvalidArg("sealed ciphertext exceeds 2^24 bytes".into()));
        }

        Ok(Self {
            recipient_pubkey: recipient_pubkey.clone(),
            ephemeral_pubkey: ephemeral_pub,
            nonce,
            ciphertext,
        })
    }

    /// Unseal using `oracle` to perform the recipient-side ECDH.
    ///
    /// Failure modes: `NO_KEY` if the oracle has no matching private key,
    /// `AUTH_FAILED` if the AEAD tag does not verify.
    pub fn unseal(&self, oracle: &dyn EcdhOracle) -> Result<Vec<u8>> {
        let shared = oracle.ecdh(&self.recipient_pubkey, &self.ephemeral_pubkey)?;
        let key = kdf::derive_sealedbox_key(
            &shared,
            self.ephemeral_pubkey.point(),
            self.recipient_pubkey.point(),
        )?;
        aead::open(&key, &self.nonce, &self.ciphertext, &[])
    }

    pub fn recipient_pubkey(&self) -> &EcPubkey {
        &self.recipient_pubkey
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_u8(WIRE_VERSION);
        w.put_field(TAG_RECIPIENT_PUBKEY, &self.recipient_pubkey.to_bytes());
        w.put_field(TAG_EPHEMERAL_PUBKEY, &self.ephemeral_pubkey.to_bytes());
        w.put_field(TAG_NONCE, &self.nonce);
        w.put_field(TAG_CIPHERTEXT, &self.ciphertext);
        w.put_end();
    }

    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let version = r.get_u8()?;
        if version != WIRE_VERSION {
            return Err(EboxError::UnsupportedVersion {
                found: version,
                max_supported: WIRE_VERSION,
            });
        }
        let fields = r.get_fields()?;
        let recipient_pubkey =
            EcPubkey::from_bytes(require_field(&fields, TAG_RECIPIENT_PUBKEY, "recipient_pubkey")?)?;
        let ephemeral_pubkey =
            EcPubkey::from_bytes(require_field(&fields, TAG_EPHEMERAL_PUBKEY, "ephemeral_pubkey")?)?;
        let nonce_bytes = require_field(&fields, TAG_NONCE, "nonce")?;
        if nonce_bytes.len() != aead::NONCE_BYTES {
            return Err(EboxError::InvalidFormat("sealed box nonce must be 12 bytes".into()));
        }
        let mut nonce = [0u8; aead::NONCE_BYTES];
        nonce.copy_from_slice(nonce_bytes);
        let ciphertext = require_field(&fields, TAG_CIPHERTEXT, "ciphertext")?.clone();
        if ciphertext.len() > MAX_CIPHERTEXT_BYTES {
            return Err(EboxError::InvalidFormat("sealed box ciphertext exceeds 2^24 bytes".into()));
        }

        Ok(Self {
            recipient_pubkey,
            ephemeral_pubkey,
            nonce,
            ciphertext,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> (EcPubkey, StaticSecretOracle) {
        let secret = StaticSecret::random_from_rng(OsRng);
        let oracle = StaticSecretOracle::new(secret);
        (oracle.pubkey().clone(), oracle)
    }

    #[test]
    fn seal_unseal_roundtrip() {
        let (pk, oracle) = keypair();
        let sb = SealedBox::seal(&pk, b"master-key-bytes").unwrap();
        let pt = sb.unseal(&oracle).unwrap();
        assert_eq!(pt, b"master-key-bytes");
    }

    #[test]
    fn wire_roundtrip() {
        let (pk, oracle) = keypair();
        let sb = SealedBox::seal(&pk, b"share").unwrap();
        let bytes = sb.to_bytes();
        let sb2 = SealedBox::from_bytes(&bytes).unwrap();
        assert_eq!(sb2.unseal(&oracle).unwrap(), b"share");
    }

    #[test]
    fn wrong_oracle_yields_no_key() {
        let (pk, _) = keypair();
        let (_other_pk, other_oracle) = keypair();
        let sb = SealedBox::seal(&pk, b"x").unwrap();
        assert_eq!(sb.unseal(&other_oracle), Err(EboxError::NoKey));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let (pk, oracle) = keypair();
        let sb = SealedBox::seal(&pk, b"x").unwrap();
        let mut bytes = sb.to_bytes();
        *bytes.last_mut().unwrap() ^= 0x01;
        let sb2 = SealedBox::from_bytes(&bytes).unwrap();
        assert_eq!(sb2.unseal(&oracle), Err(EboxError::AuthFailed));
    }
}
