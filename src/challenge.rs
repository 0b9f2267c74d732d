//! Challenge/response protocol for recovery and audit verification (spec
//! section 4.6; `VERIFY_AUDIT` is a SPEC_FULL.md section 2 supplement).
//!
//! A `Challenge` is double-wrapped: the requester seals the whole record to
//! the part's recipient pubkey (the outer envelope actually transmitted to
//! the holder), and the record itself carries a second sealed box —
//! `keybox` — wrapping the requester's ephemeral pubkey. A holder must
//! unseal both layers before it can even learn which ephemeral key to
//! address its response to, so an eavesdropper who can't reach the oracle
//! never sees where to send a forged response.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use rand_core::{OsRng, RngCore};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};

use crate::codec::{require_field, Reader, Writer};
use crate::curve::EcPubkey;
use crate::ebox::{Ebox, EboxConfig};
use crate::error::{EboxError, Result};
use crate::sealedbox::{EcdhOracle, SealedBox, StaticSecretOracle};
use crate::secret::SecretBytes;
use crate::wordlist;

const WIRE_VERSION: u8 = 1;

const TYPE_RECOVERY: u8 = 1;
const TYPE_VERIFY_AUDIT: u8 = 2;

const TAG_ID: u8 = 1;
const TAG_TYPE: u8 = 2;
const TAG_DESCRIPTION: u8 = 3;
const TAG_HOSTNAME: u8 = 4;
const TAG_CREATED_AT: u8 = 5;
const TAG_NONCE: u8 = 6;
const TAG_KEYBOX: u8 = 7;

/// What a challenge is asking the holder to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeType {
    /// Reveal this part's share toward reconstructing the recovery key.
    Recovery,
    /// Prove liveness/possession without revealing any key material
    /// (SPEC_FULL.md section 2 supplement).
    VerifyAudit,
}

impl ChallengeType {
    fn to_byte(self) -> u8 {
        match self {
            Self::Recovery => TYPE_RECOVERY,
            Self::VerifyAudit => TYPE_VERIFY_AUDIT,
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            TYPE_RECOVERY => Ok(Self::Recovery),
            TYPE_VERIFY_AUDIT => Ok(Self::VerifyAudit),
            other => Err(EboxError::InvalidFormat(alloc::format!(
                "unknown challenge type byte {other}"
            ))),
        }
    }
}

/// A single challenge record (spec section 3.1, 6.1).
#[derive(Clone)]
pub struct Challenge {
    id: u8,
    ctype: ChallengeType,
    description: String,
    hostname: String,
    created_at: u64,
    nonce: [u8; 16],
    keybox: SealedBox,
}

impl Challenge {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn challenge_type(&self) -> ChallengeType {
        self.ctype
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Human-readable words for out-of-band (voice) verification, derived
    /// deterministically from the nonce.
    pub fn words(&self) -> [&'static str; 4] {
        wordlist::words_for_nonce(&self.nonce)
    }

    /// Unseal `keybox` to recover the ephemeral pubkey the response must be
    /// addressed to. Requires the same oracle capability used to unseal the
    /// outer envelope this challenge arrived in.
    pub fn ephemeral_pubkey(&self, oracle: &dyn EcdhOracle) -> Result<EcPubkey> {
        let bytes = self.keybox.unseal(oracle)?;
        EcPubkey::from_bytes(&bytes)
    }

    fn write(&self, w: &mut Writer) {
        w.put_field(TAG_ID, &[self.id]);
        w.put_field(TAG_TYPE, &[self.ctype.to_byte()]);
        w.put_field(TAG_DESCRIPTION, self.description.as_bytes());
        w.put_field(TAG_HOSTNAME, self.hostname.as_bytes());
        let mut created = Writer::new();
        created.put_u64(self.created_at);
        w.put_field(TAG_CREATED_AT, created.as_slice());
        w.put_field(TAG_NONCE, &self.nonce);
        w.put_field(TAG_KEYBOX, &self.keybox.to_bytes());
        w.put_end();
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let version = r.get_u8()?;
        if version != WIRE_VERSION {
            return Err(EboxError::UnsupportedVersion {
                found: version,
                max_supported: WIRE_VERSION,
            });
        }
        let fields = r.get_fields()?;
        let id = single_byte(&fields, TAG_ID, "challenge id")?;
        let ctype = ChallengeType::from_byte(single_byte(&fields, TAG_TYPE, "challenge type")?)?;
        let description = utf8_field(&fields, TAG_DESCRIPTION, "description")?;
        let hostname = utf8_field(&fields, TAG_HOSTNAME, "hostname")?;
        let created_bytes = require_field(&fields, TAG_CREATED_AT, "created_at")?;
        if created_bytes.len() != 8 {
            return Err(EboxError::InvalidFormat("created_at must be 8 bytes".into()));
        }
        let mut created_arr = [0u8; 8];
        created_arr.copy_from_slice(created_bytes);
        let created_at = u64::from_be_bytes(created_arr);
        let nonce_bytes = require_field(&fields, TAG_NONCE, "nonce")?;
        if nonce_bytes.len() != 16 {
            return Err(EboxError::InvalidFormat("challenge nonce must be 16 bytes".into()));
        }
        let mut nonce = [0u8; 16];
        nonce.copy_from_slice(nonce_bytes);
        let keybox = SealedBox::from_bytes(require_field(&fields, TAG_KEYBOX, "keybox")?)?;

        Ok(Self {
            id,
            ctype,
            description,
            hostname,
            created_at,
            nonce,
            keybox,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.put_u8(WIRE_VERSION);
        self.write(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r)
    }
}

fn single_byte(fields: &BTreeMap<u8, Vec<u8>>, tag: u8, what: &str) -> Result<u8> {
    let bytes = require_field(fields, tag, what)?;
    if bytes.len() != 1 {
        return Err(EboxError::InvalidFormat(alloc::format!("{what} must be 1 byte")));
    }
    Ok(bytes[0])
}

fn utf8_field(fields: &BTreeMap<u8, Vec<u8>>, tag: u8, what: &str) -> Result<String> {
    let bytes = require_field(fields, tag, what)?;
    String::from_utf8(bytes.clone())
        .map_err(|_| EboxError::InvalidFormat(alloc::format!("{what} is not valid UTF-8")))
}

struct PendingChallenge {
    challenge_id: u8,
    ephemeral_secret: StaticSecret,
    ephemeral_pubkey: EcPubkey,
}

/// Tracks outstanding challenges issued against one RECOVERY config, and
/// feeds fulfilled responses back into the `Ebox`'s per-part decrypt-time
/// state (spec section 4.6). Session-only: never serialized.
pub struct RecoverySession {
    config_idx: usize,
    outstanding: BTreeMap<usize, PendingChallenge>,
}

impl RecoverySession {
    pub fn new(config_idx: usize) -> Self {
        Self {
            config_idx,
            outstanding: BTreeMap::new(),
        }
    }

    pub fn config_idx(&self) -> usize {
        self.config_idx
    }

    /// Issue a challenge for `part_idx` within this session's config.
    /// Returns the `Challenge` record and the outer sealed envelope to
    /// transmit to the part's holder.
    pub fn gen_challenge(
        &mut self,
        ebox: &Ebox,
        part_idx: usize,
        ctype: ChallengeType,
        description: impl Into<String>,
        hostname: impl Into<String>,
        created_at_unix: u64,
    ) -> Result<SealedBox> {
        let config = ebox
            .configs()
            .get(self.config_idx)
            .ok_or_else(|| EboxError::InvalidArg(alloc::format!("no config at index {}", self.config_idx)))?;
        let EboxConfig::Recovery { parts, .. } = config else {
            return Err(EboxError::InvalidArg("challenges require a RECOVERY config".into()));
        };
        let part = parts
            .get(part_idx)
            .ok_or_else(|| EboxError::InvalidArg(alloc::format!("no part at index {part_idx}")))?;

        let ephemeral_secret = StaticSecret::random_from_rng(OsRng);
        let ephemeral_pubkey = EcPubkey::from_x25519(X25519PublicKey::from(&ephemeral_secret));

        let mut nonce = [0u8; 16];
        OsRng.fill_bytes(&mut nonce);

        let recipient_pubkey = part.template_part().recipient_pubkey();
        let keybox = SealedBox::seal(recipient_pubkey, &ephemeral_pubkey.to_bytes())?;

        // Part challenge IDs are unique and dense from 1 (spec section 3.2).
        let challenge_id = (part_idx + 1) as u8;
        let challenge = Challenge {
            id: challenge_id,
            ctype,
            description: description.into(),
            hostname: hostname.into(),
            created_at: created_at_unix,
            nonce,
            keybox,
        };

        let outer = SealedBox::seal(recipient_pubkey, &challenge.to_bytes())?;

        self.outstanding.insert(
            part_idx,
            PendingChallenge {
                challenge_id,
                ephemeral_secret,
                ephemeral_pubkey,
            },
        );

        Ok(outer)
    }

    /// Process a holder's response envelope (sealed to our ephemeral
    /// pubkey), storing the revealed share on the matching part. Returns
    /// the fulfilled part's index.
    pub fn challenge_response(&mut self, ebox: &mut Ebox, respbox: &SealedBox) -> Result<usize> {
        let part_idx = self
            .outstanding
            .iter()
            .find(|(_, pending)| pending.ephemeral_pubkey == *respbox.recipient_pubkey())
            .map(|(idx, _)| *idx)
            .ok_or_else(|| EboxError::InvalidState("no outstanding challenge matches this response".into()))?;

        let pending = self.outstanding.remove(&part_idx).ok_or_else(|| {
            EboxError::InvalidState("no outstanding challenge matches this response".into())
        })?;
        let oracle = StaticSecretOracle::new(pending.ephemeral_secret);

        let config = ebox
            .configs_mut()
            .get_mut(self.config_idx)
            .ok_or_else(|| EboxError::InvalidArg(alloc::format!("no config at index {}", self.config_idx)))?;
        let EboxConfig::Recovery { parts, .. } = config else {
            return Err(EboxError::InvalidArg("challenges require a RECOVERY config".into()));
        };
        let part = parts
            .get_mut(part_idx)
            .ok_or_else(|| EboxError::InvalidArg(alloc::format!("no part at index {part_idx}")))?;
        if part.is_revealed() {
            return Err(EboxError::Again("part is already fulfilled".into()));
        }

        let share_bytes = respbox.unseal(&oracle)?;
        part.set_revealed(SecretBytes::new(share_bytes));

        let _ = pending.challenge_id;
        Ok(part_idx)
    }
}
