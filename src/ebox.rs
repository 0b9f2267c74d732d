//! Sealed ebox model (spec sections 3.1, 4.4, 4.5, 6.1).
//!
//! An `Ebox` is a sealed instantiation of a `Template`: a freshly generated
//! master key, sealed once per part for PRIMARY configs, and split into
//! Shamir shares (themselves sealed per part) behind an AEAD-wrapped
//! recovery payload for RECOVERY configs.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use rand_core::{OsRng, RngCore};

use crate::aead;
use crate::codec::{require_field, Reader, Writer};
use crate::error::{EboxError, Result};
use crate::sealedbox::{EcdhOracle, SealedBox};
use crate::secret::SecretBytes;
use crate::shamir;
use crate::template::{Template, TemplateConfig, TemplatePart};

pub const EBOX_MAGIC: [u8; 2] = [0xEB, 0x0C];
pub const EBOX_VERSION: u8 = 2;

const CONFIG_TYPE_PRIMARY: u8 = 1;
const CONFIG_TYPE_RECOVERY: u8 = 2;

/// Primary sealed plaintexts are rounded up to a multiple of this many
/// bytes before sealing, so ciphertext length doesn't leak the exact key
/// or token size (SPEC_FULL.md section 2).
const PRIMARY_PADDING_BLOCK: usize = 64;

// spec section 6.1 fixes the EboxPart tag codes as
// `1=pubkey, 2=name, 3=card_auth_pubkey, 4=guid, 5=sealed_box`; slot_id
// isn't in that canonical list, so it's carried at a tag past the
// documented range rather than displacing `sealed_box`.
const TAG_PART_PUBKEY: u8 = 1;
const TAG_PART_NAME: u8 = 2;
const TAG_PART_CARD_AUTH_PUBKEY: u8 = 3;
const TAG_PART_GUID: u8 = 4;
const TAG_PART_SEALED_BOX: u8 = 5;
const TAG_PART_SLOT_ID: u8 = 6;

/// A recipient slot inside a sealed `Ebox`: the template metadata that
/// named this recipient, the sealed payload addressed to them, and the
/// transient "has this been revealed yet" decrypt-time state (spec
/// section 3.2/3.3 — reset whenever the ebox is cloned).
#[derive(Clone)]
pub struct EboxPart {
    template_part: TemplatePart,
    sealed_box: SealedBox,
    revealed: Option<SecretBytes>,
}

impl EboxPart {
    pub fn template_part(&self) -> &TemplatePart {
        &self.template_part
    }

    pub fn sealed_box(&self) -> &SealedBox {
        &self.sealed_box
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed.is_some()
    }

    /// Store a revealed share/key plaintext (used by the challenge/response
    /// protocol and by `unseal_primary_part`).
    pub(crate) fn set_revealed(&mut self, plaintext: SecretBytes) {
        self.revealed = Some(plaintext);
    }

    fn write(&self, w: &mut Writer) {
        w.put_field(TAG_PART_PUBKEY, &self.template_part.recipient_pubkey().to_bytes());
        if let Some(name) = self.template_part.name() {
            w.put_field(TAG_PART_NAME, name.as_bytes());
        }
        if let Some(cap) = self.template_part.card_auth_pubkey() {
            w.put_field(TAG_PART_CARD_AUTH_PUBKEY, &cap.to_bytes());
        }
        if let Some(guid) = self.template_part.guid() {
            w.put_field(TAG_PART_GUID, guid);
        }
        if let Some(slot) = self.template_part.slot_id() {
            w.put_field(TAG_PART_SLOT_ID, &[slot]);
        }
        w.put_field(TAG_PART_SEALED_BOX, &self.sealed_box.to_bytes());
        w.put_end();
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let fields = r.get_fields()?;
        let pubkey_bytes = require_field(&fields, TAG_PART_PUBKEY, "part pubkey")?;
        let mut part = TemplatePart::new(crate::curve::EcPubkey::from_bytes(pubkey_bytes)?);
        if let Some(name_bytes) = fields.get(&TAG_PART_NAME) {
            let name = String::from_utf8(name_bytes.clone())
                .map_err(|_| EboxError::InvalidFormat("part name is not valid UTF-8".into()))?;
            part = part.with_name(name)?;
        }
        if let Some(cap_bytes) = fields.get(&TAG_PART_CARD_AUTH_PUBKEY) {
            part = part.with_card_auth_pubkey(crate::curve::EcPubkey::from_bytes(cap_bytes)?);
        }
        if let Some(guid_bytes) = fields.get(&TAG_PART_GUID) {
            if guid_bytes.len() != 16 {
                return Err(EboxError::InvalidFormat("guid must be 16 bytes".into()));
            }
            let mut guid = [0u8; 16];
            guid.copy_from_slice(guid_bytes);
            part = part.with_guid(guid);
        }
        if let Some(slot_bytes) = fields.get(&TAG_PART_SLOT_ID) {
            if slot_bytes.len() != 1 {
                return Err(EboxError::InvalidFormat("slot_id must be 1 byte".into()));
            }
            part = part.with_slot_id(slot_bytes[0]);
        }
        let sealed_box_bytes = require_field(&fields, TAG_PART_SEALED_BOX, "sealed_box")?;
        let sealed_box = SealedBox::from_bytes(sealed_box_bytes)?;

        Ok(Self {
            template_part: part,
            sealed_box,
            revealed: None,
        })
    }
}

/// Per-config sealed state: either a primary single-part seal, or a
/// recovery config's Shamir-shared recovery key plus the AEAD-wrapped
/// `key || token` payload it unlocks.
#[derive(Clone)]
pub enum EboxConfig {
    Primary {
        part: EboxPart,
    },
    Recovery {
        threshold: u8,
        parts: Vec<EboxPart>,
        recovery_nonce: [u8; aead::NONCE_BYTES],
        recovery_ciphertext: Vec<u8>,
    },
}

impl EboxConfig {
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary { .. })
    }

    pub fn threshold(&self) -> u8 {
        match self {
            Self::Primary { .. } => 1,
            Self::Recovery { threshold, .. } => *threshold,
        }
    }

    pub fn parts(&self) -> &[EboxPart] {
        match self {
            Self::Primary { part } => core::slice::from_ref(part),
            Self::Recovery { parts, .. } => parts,
        }
    }

    pub fn parts_mut(&mut self) -> &mut [EboxPart] {
        match self {
            Self::Primary { part } => core::slice::from_mut(part),
            Self::Recovery { parts, .. } => parts,
        }
    }

    /// Count of parts whose share/key has been revealed.
    pub fn revealed_count(&self) -> usize {
        self.parts().iter().filter(|p| p.is_revealed()).count()
    }

    /// A PRIMARY config is satisfied once its sole part is revealed; a
    /// RECOVERY config once at least `threshold` parts are (spec section 3.2).
    pub fn is_satisfied(&self) -> bool {
        self.revealed_count() >= self.threshold() as usize
    }

    fn type_byte(&self) -> u8 {
        match self {
            Self::Primary { .. } => CONFIG_TYPE_PRIMARY,
            Self::Recovery { .. } => CONFIG_TYPE_RECOVERY,
        }
    }

    /// Header bytes used both on the wire and as AEAD associated data for
    /// the recovery payload (spec section 4.4 step b: `aad =
    /// config_serialized_header`).
    fn header_bytes(type_byte: u8, nparts: u8, threshold: u8) -> Vec<u8> {
        alloc::vec![type_byte, nparts, threshold]
    }

    fn write(&self, w: &mut Writer) {
        let type_byte = self.type_byte();
        let nparts = self.parts().len() as u8;
        let threshold = self.threshold();
        w.put_u8(type_byte);
        w.put_u8(nparts);
        w.put_u8(threshold);
        if let Self::Recovery {
            recovery_nonce,
            recovery_ciphertext,
            ..
        } = self
        {
            w.put_raw(recovery_nonce);
            w.put_bytes(recovery_ciphertext);
        }
        for part in self.parts() {
            part.write(w);
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let type_byte = r.get_u8()?;
        let nparts = r.get_u8()?;
        let threshold = r.get_u8()?;

        match type_byte {
            CONFIG_TYPE_PRIMARY => {
                if nparts != 1 {
                    return Err(EboxError::InvalidFormat(
                        "PRIMARY ebox config must have exactly one part".into(),
                    ));
                }
                let part = EboxPart::read(r)?;
                Ok(Self::Primary { part })
            }
            CONFIG_TYPE_RECOVERY => {
                let nonce_bytes = r.get_raw(aead::NONCE_BYTES)?;
                let mut recovery_nonce = [0u8; aead::NONCE_BYTES];
                recovery_nonce.copy_from_slice(nonce_bytes);
                let recovery_ciphertext = r.get_bytes()?;
                if threshold == 0 || (threshold as usize) > nparts as usize || nparts == 0 {
                    return Err(EboxError::InvalidFormat(format!(
                        "RECOVERY config threshold {threshold} invalid for {nparts} parts"
                    )));
                }
                let mut parts = Vec::with_capacity(nparts as usize);
                for _ in 0..nparts {
                    parts.push(EboxPart::read(r)?);
                }
                Ok(Self::Recovery {
                    threshold,
                    parts,
                    recovery_nonce,
                    recovery_ciphertext,
                })
            }
            other => Err(EboxError::InvalidFormat(format!(
                "unknown ebox config type byte {other}"
            ))),
        }
    }
}

/// A sealed key-escrow container (spec section 3.1).
#[derive(Clone)]
pub struct Ebox {
    version: u8,
    ciphertext_padding: u16,
    template: Template,
    configs: Vec<EboxConfig>,
    recovered_key: Option<SecretBytes>,
    recovered_token: Option<SecretBytes>,
}

/// `key || token` plaintext codec shared by primary seals and the
/// recovery AEAD payload, so both paths round-trip an optional token
/// (spec section 9 Open Question).
fn encode_key_token(key: &[u8], token: Option<&[u8]>, pad_to: usize) -> Vec<u8> {
    let mut w = Writer::new();
    w.put_u8(if token.is_some() { 1 } else { 0 });
    w.put_bytes(key);
    if let Some(t) = token {
        w.put_bytes(t);
    }
    let mut bytes = w.into_bytes();
    if bytes.len() < pad_to {
        bytes.resize(pad_to, 0u8);
    }
    bytes
}

fn decode_key_token(bytes: &[u8]) -> Result<(Vec<u8>, Option<Vec<u8>>)> {
    let mut r = Reader::new(bytes);
    let has_token = r.get_u8()?;
    let key = r.get_bytes()?;
    let token = if has_token == 1 { Some(r.get_bytes()?) } else { None };
    Ok((key, token))
}

impl Ebox {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn configs(&self) -> &[EboxConfig] {
        &self.configs
    }

    pub fn configs_mut(&mut self) -> &mut [EboxConfig] {
        &mut self.configs
    }

    pub fn ciphertext_padding(&self) -> u16 {
        self.ciphertext_padding
    }

    /// Recovered master key, if `unlock`/`recover` has succeeded.
    pub fn key(&self) -> Option<&[u8]> {
        self.recovered_key.as_ref().map(|s| s.as_slice())
    }

    /// Recovered optional token, if present and the ebox has been unlocked.
    pub fn token(&self) -> Option<&[u8]> {
        self.recovered_token.as_ref().map(|s| s.as_slice())
    }

    /// `ebox_create(tpl, key, token?)` (spec section 4.4).
    pub fn create(tpl: &Template, key: &[u8], token: Option<&[u8]>) -> Result<Self> {
        if key.is_empty() {
            return Err(EboxError::InvalidArg("key must be non-empty".into()));
        }

        // Round every PRIMARY config's sealed plaintext up to the next
        // padding-block boundary, so the sealed box size doesn't leak the
        // exact key/token length to an observer (SPEC_FULL.md section 2).
        let natural_len = 1 + 4 + key.len() + token.map_or(0, |t| 4 + t.len());
        let max_primary_len = natural_len.div_ceil(PRIMARY_PADDING_BLOCK) * PRIMARY_PADDING_BLOCK;
        let ciphertext_padding = (max_primary_len - natural_len) as u16;

        let mut configs = Vec::with_capacity(tpl.configs().len());
        for config in tpl.configs() {
            match config {
                TemplateConfig::Primary { part } => {
                    let plaintext = encode_key_token(key, token, max_primary_len);
                    let sealed_box = SealedBox::seal(part.recipient_pubkey(), &plaintext)?;
                    configs.push(EboxConfig::Primary {
                        part: EboxPart {
                            template_part: part.clone(),
                            sealed_box,
                            revealed: None,
                        },
                    });
                }
                TemplateConfig::Recovery { threshold, parts } => {
                    let n = parts.len() as u8;
                    let mut rk = [0u8; 32];
                    OsRng.fill_bytes(&mut rk);

                    let header = EboxConfig::header_bytes(CONFIG_TYPE_RECOVERY, n, *threshold);
                    let payload = encode_key_token(key, token, 0);
                    let recovery_nonce = aead::random_nonce()?;
                    let recovery_ciphertext = aead::seal(&rk, &recovery_nonce, &payload, &header)?;

                    let shares = shamir::split(&rk, n, *threshold)?;
                    rk.iter_mut().for_each(|b| *b = 0);

                    let mut ebox_parts = Vec::with_capacity(parts.len());
                    for (part, share) in parts.iter().zip(shares.iter()) {
                        let sealed_box = SealedBox::seal(part.recipient_pubkey(), &share.bytes)?;
                        ebox_parts.push(EboxPart {
                            template_part: part.clone(),
                            sealed_box,
                            revealed: None,
                        });
                    }

                    configs.push(EboxConfig::Recovery {
                        threshold: *threshold,
                        parts: ebox_parts,
                        recovery_nonce,
                        recovery_ciphertext,
                    });
                }
            }
        }

        Ok(Self {
            version: EBOX_VERSION,
            ciphertext_padding,
            template: tpl.clone(),
            configs,
            recovered_key: None,
            recovered_token: None,
        })
    }

    /// Unseal the sole part of a PRIMARY config using `oracle`, storing
    /// the revealed plaintext on the part (spec section 4.5 precondition).
    pub fn unseal_primary_part(&mut self, config_idx: usize, oracle: &dyn EcdhOracle) -> Result<()> {
        let config = self
            .configs
            .get_mut(config_idx)
            .ok_or_else(|| EboxError::InvalidArg(format!("no config at index {config_idx}")))?;
        let EboxConfig::Primary { part } = config else {
            return Err(EboxError::InvalidArg(format!(
                "config {config_idx} is not a PRIMARY config"
            )));
        };
        let plaintext = part.sealed_box.unseal(oracle)?;
        part.revealed = Some(SecretBytes::new(plaintext));
        Ok(())
    }

    /// `ebox_unlock(ebox, config)` (spec section 4.5).
    pub fn unlock(&mut self, config_idx: usize) -> Result<()> {
        if self.recovered_key.is_some() {
            return Err(EboxError::Again("ebox is already unlocked".into()));
        }
        let config = self
            .configs
            .get(config_idx)
            .ok_or_else(|| EboxError::InvalidArg(format!("no config at index {config_idx}")))?;
        let EboxConfig::Primary { part } = config else {
            return Err(EboxError::InvalidArg(format!(
                "config {config_idx} is not a PRIMARY config"
            )));
        };
        let revealed = part.revealed.as_ref().ok_or_else(|| {
            EboxError::InvalidState("no part of this PRIMARY config has been unsealed".into())
        })?;
        let (key, token) = decode_key_token(revealed.as_slice())?;
        if key.is_empty() {
            return Err(EboxError::InvalidArg("recovered key is empty".into()));
        }
        self.recovered_key = Some(SecretBytes::new(key));
        self.recovered_token = token.map(SecretBytes::new);
        tracing::debug!(config_idx, "ebox primary unlock succeeded");
        Ok(())
    }

    /// `ebox_recover(ebox, config)` (spec section 4.6 "Recover").
    pub fn recover(&mut self, config_idx: usize) -> Result<()> {
        if self.recovered_key.is_some() {
            return Err(EboxError::Again("ebox is already unlocked".into()));
        }
        let config = self
            .configs
            .get(config_idx)
            .ok_or_else(|| EboxError::InvalidArg(format!("no config at index {config_idx}")))?;
        let EboxConfig::Recovery {
            threshold,
            parts,
            recovery_nonce,
            recovery_ciphertext,
        } = config
        else {
            return Err(EboxError::InvalidArg(format!(
                "config {config_idx} is not a RECOVERY config"
            )));
        };

        let k = *threshold as usize;
        let mut fulfilled: Vec<(u8, &SecretBytes)> = parts
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.revealed.as_ref().map(|s| ((i + 1) as u8, s)))
            .collect();
        if fulfilled.len() < k {
            return Err(EboxError::Insufficient {
                have: fulfilled.len(),
                need: k,
            });
        }
        // Deterministic tie-break: lowest-indexed k parts (spec section 4.6).
        fulfilled.sort_by_key(|(idx, _)| *idx);
        let shares: Vec<shamir::ShamirShare> = fulfilled[..k]
            .iter()
            .map(|(idx, s)| shamir::ShamirShare {
                index: *idx,
                bytes: s.as_slice().to_vec(),
            })
            .collect();

        let rk = shamir::combine(*threshold, &shares)?;
        let mut rk_arr = [0u8; 32];
        if rk.len() != 32 {
            return Err(EboxError::Corrupt("recovered recovery key has wrong length".into()));
        }
        rk_arr.copy_from_slice(&rk);

        let header = EboxConfig::header_bytes(CONFIG_TYPE_RECOVERY, parts.len() as u8, *threshold);
        let decrypted = aead::open(&rk_arr, recovery_nonce, recovery_ciphertext, &header)
            .map_err(|_| EboxError::Corrupt("recovery payload failed to authenticate".into()))?;
        rk_arr.iter_mut().for_each(|b| *b = 0);

        let (key, token) = decode_key_token(&decrypted)?;
        if key.is_empty() {
            return Err(EboxError::Corrupt("recovered key is empty".into()));
        }
        self.recovered_key = Some(SecretBytes::new(key));
        self.recovered_token = token.map(SecretBytes::new);
        tracing::debug!(config_idx, shares_used = k, "ebox recovery succeeded");
        Ok(())
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_raw(&EBOX_MAGIC);
        w.put_u8(self.version);
        w.put_u16(self.ciphertext_padding);
        w.put_u8(self.configs.len() as u8);
        for config in &self.configs {
            config.write(w);
        }
    }

    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let magic = r.get_raw(2)?;
        if magic != EBOX_MAGIC {
            return Err(EboxError::InvalidFormat("bad ebox magic".into()));
        }
        let version = r.get_u8()?;
        if version != EBOX_VERSION {
            return Err(EboxError::UnsupportedVersion {
                found: version,
                max_supported: EBOX_VERSION,
            });
        }
        let ciphertext_padding = r.get_u16()?;
        let nconfigs = r.get_u8()?;
        let mut configs = Vec::with_capacity(nconfigs as usize);
        for _ in 0..nconfigs {
            configs.push(EboxConfig::read(r)?);
        }

        // Rebuild the embedded template snapshot from the sealed configs,
        // since the ebox's template copy is the wire-format source of
        // truth for part ordering and metadata during unlock (spec
        // section 9 "Embedded template vs referenced template").
        let mut builder = crate::template::TemplateBuilder::new();
        for config in &configs {
            let parts: Vec<TemplatePart> =
                config.parts().iter().map(|p| p.template_part.clone()).collect();
            let tc = match config {
                EboxConfig::Primary { .. } => TemplateConfig::Primary {
                    part: parts.into_iter().next().ok_or_else(|| {
                        EboxError::InvalidFormat("PRIMARY config has no part".into())
                    })?,
                },
                EboxConfig::Recovery { threshold, .. } => TemplateConfig::Recovery {
                    threshold: *threshold,
                    parts,
                },
            };
            builder = builder.add_config(tc);
        }
        let template = builder.build();

        Ok(Self {
            version,
            ciphertext_padding,
            template,
            configs,
            recovered_key: None,
            recovered_token: None,
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
    use crate::sealedbox::StaticSecretOracle;
    use crate::template::{ConfigBuilder, TemplateBuilder};
    use rand_core::OsRng;
    use x25519_dalek::StaticSecret;

    fn oracle() -> (TemplatePart, StaticSecretOracle) {
        let secret = StaticSecret::random_from_rng(OsRng);
        let oracle = StaticSecretOracle::new(secret);
        (TemplatePart::new(oracle.pubkey().clone()), oracle)
    }

    #[test]
    fn primary_create_and_unlock_roundtrip() {
        let (part, oracle) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
            .build();

        let mut ebox = Ebox::create(&tpl, b"master-key-material", Some(b"a-token")).unwrap();
        ebox.unseal_primary_part(0, &oracle).unwrap();
        ebox.unlock(0).unwrap();

        assert_eq!(ebox.key().unwrap(), b"master-key-material");
        assert_eq!(ebox.token().unwrap(), b"a-token");
    }

    #[test]
    fn unlock_without_unsealing_is_invalid_state() {
        let (part, _oracle) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
            .build();
        let mut ebox = Ebox::create(&tpl, b"master-key-material", None).unwrap();
        assert!(matches!(ebox.unlock(0), Err(EboxError::InvalidState(_))));
    }

    #[test]
    fn recovery_2_of_3_happy_path() {
        let (p1, o1) = oracle();
        let (p2, o2) = oracle();
        let (p3, _o3) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(
                ConfigBuilder::recovery()
                    .add_part(p1)
                    .unwrap()
                    .add_part(p2)
                    .unwrap()
                    .add_part(p3)
                    .unwrap()
                    .set_threshold(2)
                    .unwrap()
                    .finish()
                    .unwrap(),
            )
            .build();

        let mut ebox = Ebox::create(&tpl, b"recoverable-master-key", None).unwrap();

        let EboxConfig::Recovery { parts, .. } = &mut ebox.configs[0] else {
            panic!("expected a RECOVERY config");
        };
        parts[0].revealed = Some(SecretBytes::new(parts[0].sealed_box.unseal(&o1).unwrap()));
        parts[1].revealed = Some(SecretBytes::new(parts[1].sealed_box.unseal(&o2).unwrap()));

        ebox.recover(0).unwrap();
        assert_eq!(ebox.key().unwrap(), b"recoverable-master-key");
        assert!(ebox.token().is_none());
    }

    #[test]
    fn recovery_insufficient_shares_reported() {
        let (p1, o1) = oracle();
        let (p2, _o2) = oracle();
        let (p3, _o3) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(
                ConfigBuilder::recovery()
                    .add_part(p1)
                    .unwrap()
                    .add_part(p2)
                    .unwrap()
                    .add_part(p3)
                    .unwrap()
                    .set_threshold(2)
                    .unwrap()
                    .finish()
                    .unwrap(),
            )
            .build();

        let mut ebox = Ebox::create(&tpl, b"master-key", None).unwrap();
        let EboxConfig::Recovery { parts, .. } = &mut ebox.configs[0] else {
            panic!("expected a RECOVERY config");
        };
        parts[0].revealed = Some(SecretBytes::new(parts[0].sealed_box.unseal(&o1).unwrap()));

        let err = ebox.recover(0).unwrap_err();
        assert!(matches!(err, EboxError::Insufficient { have: 1, need: 2 }));
    }

    #[test]
    fn wire_roundtrip_preserves_structure_not_revealed_state() {
        let (part, oracle) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
            .build();
        let ebox = Ebox::create(&tpl, b"master-key-material", None).unwrap();
        let bytes = ebox.to_bytes();
        let mut ebox2 = Ebox::from_bytes(&bytes).unwrap();
        assert!(ebox2.key().is_none());
        ebox2.unseal_primary_part(0, &oracle).unwrap();
        ebox2.unlock(0).unwrap();
        assert_eq!(ebox2.key().unwrap(), b"master-key-material");
    }

    #[test]
    fn short_primary_payload_gets_padded_to_block_size() {
        let (part, _o) = oracle();
        let tpl = TemplateBuilder::new()
            .add_config(ConfigBuilder::primary().add_part(part).unwrap().finish().unwrap())
            .build();
        let ebox = Ebox::create(&tpl, b"key", Some(b"tok")).unwrap();
        assert!(ebox.ciphertext_padding() > 0);
    }
}
