//! Template/part model and builder (spec sections 3.1, 4.3, 6.1).
//!
//! A `Template` is the recovery policy — configs and parts — independent of
//! any sealed secret. It is immutable once built; `Ebox::create` clones it
//! into the sealed container, and that embedded copy is frozen (spec
//! section 3.3).

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::codec::{require_field, Reader, Writer};
use crate::curve::EcPubkey;
use crate::error::{EboxError, Result};

pub const TEMPLATE_MAGIC: [u8; 2] = [0xEB, 0xDA];
pub const TEMPLATE_VERSION: u8 = 1;

const CONFIG_TYPE_PRIMARY: u8 = 1;
const CONFIG_TYPE_RECOVERY: u8 = 2;

const TAG_PUBKEY: u8 = 1;
const TAG_NAME: u8 = 2;
const TAG_CARD_AUTH_PUBKEY: u8 = 3;
const TAG_GUID: u8 = 4;
const TAG_SLOT_ID: u8 = 5;

const MAX_NAME_BYTES: usize = 255;
const MAX_RECOVERY_PARTS: usize = 255;

/// A recipient entry in a config.
///
/// Equality is by `(guid, slot_id, pubkey)` per spec section 3.1 — two
/// parts naming the same physical token slot are the same part even if
/// e.g. their `name` differs.
#[derive(Clone, Debug)]
pub struct TemplatePart {
    recipient_pubkey: EcPubkey,
    guid: Option<[u8; 16]>,
    slot_id: Option<u8>,
    name: Option<String>,
    card_auth_pubkey: Option<EcPubkey>,
}

impl PartialEq for TemplatePart {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid
            && self.slot_id == other.slot_id
            && self.recipient_pubkey == other.recipient_pubkey
    }
}
impl Eq for TemplatePart {}

impl TemplatePart {
    pub fn new(recipient_pubkey: EcPubkey) -> Self {
        Self {
            recipient_pubkey,
            guid: None,
            slot_id: None,
            name: None,
            card_auth_pubkey: None,
        }
    }

    pub fn with_guid(mut self, guid: [u8; 16]) -> Self {
        self.guid = Some(guid);
        self
    }

    pub fn with_slot_id(mut self, slot_id: u8) -> Self {
        self.slot_id = Some(slot_id);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() > MAX_NAME_BYTES {
            return Err(EboxError::InvalidArg(alloc::format!(
                "part name {} bytes exceeds 255-byte limit",
                name.len()
            )));
        }
        self.name = Some(name);
        Ok(self)
    }

    pub fn with_card_auth_pubkey(mut self, pubkey: EcPubkey) -> Self {
        self.card_auth_pubkey = Some(pubkey);
        self
    }

    pub fn recipient_pubkey(&self) -> &EcPubkey {
        &self.recipient_pubkey
    }

    pub fn guid(&self) -> Option<&[u8; 16]> {
        self.guid.as_ref()
    }

    pub fn slot_id(&self) -> Option<u8> {
        self.slot_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn card_auth_pubkey(&self) -> Option<&EcPubkey> {
        self.card_auth_pubkey.as_ref()
    }

    fn write_fields(&self, w: &mut Writer) {
        w.put_field(TAG_PUBKEY, &self.recipient_pubkey.to_bytes());
        if let Some(name) = &self.name {
            w.put_field(TAG_NAME, name.as_bytes());
        }
        if let Some(cap) = &self.card_auth_pubkey {
            w.put_field(TAG_CARD_AUTH_PUBKEY, &cap.to_bytes());
        }
        if let Some(guid) = &self.guid {
            w.put_field(TAG_GUID, guid);
        }
        if let Some(slot) = self.slot_id {
            w.put_field(TAG_SLOT_ID, &[slot]);
        }
        w.put_end();
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self> {
        let fields = r.get_fields()?;
        let recipient_pubkey = EcPubkey::from_bytes(require_field(&fields, TAG_PUBKEY, "pubkey")?)?;
        let name = match fields.get(&TAG_NAME) {
            Some(bytes) => Some(
                String::from_utf8(bytes.clone())
                    .map_err(|_| EboxError::InvalidFormat("part name is not valid UTF-8".into()))?,
            ),
            None => None,
        };
        let card_auth_pubkey = match fields.get(&TAG_CARD_AUTH_PUBKEY) {
            Some(bytes) => Some(EcPubkey::from_bytes(bytes)?),
            None => None,
        };
        let guid = match fields.get(&TAG_GUID) {
            Some(bytes) if bytes.len() == 16 => {
                let mut arr = [0u8; 16];
                arr.copy_from_slice(bytes);
                Some(arr)
            }
            Some(_) => return Err(EboxError::InvalidFormat("guid must be 16 bytes".into())),
            None => None,
        };
        let slot_id = match fields.get(&TAG_SLOT_ID) {
            Some(bytes) if bytes.len() == 1 => Some(bytes[0]),
            Some(_) => return Err(EboxError::InvalidFormat("slot_id must be 1 byte".into())),
            None => None,
        };

        Ok(Self {
            recipient_pubkey,
            guid,
            slot_id,
            name,
            card_auth_pubkey,
        })
    }
}

/// A single configuration within a template: either a single-holder
/// primary unlock, or a k-of-n recovery policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateConfig {
    Primary { part: TemplatePart },
    Recovery { threshold: u8, parts: Vec<TemplatePart> },
}

impl TemplateConfig {
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary { .. })
    }

    pub fn parts(&self) -> &[TemplatePart] {
        match self {
            Self::Primary { part } => core::slice::from_ref(part),
            Self::Recovery { parts, .. } => parts,
        }
    }

    pub fn threshold(&self) -> u8 {
        match self {
            Self::Primary { .. } => 1,
            Self::Recovery { threshold, .. } => *threshold,
        }
    }

    fn type_byte(&self) -> u8 {
        match self {
            Self::Primary { .. } => CONFIG_TYPE_PRIMARY,
            Self::Recovery { .. } => CONFIG_TYPE_RECOVERY,
        }
    }

    pub(crate) fn write(&self, w: &mut Writer) {
        w.put_u8(self.type_byte());
        w.put_u8(self.parts().len() as u8);
        w.put_u8(self.threshold());
        for part in self.parts() {
            part.write_fields(w);
        }
    }

    pub(crate) fn read(r: &mut Reader<'_>) -> Result<Self> {
        let type_byte = r.get_u8()?;
        let nparts = r.get_u8()?;
        let threshold = r.get_u8()?;
        let mut parts = Vec::with_capacity(nparts as usize);
        for _ in 0..nparts {
            parts.push(TemplatePart::read_fields(r)?);
        }
        match type_byte {
            CONFIG_TYPE_PRIMARY => {
                if parts.len() != 1 {
                    return Err(EboxError::InvalidFormat(
                        "PRIMARY config must have exactly one part".into(),
                    ));
                }
                Ok(Self::Primary {
                    part: parts.into_iter().next().unwrap(),
                })
            }
            CONFIG_TYPE_RECOVERY => {
                if threshold == 0 || (threshold as usize) > parts.len() || parts.is_empty() {
                    return Err(EboxError::InvalidFormat(alloc::format!(
                        "RECOVERY config threshold {threshold} invalid for {} parts",
                        parts.len()
                    )));
                }
                Ok(Self::Recovery { threshold, parts })
            }
            other => Err(EboxError::InvalidFormat(alloc::format!(
                "unknown config type byte {other}"
            ))),
        }
    }
}

/// Builder for a single config, mirroring spec section 4.3's
/// `config_alloc` / `config_add_part` / `config_set_threshold` capability
/// surface.
pub struct ConfigBuilder {
    is_primary: bool,
    parts: Vec<TemplatePart>,
    threshold: Option<u8>,
}

impl ConfigBuilder {
    pub fn primary() -> Self {
        Self {
            is_primary: true,
            parts: Vec::new(),
            threshold: None,
        }
    }

    pub fn recovery() -> Self {
        Self {
            is_primary: false,
            parts: Vec::new(),
            threshold: None,
        }
    }

    /// `config_add_part`.
    pub fn add_part(mut self, part: TemplatePart) -> Result<Self> {
        if self.is_primary && !self.parts.is_empty() {
            return Err(EboxError::InvalidArg(
                "a PRIMARY config may have only one part".into(),
            ));
        }
        if !self.is_primary && self.parts.len() >= MAX_RECOVERY_PARTS {
            return Err(EboxError::InvalidArg(
                "a RECOVERY config may have at most 255 parts".into(),
            ));
        }
        self.parts.push(part);
        Ok(self)
    }

    /// `config_set_threshold`. RECOVERY only; fails `INVALID_ARG` if
    /// `n > |parts|` or this is a PRIMARY config.
    pub fn set_threshold(mut self, n: u8) -> Result<Self> {
        if self.is_primary {
            return Err(EboxError::InvalidArg(
                "threshold cannot be set on a PRIMARY config".into(),
            ));
        }
        if n == 0 || (n as usize) > self.parts.len() {
            return Err(EboxError::InvalidArg(alloc::format!(
                "threshold {n} exceeds the {} configured parts",
                self.parts.len()
            )));
        }
        self.threshold = Some(n);
        Ok(self)
    }

    /// Finalize into a `TemplateConfig`, validating spec section 3.1's
    /// cardinality invariants.
    pub fn finish(self) -> Result<TemplateConfig> {
        if self.is_primary {
            if self.parts.len() != 1 {
                return Err(EboxError::InvalidArg(
                    "a PRIMARY config requires exactly one part".into(),
                ));
            }
            Ok(TemplateConfig::Primary {
                part: self.parts.into_iter().next().unwrap(),
            })
        } else {
            if self.parts.is_empty() {
                return Err(EboxError::InvalidArg(
                    "a RECOVERY config requires at least one part".into(),
                ));
            }
            let threshold = self.threshold.unwrap_or(1);
            if threshold == 0 || (threshold as usize) > self.parts.len() {
                return Err(EboxError::InvalidArg(alloc::format!(
                    "threshold {threshold} exceeds the {} configured parts",
                    self.parts.len()
                )));
            }
            Ok(TemplateConfig::Recovery {
                threshold,
                parts: self.parts,
            })
        }
    }
}

/// The recovery policy: an ordered list of configs. Immutable after
/// construction; mutate via `clone()` + a new `TemplateBuilder`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    version: u8,
    configs: Vec<TemplateConfig>,
}

impl Template {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn configs(&self) -> &[TemplateConfig] {
        &self.configs
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_raw(&TEMPLATE_MAGIC);
        w.put_u8(self.version);
        w.put_u8(self.configs.len() as u8);
        for config in &self.configs {
            config.write(w);
        }
    }

    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let magic = r.get_raw(2)?;
        if magic != TEMPLATE_MAGIC {
            return Err(EboxError::InvalidFormat("bad template magic".into()));
        }
        let version = r.get_u8()?;
        if version != TEMPLATE_VERSION {
            return Err(EboxError::UnsupportedVersion {
                found: version,
                max_supported: TEMPLATE_VERSION,
            });
        }
        let nconfigs = r.get_u8()?;
        let mut configs = Vec::with_capacity(nconfigs as usize);
        for _ in 0..nconfigs {
            configs.push(TemplateConfig::read(r)?);
        }
        Ok(Self { version, configs })
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

/// `new_tpl()` / `tpl_add_config` builder surface (spec section 4.3).
pub struct TemplateBuilder {
    configs: Vec<TemplateConfig>,
}

impl Default for TemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self { configs: Vec::new() }
    }

    /// `tpl_add_config`.
    pub fn add_config(mut self, config: TemplateConfig) -> Self {
        self.configs.push(config);
        self
    }

    pub fn build(self) -> Template {
        Template {
            version: TEMPLATE_VERSION,
            configs: self.configs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::CURVE_X25519;

    fn fake_pubkey(byte: u8) -> EcPubkey {
        let mut bytes = alloc::vec![CURVE_X25519];
        bytes.extend_from_slice(&[byte; 32]);
        EcPubkey::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn build_and_roundtrip_mixed_template() {
        let primary = ConfigBuilder::primary()
            .add_part(TemplatePart::new(fake_pubkey(1)))
            .unwrap()
            .finish()
            .unwrap();

        let recovery = ConfigBuilder::recovery()
            .add_part(TemplatePart::new(fake_pubkey(2)))
            .unwrap()
            .add_part(TemplatePart::new(fake_pubkey(3)))
            .unwrap()
            .add_part(TemplatePart::new(fake_pubkey(4)))
            .unwrap()
            .set_threshold(2)
            .unwrap()
            .finish()
            .unwrap();

        let tpl = TemplateBuilder::new()
            .add_config(primary)
            .add_config(recovery)
            .build();

        let bytes = tpl.to_bytes();
        let tpl2 = Template::from_bytes(&bytes).unwrap();
        assert_eq!(tpl, tpl2);
    }

    #[test]
    fn recovery_threshold_over_parts_rejected() {
        let err = ConfigBuilder::recovery()
            .add_part(TemplatePart::new(fake_pubkey(1)))
            .unwrap()
            .set_threshold(2)
            .unwrap_err();
        assert!(matches!(err, EboxError::InvalidArg(_)));
    }

    #[test]
    fn primary_threshold_rejected() {
        let err = ConfigBuilder::primary().set_threshold(1).unwrap_err();
        assert!(matches!(err, EboxError::InvalidArg(_)));
    }

    #[test]
    fn part_equality_ignores_name() {
        let p1 = TemplatePart::new(fake_pubkey(5)).with_guid([1u8; 16]);
        let p2 = TemplatePart::new(fake_pubkey(5))
            .with_guid([1u8; 16])
            .with_name("different name")
            .unwrap();
        assert_eq!(p1, p2);
    }
}
