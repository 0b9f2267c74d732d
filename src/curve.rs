//! EC public-key wire primitive: curve OID + point (spec section 4.1).
//!
//! Only X25519 is implemented (the curve used by the hardware-token oracle
//! contract in spec section 1), but the wire encoding reserves a curve-OID
//! byte so a future curve could be added without breaking the format — the
//! same forward-compatibility posture the TLV codec uses for unknown tags.

extern crate alloc;

use alloc::vec::Vec;

use subtle::ConstantTimeEq;
use x25519_dalek::PublicKey as X25519PublicKey;

use crate::codec::{Reader, Writer};
use crate::error::{EboxError, Result};

/// Curve identifiers on the wire.
pub const CURVE_X25519: u8 = 0x01;

/// An EC public key, tagged with its curve.
#[derive(Clone, PartialEq, Eq)]
pub struct EcPubkey {
    curve: u8,
    point: [u8; 32],
}

impl EcPubkey {
    pub fn from_x25519(pk: X25519PublicKey) -> Self {
        Self {
            curve: CURVE_X25519,
            point: *pk.as_bytes(),
        }
    }

    pub fn to_x25519(&self) -> Result<X25519PublicKey> {
        if self.curve != CURVE_X25519 {
            return Err(EboxError::InvalidArg(alloc::format!(
                "unsupported curve OID {}",
                self.curve
            )));
        }
        Ok(X25519PublicKey::from(self.point))
    }

    pub fn curve(&self) -> u8 {
        self.curve
    }

    /// Constant-time equality, for comparisons an oracle makes against
    /// attacker-influenced input (spec section 4.2's recipient-pubkey
    /// lookup) rather than `PartialEq`'s ordinary short-circuiting compare.
    pub fn ct_eq(&self, other: &Self) -> bool {
        let curve_eq = self.curve.ct_eq(&other.curve);
        let point_eq = self.point.ct_eq(&other.point);
        (curve_eq & point_eq).into()
    }

    pub fn point(&self) -> &[u8; 32] {
        &self.point
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_u8(self.curve);
        w.put_raw(&self.point);
    }

    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let curve = r.get_u8()?;
        if curve != CURVE_X25519 {
            return Err(EboxError::InvalidFormat(alloc::format!(
                "unsupported curve OID {curve}"
            )));
        }
        let point = r.get_raw(32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(point);
        Ok(Self { curve, point: arr })
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

impl core::fmt::Debug for EcPubkey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "EcPubkey(curve={}, point={:02x?})", self.curve, self.point)
    }
}
