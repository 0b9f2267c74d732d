//! Length-tag-value codec (spec section 4.1).
//!
//! Every multi-byte integer is big-endian. Objects are encoded as a
//! sequence of `(tag: u8, len: u32, value)` triples terminated by the
//! sentinel `tag = 0`. Unknown tags are skipped on decode (forward
//! compatibility); duplicate tags keep the last value seen.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{EboxError, Result};

/// Sentinel tag terminating a field sequence.
pub const END: u8 = 0;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only byte buffer with the primitive encoders spec section 4.1 names.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// `bytes` primitive: u32 length + data.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    /// `string` primitive: u8 length + UTF-8 data (max 255 bytes).
    pub fn put_string(&mut self, s: &str) -> Result<()> {
        if s.len() > u8::MAX as usize {
            return Err(EboxError::InvalidArg(alloc::format!(
                "string {} bytes exceeds 255-byte limit",
                s.len()
            )));
        }
        self.put_u8(s.len() as u8);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Write one `(tag, len, value)` field.
    pub fn put_field(&mut self, tag: u8, value: &[u8]) {
        self.put_u8(tag);
        self.put_u32(value.len() as u32);
        self.buf.extend_from_slice(value);
    }

    /// Terminate a field sequence with the sentinel tag.
    pub fn put_end(&mut self) {
        self.put_u8(END);
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Cursor over a byte slice with the primitive decoders spec section 4.1 names.
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(EboxError::InvalidFormat(alloc::format!(
                "truncated: need {n} bytes, have {}",
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    pub fn get_raw(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// `bytes` primitive: u32 length + data, length-overflow checked.
    pub fn get_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.get_u32()? as usize;
        if len > self.remaining() {
            return Err(EboxError::InvalidFormat(alloc::format!(
                "bytes length {len} exceeds remaining input"
            )));
        }
        Ok(self.take(len)?.to_vec())
    }

    /// `string` primitive: u8 length + UTF-8 data.
    pub fn get_string(&mut self) -> Result<String> {
        let len = self.get_u8()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec())
            .map_err(|_| EboxError::InvalidFormat("string field is not valid UTF-8".into()))
    }

    /// Read one `(tag, len, value)` field; does not interpret `tag == END`.
    fn get_field(&mut self) -> Result<(u8, Vec<u8>)> {
        let tag = self.get_u8()?;
        let len = self.get_u32()? as usize;
        if len > self.remaining() {
            return Err(EboxError::InvalidFormat(alloc::format!(
                "field tag {tag} length {len} exceeds remaining input"
            )));
        }
        let value = self.take(len)?.to_vec();
        Ok((tag, value))
    }

    /// Read fields until the sentinel tag, last-value-wins on duplicates,
    /// keeping every tag seen (including unrecognized ones, which callers
    /// simply never look up) so forward compatibility round-trips cleanly.
    pub fn get_fields(&mut self) -> Result<BTreeMap<u8, Vec<u8>>> {
        let mut fields = BTreeMap::new();
        loop {
            let tag = self.get_u8()?;
            if tag == END {
                break;
            }
            let len = self.get_u32()? as usize;
            if len > self.remaining() {
                return Err(EboxError::InvalidFormat(alloc::format!(
                    "field tag {tag} length {len} exceeds remaining input"
                )));
            }
            let value = self.take(len)?.to_vec();
            fields.insert(tag, value);
        }
        Ok(fields)
    }
}

pub(crate) fn require_field<'a>(
    fields: &'a BTreeMap<u8, Vec<u8>>,
    tag: u8,
    what: &str,
) -> Result<&'a Vec<u8>> {
    fields
        .get(&tag)
        .ok_or_else(|| EboxError::InvalidFormat(alloc::format!("missing required field: {what}")))
}
