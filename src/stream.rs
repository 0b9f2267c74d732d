//! Chunked-AEAD stream container (spec section 4.7).
//!
//! The stream's per-session symmetric key is never handed to the caller in
//! the clear: `init_encrypt` generates it, seals it into a one-shot `Ebox`
//! built from the caller's `Template`, and embeds that ebox in the stream
//! header (spec section 2's "Stream container ... whose session key is
//! itself stored in an ebox"). A reader recovers the session key by
//! unlocking/recovering the embedded ebox through whichever path the
//! template allows, the same oracle-mediated process as any other ebox,
//! then calls `init_decrypt` with the recovered bytes.
//!
//! A random 4-byte session prefix both binds a unique per-session subkey
//! (via HKDF) and seeds every chunk's nonce, so the same session key can
//! seal many streams without ever reusing an AEAD nonce. Each chunk's
//! associated data binds its sequence number and final-chunk flag, so
//! reordering, truncation, or duplication all fail authentication instead
//! of silently being accepted.

extern crate alloc;

use alloc::vec::Vec;

use rand_core::{OsRng, RngCore};

use crate::aead;
use crate::codec::{Reader, Writer};
use crate::ebox::Ebox;
use crate::error::{EboxError, Result};
use crate::kdf;
use crate::secret::SecretBytes;
use crate::template::Template;

const STREAM_MAGIC: [u8; 4] = *b"ESTR";
const HEADER_VERSION: u8 = 1;
const SESSION_PREFIX_BYTES: usize = 4;

/// Default chunk size a writer targets (spec section 4.7); callers may pass
/// any plaintext length to `put`, this is only the header's advertised
/// default for well-behaved writers.
pub const DEFAULT_CHUNK_SIZE: u32 = 128 * 1024;

/// AEAD suite identifier carried in the header (spec section 6.1's AEAD
/// id); this build only ever writes/understands AES-256-GCM.
pub const AEAD_ID_AES256_GCM: u8 = 1;

const CHUNK_FLAG_FINAL: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Encrypt,
    Decrypt,
}

/// One sealed chunk on the wire: `(seq: u64, flags: u8, ciphertext)`.
struct StreamChunk {
    seq: u64,
    is_final: bool,
    ciphertext: Vec<u8>,
}

impl StreamChunk {
    fn write(&self, w: &mut Writer) {
        w.put_u64(self.seq);
        w.put_u8(if self.is_final { CHUNK_FLAG_FINAL } else { 0 });
        w.put_bytes(&self.ciphertext);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self> {
        let seq = r.get_u64()?;
        let flags = r.get_u8()?;
        let ciphertext = r.get_bytes()?;
        Ok(Self {
            seq,
            is_final: flags & CHUNK_FLAG_FINAL != 0,
            ciphertext,
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r)
    }
}

/// What `Stream::get` yielded for one decoded chunk.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamItem {
    /// Decrypted plaintext from a non-final chunk.
    Data(Vec<u8>),
    /// The stream's final chunk; no more chunks should follow.
    End,
}

/// The parts of a stream header a reader needs before it can derive the
/// session subkey: the embedded one-shot `Ebox` (still sealed — the caller
/// unlocks it externally), the advertised chunk size, and the AEAD suite id.
pub struct StreamHeader {
    pub ebox: Ebox,
    pub chunk_size: u32,
    pub aead_id: u8,
    session_prefix: [u8; SESSION_PREFIX_BYTES],
}

/// A chunked AEAD stream, bound either for encryption or decryption.
pub struct Stream {
    mode: Mode,
    subkey: SecretBytes,
    session_prefix: [u8; SESSION_PREFIX_BYTES],
    next_seq: u64,
    closed: bool,
    chunk_size: u32,
}

fn build_nonce(session_prefix: &[u8; SESSION_PREFIX_BYTES], seq: u64) -> [u8; aead::NONCE_BYTES] {
    let mut nonce = [0u8; aead::NONCE_BYTES];
    nonce[..SESSION_PREFIX_BYTES].copy_from_slice(session_prefix);
    nonce[SESSION_PREFIX_BYTES..].copy_from_slice(&seq.to_be_bytes());
    nonce
}

fn chunk_aad(seq: u64, is_final: bool) -> [u8; 9] {
    let mut aad = [0u8; 9];
    aad[..8].copy_from_slice(&seq.to_be_bytes());
    aad[8] = if is_final { CHUNK_FLAG_FINAL } else { 0 };
    aad
}

impl Stream {
    /// Begin a new stream for writing, sealing a fresh random session key
    /// into a one-shot `Ebox` built from `tpl` (spec section 4.7 step 1).
    /// Returns the stream and the header bytes the caller must
    /// transmit/store before any chunk.
    pub fn init_encrypt(tpl: &Template) -> Result<(Self, Vec<u8>)> {
        Self::init_encrypt_with_chunk_size(tpl, DEFAULT_CHUNK_SIZE)
    }

    /// As [`Self::init_encrypt`], with an explicit advertised chunk size.
    pub fn init_encrypt_with_chunk_size(tpl: &Template, chunk_size: u32) -> Result<(Self, Vec<u8>)> {
        let mut session_key = [0u8; 32];
        OsRng.fill_bytes(&mut session_key);

        let sealed = Ebox::create(tpl, &session_key, None)?;
        let ebox_bytes = sealed.to_bytes();

        let mut session_prefix = [0u8; SESSION_PREFIX_BYTES];
        OsRng.fill_bytes(&mut session_prefix);
        let subkey = kdf::derive_stream_key(&session_key, &session_prefix)?;
        session_key.iter_mut().for_each(|b| *b = 0);

        let mut w = Writer::new();
        w.put_raw(&STREAM_MAGIC);
        w.put_u8(HEADER_VERSION);
        w.put_bytes(&ebox_bytes);
        w.put_u32(chunk_size);
        w.put_u8(AEAD_ID_AES256_GCM);
        w.put_raw(&session_prefix);
        let header = w.into_bytes();

        tracing::debug!(chunk_size, "stream opened for encryption");

        Ok((
            Self {
                mode: Mode::Encrypt,
                subkey: SecretBytes::new(subkey.to_vec()),
                session_prefix,
                next_seq: 0,
                closed: false,
                chunk_size,
            },
            header,
        ))
    }

    /// Parse a stream header far enough to recover the embedded `Ebox`,
    /// without yet knowing the session key. The caller unlocks or recovers
    /// that ebox through the normal oracle-mediated path, then calls
    /// [`Self::init_decrypt`] with the recovered key bytes.
    pub fn parse_header(header: &[u8]) -> Result<StreamHeader> {
        let mut r = Reader::new(header);
        let magic = r.get_raw(4)?;
        if magic != STREAM_MAGIC {
            return Err(EboxError::InvalidFormat("bad stream header magic".into()));
        }
        let version = r.get_u8()?;
        if version != HEADER_VERSION {
            return Err(EboxError::UnsupportedVersion {
                found: version,
                max_supported: HEADER_VERSION,
            });
        }
        let ebox_bytes = r.get_bytes()?;
        let ebox = Ebox::from_bytes(&ebox_bytes)?;
        let chunk_size = r.get_u32()?;
        let aead_id = r.get_u8()?;
        if aead_id != AEAD_ID_AES256_GCM {
            return Err(EboxError::UnsupportedVersion {
                found: aead_id,
                max_supported: AEAD_ID_AES256_GCM,
            });
        }
        let prefix_bytes = r.get_raw(SESSION_PREFIX_BYTES)?;
        let mut session_prefix = [0u8; SESSION_PREFIX_BYTES];
        session_prefix.copy_from_slice(prefix_bytes);

        Ok(StreamHeader {
            ebox,
            chunk_size,
            aead_id,
            session_prefix,
        })
    }

    /// Begin reading a stream whose header was produced by `init_encrypt`,
    /// given the session key already recovered from the header's embedded
    /// `Ebox` (via `Ebox::unlock`/`Ebox::recover`).
    pub fn init_decrypt(header: &[u8], session_key: &[u8]) -> Result<Self> {
        let parsed = Self::parse_header(header)?;
        let subkey = kdf::derive_stream_key(session_key, &parsed.session_prefix)?;

        Ok(Self {
            mode: Mode::Decrypt,
            subkey: SecretBytes::new(subkey.to_vec()),
            session_prefix: parsed.session_prefix,
            next_seq: 0,
            closed: false,
            chunk_size: parsed.chunk_size,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    fn key_array(&self) -> Result<[u8; 32]> {
        if self.subkey.len() != 32 {
            return Err(EboxError::Crypto("stream subkey has the wrong length".into()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(self.subkey.as_slice());
        Ok(arr)
    }

    /// Seal one chunk of plaintext. Fails `INVALID_STATE` once `close` has
    /// been called.
    pub fn put(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if self.mode != Mode::Encrypt {
            return Err(EboxError::InvalidArg("stream is not open for encryption".into()));
        }
        if self.closed {
            return Err(EboxError::InvalidState("stream is already closed".into()));
        }
        let seq = self.next_seq;
        let nonce = build_nonce(&self.session_prefix, seq);
        let aad = chunk_aad(seq, false);
        let key = self.key_array()?;
        let ciphertext = aead::seal(&key, &nonce, plaintext, &aad)?;
        self.next_seq += 1;

        let chunk = StreamChunk {
            seq,
            is_final: false,
            ciphertext,
        };
        Ok(chunk.to_bytes())
    }

    /// Seal the final, empty chunk and mark the stream closed. Calling
    /// `close` again fails `AGAIN`.
    pub fn close(&mut self) -> Result<Vec<u8>> {
        if self.mode != Mode::Encrypt {
            return Err(EboxError::InvalidArg("stream is not open for encryption".into()));
        }
        if self.closed {
            return Err(EboxError::Again("stream is already closed".into()));
        }
        let seq = self.next_seq;
        let nonce = build_nonce(&self.session_prefix, seq);
        let aad = chunk_aad(seq, true);
        let key = self.key_array()?;
        let ciphertext = aead::seal(&key, &nonce, &[], &aad)?;
        self.closed = true;

        let chunk = StreamChunk {
            seq,
            is_final: true,
            ciphertext,
        };
        Ok(chunk.to_bytes())
    }

    /// Decode and authenticate one chunk. Enforces strict in-order
    /// delivery: a skipped, duplicated, or out-of-order sequence number is
    /// reported as `CORRUPT` rather than silently accepted, and a chunk
    /// never yields plaintext to the caller until its AEAD tag verifies.
    pub fn get(&mut self, chunk_bytes: &[u8]) -> Result<StreamItem> {
        if self.mode != Mode::Decrypt {
            return Err(EboxError::InvalidArg("stream is not open for decryption".into()));
        }
        if self.closed {
            return Err(EboxError::InvalidState("stream is already closed".into()));
        }
        let chunk = StreamChunk::from_bytes(chunk_bytes)
            .map_err(|_| EboxError::Corrupt("malformed or truncated stream chunk".into()))?;
        if chunk.seq != self.next_seq {
            return Err(EboxError::Corrupt(alloc::format!(
                "out-of-order stream chunk: expected seq {}, got {}",
                self.next_seq, chunk.seq
            )));
        }
        let nonce = build_nonce(&self.session_prefix, chunk.seq);
        let aad = chunk_aad(chunk.seq, chunk.is_final);
        let key = self.key_array()?;
        let plaintext = aead::open(&key, &nonce, &chunk.ciphertext, &aad)?;
        self.next_seq += 1;

        if chunk.is_final {
            self.closed = true;
            Ok(StreamItem::End)
        } else {
            Ok(StreamItem::Data(plaintext))
        }
    }
}
