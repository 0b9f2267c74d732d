//! Secret memory (spec section 5 / section 9 "Secret memory").
//!
//! Every key, share, token and session key that passes through this crate
//! is held in a `SecretBytes`: zeroized on drop and, when the `std` feature
//! is enabled on unix, advised against appearing in core dumps and locked
//! against being paged to swap. These are best-effort OS advisories, not a
//! hard guarantee — the same caveat the teacher's `zeroize`-only buffers
//! carry, just extended with the platform calls the spec's MUST requires.

extern crate alloc;

use alloc::vec::Vec;
use zeroize::{Zeroize, Zeroizing};

/// A heap buffer of secret bytes: zeroized on drop, best-effort locked
/// against swap and excluded from core dumps while alive.
pub struct SecretBytes {
    inner: Zeroizing<Vec<u8>>,
}

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        let inner = Zeroizing::new(bytes);
        lock_advise(&inner);
        Self { inner }
    }

    pub fn zeroed(len: usize) -> Self {
        Self::new(alloc::vec![0u8; len])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn into_vec_zeroized(mut self) -> Vec<u8> {
        let out = self.inner.clone();
        self.inner.zeroize();
        out
    }
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        Self::new(self.inner.to_vec())
    }
}

impl Drop for SecretBytes {
    fn drop(&mut self) {
        unlock_advise(&self.inner);
    }
}

impl core::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretBytes({} bytes, redacted)", self.inner.len())
    }
}

impl AsRef<[u8]> for SecretBytes {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

#[cfg(all(feature = "std", unix))]
#[allow(unsafe_code)]
fn lock_advise(buf: &[u8]) {
    if buf.is_empty() {
        return;
    }
    unsafe {
        let ptr = buf.as_ptr() as *mut libc::c_void;
        libc::mlock(ptr, buf.len());
        #[cfg(target_os = "linux")]
        libc::madvise(ptr, buf.len(), libc::MADV_DONTDUMP);
    }
}

#[cfg(all(feature = "std", unix))]
#[allow(unsafe_code)]
fn unlock_advise(buf: &[u8]) {
    if buf.is_empty() {
        return;
    }
    unsafe {
        let ptr = buf.as_ptr() as *mut libc::c_void;
        libc::munlock(ptr, buf.len());
    }
}

#[cfg(not(all(feature = "std", unix)))]
fn lock_advise(_buf: &[u8]) {}

#[cfg(not(all(feature = "std", unix)))]
fn unlock_advise(_buf: &[u8]) {}
