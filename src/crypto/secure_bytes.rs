//! Secret byte buffer with automatic zeroing on drop
//!
//! Used for every piece of key material and decrypted plaintext the crate
//! hands back. The buffer is:
//! 1. Zeroed when dropped
//! 2. Redacted in `Debug` output
//! 3. Locked in memory where the platform allows it

use std::ops::Deref;
use zeroize::Zeroize;

use super::ct::constant_time_eq;

/// Owned secret bytes, zeroed on drop
pub struct SecureBytes {
    data: Vec<u8>,
    /// Bytes pinned by `mlock`, unlocked as a whole on drop
    locked: usize,
}

impl SecureBytes {
    /// Take ownership of `data`; the vector's allocation is now managed here
    pub fn new(data: Vec<u8>) -> Self {
        let mut secure = Self { data, locked: 0 };
        secure.lock_memory();
        secure
    }

    /// A zero-filled buffer of `len` bytes, to be filled in place
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }

    /// Mutable access for in-place fills (KDF output, random keys)
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shorten to `len` bytes, zeroing the cut-off tail first
    pub fn truncate(&mut self, len: usize) {
        if len < self.data.len() {
            self.data[len..].zeroize();
            self.data.truncate(len);
        }
    }

    /// Constant-time comparison against other bytes
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        constant_time_eq(&self.data, other)
    }

    #[cfg(unix)]
    fn lock_memory(&mut self) {
        if self.data.is_empty() {
            return;
        }
        // Best effort: fails without CAP_IPC_LOCK or above RLIMIT_MEMLOCK
        let rc = unsafe { libc::mlock(self.data.as_ptr() as *const libc::c_void, self.data.len()) };
        if rc == 0 {
            self.locked = self.data.len();
        }
    }

    #[cfg(not(unix))]
    fn lock_memory(&mut self) {}

    /// The allocation never moves or shrinks after construction, so the
    /// pointer still covers the `locked` bytes after truncate or zeroize.
    #[cfg(unix)]
    fn unlock_memory(&mut self) {
        if self.locked == 0 {
            return;
        }
        unsafe {
            libc::munlock(self.data.as_ptr() as *const libc::c_void, self.locked);
        }
        self.locked = 0;
    }

    #[cfg(not(unix))]
    fn unlock_memory(&mut self) {}
}

impl Zeroize for SecureBytes {
    fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

impl Drop for SecureBytes {
    fn drop(&mut self) {
        self.data.zeroize();
        self.unlock_memory();
    }
}

impl Clone for SecureBytes {
    fn clone(&self) -> Self {
        Self::new(self.data.clone())
    }
}

impl Deref for SecureBytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[u8]> for SecureBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for SecureBytes {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for SecureBytes {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl std::fmt::Debug for SecureBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureBytes")
            .field("len", &self.data.len())
            .field("data", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_bytes_deref() {
        let secure = SecureBytes::new(vec![1, 2, 3, 4]);
        assert_eq!(secure.len(), 4);
        assert_eq!(&*secure, &[1, 2, 3, 4]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let secure = SecureBytes::new(b"top secret".to_vec());
        let printed = format!("{:?}", secure);
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn test_zeroize_clears() {
        let mut secure = SecureBytes::from(&[0xDEu8, 0xAD][..]);
        secure.zeroize();
        assert!(secure.is_empty());
    }

    #[test]
    fn test_truncate() {
        let mut secure = SecureBytes::new(vec![1, 2, 3, 4, 5]);
        secure.truncate(2);
        assert_eq!(&*secure, &[1, 2]);
        secure.truncate(10);
        assert_eq!(secure.len(), 2);
    }

    #[test]
    fn test_locked_length_survives_shrinking() {
        let mut secure = SecureBytes::new(vec![7u8; 4096]);
        let locked = secure.locked;
        assert!(locked == 0 || locked == 4096);

        secure.truncate(10);
        assert_eq!(secure.locked, locked);

        secure.zeroize();
        assert!(secure.is_empty());
        assert_eq!(secure.locked, locked);

        secure.unlock_memory();
        assert_eq!(secure.locked, 0);
    }

    #[test]
    fn test_ct_eq() {
        let secure = SecureBytes::zeroed(8);
        assert!(secure.ct_eq(&[0u8; 8]));
        assert!(!secure.ct_eq(&[0u8; 7]));
        assert!(!secure.ct_eq(&[1u8; 8]));
    }
}
