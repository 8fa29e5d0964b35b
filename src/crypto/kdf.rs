//! PBKDF2 Key Derivation
//!
//! Turns a password into key material for the ciphers in this crate.
//! Iteration counts below the published minimum for the chosen
//! pseudo-random function are refused, never silently raised.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};
use tracing::debug;
use zeroize::Zeroize;

use super::policy::{self, REQUIRED_SALT_LEN};
use super::SecureBytes;
use crate::error::{CryptoError, Result};

/// Upper bound on a single derivation's output
pub const MAX_DERIVED_LEN: usize = 4096;

/// Output length when the caller does not ask for one
pub const DEFAULT_KEY_LEN: usize = 32;

/// Pseudo-random function driving PBKDF2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Prf {
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

impl Prf {
    pub const ALL: [Prf; 4] = [Prf::HmacSha1, Prf::HmacSha256, Prf::HmacSha384, Prf::HmacSha512];

    pub const fn name(self) -> &'static str {
        match self {
            Prf::HmacSha1 => "hmac-sha1",
            Prf::HmacSha256 => "hmac-sha256",
            Prf::HmacSha384 => "hmac-sha384",
            Prf::HmacSha512 => "hmac-sha512",
        }
    }

    /// Iterations used when the caller does not pick a count
    pub const fn default_iterations(self) -> u32 {
        policy::min_iteration_count(self)
    }

    /// Stable one-byte identifier for serialized headers
    pub const fn id(self) -> u8 {
        match self {
            Prf::HmacSha1 => 1,
            Prf::HmacSha256 => 2,
            Prf::HmacSha384 => 3,
            Prf::HmacSha512 => 4,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Prf::ALL.into_iter().find(|prf| prf.id() == id)
    }
}

impl std::fmt::Display for Prf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Prf {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase();
        let normalized = normalized.strip_prefix("hmac-").unwrap_or(&normalized);
        Prf::ALL
            .into_iter()
            .find(|prf| prf.name().trim_start_matches("hmac-") == normalized.replace('-', ""))
            .ok_or_else(|| CryptoError::UnsupportedFormat(format!("неизвестная функция PRF '{}'", s)))
    }
}

/// Derived key material together with every parameter needed to re-derive it
#[derive(Zeroize)]
pub struct DerivedKey {
    /// The derived key bytes
    pub key: SecureBytes,
    /// Salt used for derivation (not secret, store it next to the data)
    pub salt: Vec<u8>,
    #[zeroize(skip)]
    pub iterations: u32,
    #[zeroize(skip)]
    pub prf: Prf,
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &self.key)
            .field("salt_len", &self.salt.len())
            .field("iterations", &self.iterations)
            .field("prf", &self.prf)
            .finish()
    }
}

/// PBKDF2 engine bound to one pseudo-random function
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2 {
    prf: Prf,
}

impl Default for Pbkdf2 {
    fn default() -> Self {
        Self::new(Prf::HmacSha256)
    }
}

impl Pbkdf2 {
    pub fn new(prf: Prf) -> Self {
        Self { prf }
    }

    pub fn prf(&self) -> Prf {
        self.prf
    }

    /// Derive `bytes_requested` bytes from `password`
    ///
    /// # Arguments
    /// * `salt` - Salt to reuse; a fresh random one is generated when `None`
    /// * `iterations` - Iteration count; defaults to the PRF minimum
    ///
    /// # Errors
    /// * `PasswordRequired` - password is empty or whitespace only
    /// * `InvalidLength` - zero or oversized output, or a short salt
    /// * `IterationCountTooLow` - below the PRF's published minimum
    pub fn derive_key(
        &self,
        password: &str,
        bytes_requested: usize,
        salt: Option<&[u8]>,
        iterations: Option<u32>,
    ) -> Result<DerivedKey> {
        if password.trim().is_empty() {
            return Err(CryptoError::PasswordRequired);
        }

        if bytes_requested == 0 || bytes_requested > MAX_DERIVED_LEN {
            return Err(CryptoError::InvalidLength(format!(
                "запрошено {} байт ключа, допустимо от 1 до {}",
                bytes_requested, MAX_DERIVED_LEN
            )));
        }

        let iterations = iterations.unwrap_or_else(|| self.prf.default_iterations());
        policy::validate_iterations(self.prf, iterations)?;

        let salt = match salt {
            Some(s) => {
                policy::validate_salt(s)?;
                s.to_vec()
            }
            None => {
                let mut s = vec![0u8; REQUIRED_SALT_LEN];
                OsRng.fill_bytes(&mut s);
                s
            }
        };

        let mut key = SecureBytes::zeroed(bytes_requested);
        let out = key.as_mut_slice();
        let password = password.as_bytes();
        match self.prf {
            Prf::HmacSha1 => pbkdf2_hmac::<Sha1>(password, &salt, iterations, out),
            Prf::HmacSha256 => pbkdf2_hmac::<Sha256>(password, &salt, iterations, out),
            Prf::HmacSha384 => pbkdf2_hmac::<Sha384>(password, &salt, iterations, out),
            Prf::HmacSha512 => pbkdf2_hmac::<Sha512>(password, &salt, iterations, out),
        }

        debug!(prf = %self.prf, iterations, bytes = bytes_requested, "key derived");

        Ok(DerivedKey {
            key,
            salt,
            iterations,
            prf: self.prf,
        })
    }

    /// Re-derive with the same parameters and compare in constant time
    pub fn verify_key(
        &self,
        password: &str,
        key: &[u8],
        salt: &[u8],
        iterations: u32,
    ) -> Result<bool> {
        let derived = self.derive_key(password, key.len(), Some(salt), Some(iterations))?;
        Ok(derived.key.ct_eq(key))
    }
}
