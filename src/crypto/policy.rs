//! Key, salt and iteration-count policy
//!
//! Precondition gate for every cipher and derivation entry point. Nothing in
//! here touches a primitive; inputs that fail these checks never reach one.

use super::kdf::Prf;
use crate::error::{CryptoError, Result};

/// Salt length required for PBKDF2 and generated when none is supplied (128 bits)
pub const REQUIRED_SALT_LEN: usize = 16;

/// PBKDF2 minimum iteration counts (OWASP Password Storage Cheat Sheet, 2023)
pub const MIN_ITERATIONS_SHA1: u32 = 1_300_000;
pub const MIN_ITERATIONS_SHA256: u32 = 600_000;
pub const MIN_ITERATIONS_SHA384: u32 = 210_000;
pub const MIN_ITERATIONS_SHA512: u32 = 210_000;

/// Check that `key` is exactly `key_size_bits / 8` bytes long
pub fn validate_key_length(key_size_bits: usize, key: &[u8]) -> Result<()> {
    let expected = key_size_bits / 8;
    if key.len() != expected {
        return Err(CryptoError::InvalidKey {
            expected,
            actual: key.len(),
        });
    }
    Ok(())
}

pub fn required_salt_length() -> usize {
    REQUIRED_SALT_LEN
}

/// Minimum PBKDF2 iteration count for the given pseudo-random function
pub const fn min_iteration_count(prf: Prf) -> u32 {
    match prf {
        Prf::HmacSha1 => MIN_ITERATIONS_SHA1,
        Prf::HmacSha256 => MIN_ITERATIONS_SHA256,
        Prf::HmacSha384 => MIN_ITERATIONS_SHA384,
        Prf::HmacSha512 => MIN_ITERATIONS_SHA512,
    }
}

pub fn validate_salt(salt: &[u8]) -> Result<()> {
    if salt.len() < REQUIRED_SALT_LEN {
        return Err(CryptoError::InvalidLength(format!(
            "соль должна быть не короче {} байт, получено {}",
            REQUIRED_SALT_LEN,
            salt.len()
        )));
    }
    Ok(())
}

pub fn validate_iterations(prf: Prf, iterations: u32) -> Result<()> {
    let minimum = min_iteration_count(prf);
    if iterations < minimum {
        return Err(CryptoError::IterationCountTooLow {
            minimum,
            actual: iterations,
        });
    }
    Ok(())
}
