//! Cryptographic engine for secure-crypt
//!
//! This module provides:
//! - AES-GCM authenticated encryption with associated data
//! - AES-CBC + HMAC Encrypt-then-MAC for hosts without native AEAD
//! - Hash/HMAC digests over buffers and file ranges, with progress
//! - PBKDF2 password-based key derivation
//! - Constant-time comparison and secure memory handling
//!
//! All operations are synchronous and keep no state between calls, so they
//! may be used from any number of threads at once.

pub mod aead;
pub mod composed;
pub mod ct;
pub mod digest;
pub mod kdf;
pub mod policy;
mod secure_bytes;

pub use aead::{AeadAlgorithm, AeadCipher, AeadSealed, NONCE_LEN, TAG_LEN};
pub use composed::{AeAlgorithm, ComposedCipher, ComposedSealed, FileSealed, IV_LEN};
pub use ct::constant_time_eq;
pub use digest::{Digest, DigestAlgorithm, DigestEngine, FileProgress, Hasher, SeekWindow};
pub use kdf::{DerivedKey, Pbkdf2, Prf};
pub use policy::REQUIRED_SALT_LEN;
pub use secure_bytes::SecureBytes;
