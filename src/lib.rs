//! Secure Crypt - symmetric encryption and hashing toolkit
//!
//! This crate provides:
//! - AES-GCM authenticated encryption with associated data
//! - AES-CBC with HMAC in Encrypt-then-MAC composition, in memory and over files
//! - Plain and keyed digests over buffers, strings and file ranges
//! - PBKDF2 key derivation with enforced salt and iteration minimums
//! - Password-sealed envelopes carrying their own derivation parameters

pub mod cli;
pub mod config;
pub mod crypto;
pub mod encoding;
pub mod envelope;
pub mod error;

pub use error::{CryptoError, Result};
