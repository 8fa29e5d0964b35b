//! AES-GCM Authenticated Encryption
//!
//! AES-GCM is an AEAD cipher: one pass produces the ciphertext and a 128-bit
//! tag that authenticates both the ciphertext and the associated data. The
//! work is done by the `aes-gcm` crate; this module only guarantees nonce
//! freshness, checks parameters and shapes the result.

use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::policy;
use super::SecureBytes;
use crate::error::{CryptoError, Result};

/// Nonce length for AES-GCM (96 bits)
pub const NONCE_LEN: usize = 12;

/// Authentication tag length (128 bits)
pub const TAG_LEN: usize = 16;

type Aes192Gcm = AesGcm<Aes192, U12>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AeadAlgorithm {
    Aes128Gcm,
    Aes192Gcm,
    Aes256Gcm,
}

impl AeadAlgorithm {
    pub const ALL: [AeadAlgorithm; 3] = [
        AeadAlgorithm::Aes128Gcm,
        AeadAlgorithm::Aes192Gcm,
        AeadAlgorithm::Aes256Gcm,
    ];

    pub const fn key_bits(self) -> usize {
        match self {
            AeadAlgorithm::Aes128Gcm => 128,
            AeadAlgorithm::Aes192Gcm => 192,
            AeadAlgorithm::Aes256Gcm => 256,
        }
    }

    pub const fn key_len(self) -> usize {
        self.key_bits() / 8
    }

    pub const fn name(self) -> &'static str {
        match self {
            AeadAlgorithm::Aes128Gcm => "aes-128-gcm",
            AeadAlgorithm::Aes192Gcm => "aes-192-gcm",
            AeadAlgorithm::Aes256Gcm => "aes-256-gcm",
        }
    }

    /// Stable one-byte identifier for serialized headers
    pub const fn id(self) -> u8 {
        match self {
            AeadAlgorithm::Aes128Gcm => 1,
            AeadAlgorithm::Aes192Gcm => 2,
            AeadAlgorithm::Aes256Gcm => 3,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        AeadAlgorithm::ALL.into_iter().find(|alg| alg.id() == id)
    }
}

impl std::fmt::Display for AeadAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AeadAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace(['-', '_'], "");
        AeadAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name().replace('-', "") == normalized)
            .ok_or_else(|| CryptoError::UnsupportedFormat(format!("неизвестный AEAD-алгоритм '{}'", s)))
    }
}

/// Output of a GCM encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AeadSealed {
    pub ciphertext: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl AeadSealed {
    /// Layout: [12 bytes: nonce][N bytes: ciphertext][16 bytes: tag]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len() + TAG_LEN);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse the layout produced by [`to_bytes`](Self::to_bytes)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::InvalidLength(format!(
                "зашифрованный блок слишком короткий: {} байт (минимум {})",
                bytes.len(),
                NONCE_LEN + TAG_LEN
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[bytes.len() - TAG_LEN..]);

        Ok(Self {
            ciphertext: bytes[NONCE_LEN..bytes.len() - TAG_LEN].to_vec(),
            nonce,
            tag,
        })
    }
}

/// AES-GCM cipher for one key size; the key itself is supplied per call
#[derive(Debug, Clone, Copy)]
pub struct AeadCipher {
    algorithm: AeadAlgorithm,
}

impl AeadCipher {
    pub fn new(algorithm: AeadAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> AeadAlgorithm {
        self.algorithm
    }

    /// Random key of the right size
    pub fn generate_key(&self) -> SecureBytes {
        let mut key = SecureBytes::zeroed(self.algorithm.key_len());
        OsRng.fill_bytes(key.as_mut_slice());
        key
    }

    /// Encrypt `plaintext` under a freshly generated random nonce
    ///
    /// # Errors
    /// Returns `InvalidKey` if the key length does not match the algorithm
    pub fn encrypt(
        &self,
        key: &[u8],
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<AeadSealed> {
        policy::validate_key_length(self.algorithm.key_bits(), key)?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let aad = associated_data.unwrap_or_default();
        let mut buffer = plaintext.to_vec();
        let tag = match self.algorithm {
            AeadAlgorithm::Aes128Gcm => seal_in_place::<Aes128Gcm>(key, &nonce, aad, &mut buffer)?,
            AeadAlgorithm::Aes192Gcm => seal_in_place::<Aes192Gcm>(key, &nonce, aad, &mut buffer)?,
            AeadAlgorithm::Aes256Gcm => seal_in_place::<Aes256Gcm>(key, &nonce, aad, &mut buffer)?,
        };

        debug!(
            algorithm = %self.algorithm,
            bytes = plaintext.len(),
            aad_bytes = aad.len(),
            "aead encrypted"
        );

        Ok(AeadSealed {
            ciphertext: buffer,
            nonce,
            tag,
        })
    }

    /// Decrypt and authenticate
    ///
    /// # Errors
    /// * `InvalidKey` - wrong key length
    /// * `InvalidNonce` - nonce is not 12 bytes (checked before decrypting)
    /// * `AuthenticationFailed` - tag mismatch, wrong key, tampered data or
    ///   associated data; no plaintext is released
    pub fn decrypt(
        &self,
        key: &[u8],
        ciphertext: &[u8],
        nonce: &[u8],
        tag: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<SecureBytes> {
        policy::validate_key_length(self.algorithm.key_bits(), key)?;

        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonce {
                expected: NONCE_LEN,
                actual: nonce.len(),
            });
        }

        if tag.len() != TAG_LEN {
            warn!(algorithm = %self.algorithm, "aead tag has wrong length");
            return Err(CryptoError::AuthenticationFailed);
        }

        let aad = associated_data.unwrap_or_default();
        let mut buffer = SecureBytes::new(ciphertext.to_vec());
        let opened = match self.algorithm {
            AeadAlgorithm::Aes128Gcm => open_in_place::<Aes128Gcm>(key, nonce, aad, &mut buffer, tag),
            AeadAlgorithm::Aes192Gcm => open_in_place::<Aes192Gcm>(key, nonce, aad, &mut buffer, tag),
            AeadAlgorithm::Aes256Gcm => open_in_place::<Aes256Gcm>(key, nonce, aad, &mut buffer, tag),
        };

        if let Err(e) = opened {
            warn!(algorithm = %self.algorithm, "aead authentication failed");
            return Err(e);
        }

        debug!(algorithm = %self.algorithm, bytes = buffer.len(), "aead decrypted");
        Ok(buffer)
    }

    /// Decrypt a blob in the [`AeadSealed::to_bytes`] layout
    pub fn decrypt_bytes(
        &self,
        key: &[u8],
        sealed: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<SecureBytes> {
        let sealed = AeadSealed::from_bytes(sealed)?;
        self.decrypt(key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, associated_data)
    }
}

fn seal_in_place<C>(key: &[u8], nonce: &[u8], aad: &[u8], buffer: &mut [u8]) -> Result<[u8; TAG_LEN]>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKey {
        expected: key.len(),
        actual: key.len(),
    })?;

    // Only fails for buffers beyond the GCM message limit (~64 GiB)
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, buffer)
        .map_err(|_| CryptoError::InvalidLength("сообщение превышает предел AES-GCM".into()))?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(&tag);
    Ok(out)
}

fn open_in_place<C>(key: &[u8], nonce: &[u8], aad: &[u8], buffer: &mut SecureBytes, tag: &[u8]) -> Result<()>
where
    C: KeyInit + AeadInPlace + AeadCore<NonceSize = U12, TagSize = U16>,
{
    let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKey {
        expected: key.len(),
        actual: key.len(),
    })?;

    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            buffer.as_mut_slice(),
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_zero_key_teste_roundtrip() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes256Gcm);
        let key = [0u8; 32];

        let sealed = cipher.encrypt(&key, b"teste", None).unwrap();
        let plain = cipher
            .decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, None)
            .unwrap();

        assert_eq!(&*plain, b"teste");
    }

    #[test]
    fn test_roundtrip_all_key_sizes_with_aad() {
        for algorithm in AeadAlgorithm::ALL {
            let cipher = AeadCipher::new(algorithm);
            let key = cipher.generate_key();
            assert_eq!(key.len(), algorithm.key_len());

            let sealed = cipher
                .encrypt(&key, b"Secret message", Some(b"header v1"))
                .unwrap();
            assert_eq!(sealed.ciphertext.len(), 14);

            let plain = cipher
                .decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, Some(b"header v1"))
                .unwrap();
            assert_eq!(&*plain, b"Secret message");
        }
    }

    #[test]
    fn test_wrong_key_length() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes128Gcm);
        let result = cipher.encrypt(&[0u8; 32], b"data", None);
        assert!(matches!(
            result,
            Err(CryptoError::InvalidKey {
                expected: 16,
                actual: 32
            })
        ));
    }

    #[test]
    fn test_tampering_fails() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes256Gcm);
        let key = cipher.generate_key();
        let sealed = cipher.encrypt(&key, b"Secret message", Some(b"aad")).unwrap();

        let mut ciphertext = sealed.ciphertext.clone();
        ciphertext[0] ^= 0x01;
        assert!(matches!(
            cipher.decrypt(&key, &ciphertext, &sealed.nonce, &sealed.tag, Some(b"aad")),
            Err(CryptoError::AuthenticationFailed)
        ));

        let mut tag = sealed.tag;
        tag[TAG_LEN - 1] ^= 0x80;
        assert!(matches!(
            cipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce, &tag, Some(b"aad")),
            Err(CryptoError::AuthenticationFailed)
        ));

        assert!(matches!(
            cipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, Some(b"aaD")),
            Err(CryptoError::AuthenticationFailed)
        ));

        assert!(matches!(
            cipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, None),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_wrong_key_fails() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes256Gcm);
        let sealed = cipher.encrypt(&[0x42u8; 32], b"Secret", None).unwrap();
        let result = cipher.decrypt(&[0x43u8; 32], &sealed.ciphertext, &sealed.nonce, &sealed.tag, None);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_bad_nonce_and_tag_length() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes256Gcm);
        let key = [0u8; 32];
        let sealed = cipher.encrypt(&key, b"x", None).unwrap();

        assert!(matches!(
            cipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce[..8], &sealed.tag, None),
            Err(CryptoError::InvalidNonce {
                expected: 12,
                actual: 8
            })
        ));
        assert!(matches!(
            cipher.decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag[..12], None),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_nonces_never_repeat() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes128Gcm);
        let key = [0x42u8; 16];

        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let sealed = cipher.encrypt(&key, b"Same message", None).unwrap();
            assert!(seen.insert(sealed.nonce), "nonce repeated");
        }
    }

    #[test]
    fn test_byte_layout_roundtrip() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes192Gcm);
        let key = cipher.generate_key();
        let sealed = cipher.encrypt(&key, b"layout", None).unwrap();

        let bytes = sealed.to_bytes();
        assert_eq!(bytes.len(), NONCE_LEN + 6 + TAG_LEN);
        assert_eq!(&bytes[..NONCE_LEN], &sealed.nonce);

        let plain = cipher.decrypt_bytes(&key, &bytes, None).unwrap();
        assert_eq!(&*plain, b"layout");

        assert!(AeadSealed::from_bytes(&bytes[..20]).is_err());
    }

    #[test]
    fn test_empty_plaintext() {
        let cipher = AeadCipher::new(AeadAlgorithm::Aes256Gcm);
        let key = cipher.generate_key();
        let sealed = cipher.encrypt(&key, b"", Some(b"only aad")).unwrap();
        assert!(sealed.ciphertext.is_empty());

        let plain = cipher
            .decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, Some(b"only aad"))
            .unwrap();
        assert!(plain.is_empty());
    }
}
