//! AES-CBC + HMAC Encrypt-then-MAC
//!
//! For environments where only CBC and a keyed digest are available. The
//! encryption key and the MAC key are distinct. The tag covers
//! `IV ‖ ciphertext ‖ AAD ‖ AL`, where `AL` is the AAD length in bits as a
//! 64-bit big-endian integer, and is truncated to the variant's tag length.
//!
//! Decryption authenticates first. Padding is only looked at once the tag
//! has verified, so a padding error can never be observed for forged input.
//!
//! File format written by [`ComposedCipher::encrypt_file`]:
//! [16 bytes: IV][N bytes: ciphertext][T bytes: tag]

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use super::ct::constant_time_eq;
use super::digest::{open_range, stream_range, DigestAlgorithm, FileProgress, Hasher, DEFAULT_CHUNK_SIZE};
use super::policy;
use super::SecureBytes;
use crate::error::{CryptoError, Result};

/// CBC initialization vector length (one AES block)
pub const IV_LEN: usize = 16;

const BLOCK_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AeAlgorithm {
    Aes128CbcHmacSha256,
    Aes192CbcHmacSha384,
    Aes256CbcHmacSha384,
    Aes256CbcHmacSha512,
}

impl AeAlgorithm {
    pub const ALL: [AeAlgorithm; 4] = [
        AeAlgorithm::Aes128CbcHmacSha256,
        AeAlgorithm::Aes192CbcHmacSha384,
        AeAlgorithm::Aes256CbcHmacSha384,
        AeAlgorithm::Aes256CbcHmacSha512,
    ];

    pub const fn enc_key_bits(self) -> usize {
        match self {
            AeAlgorithm::Aes128CbcHmacSha256 => 128,
            AeAlgorithm::Aes192CbcHmacSha384 => 192,
            AeAlgorithm::Aes256CbcHmacSha384 | AeAlgorithm::Aes256CbcHmacSha512 => 256,
        }
    }

    /// MAC key is as long as the encryption key
    pub const fn mac_key_bits(self) -> usize {
        self.enc_key_bits()
    }

    pub const fn mac_digest(self) -> DigestAlgorithm {
        match self {
            AeAlgorithm::Aes128CbcHmacSha256 => DigestAlgorithm::Sha256,
            AeAlgorithm::Aes192CbcHmacSha384 | AeAlgorithm::Aes256CbcHmacSha384 => {
                DigestAlgorithm::Sha384
            }
            AeAlgorithm::Aes256CbcHmacSha512 => DigestAlgorithm::Sha512,
        }
    }

    /// Truncated tag length in bytes
    pub const fn tag_len(self) -> usize {
        match self {
            AeAlgorithm::Aes128CbcHmacSha256 => 16,
            AeAlgorithm::Aes192CbcHmacSha384 | AeAlgorithm::Aes256CbcHmacSha384 => 24,
            AeAlgorithm::Aes256CbcHmacSha512 => 32,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            AeAlgorithm::Aes128CbcHmacSha256 => "aes-128-cbc-hmac-sha256",
            AeAlgorithm::Aes192CbcHmacSha384 => "aes-192-cbc-hmac-sha384",
            AeAlgorithm::Aes256CbcHmacSha384 => "aes-256-cbc-hmac-sha384",
            AeAlgorithm::Aes256CbcHmacSha512 => "aes-256-cbc-hmac-sha512",
        }
    }
}

impl std::fmt::Display for AeAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AeAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace(['-', '_'], "");
        AeAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name().replace('-', "") == normalized)
            .ok_or_else(|| CryptoError::UnsupportedFormat(format!("неизвестный алгоритм '{}'", s)))
    }
}

/// Output of an in-memory composed encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedSealed {
    pub ciphertext: Vec<u8>,
    pub iv: [u8; IV_LEN],
    pub tag: Vec<u8>,
}

impl ComposedSealed {
    /// Layout: [16 bytes: IV][N bytes: ciphertext][T bytes: tag]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_LEN + self.ciphertext.len() + self.tag.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    pub fn from_bytes(algorithm: AeAlgorithm, bytes: &[u8]) -> Result<Self> {
        let tag_len = algorithm.tag_len();
        if bytes.len() < IV_LEN + BLOCK_LEN + tag_len {
            return Err(CryptoError::InvalidLength(format!(
                "зашифрованный блок слишком короткий: {} байт (минимум {})",
                bytes.len(),
                IV_LEN + BLOCK_LEN + tag_len
            )));
        }

        let mut iv = [0u8; IV_LEN];
        iv.copy_from_slice(&bytes[..IV_LEN]);
        let split = bytes.len() - tag_len;

        Ok(Self {
            ciphertext: bytes[IV_LEN..split].to_vec(),
            iv,
            tag: bytes[split..].to_vec(),
        })
    }
}

/// Summary of a file encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSealed {
    pub iv: [u8; IV_LEN],
    pub tag: Vec<u8>,
    pub plaintext_len: u64,
    pub ciphertext_len: u64,
}

/// Encrypt-then-MAC cipher holding its two keys
#[derive(Debug, Clone)]
pub struct ComposedCipher {
    algorithm: AeAlgorithm,
    enc_key: SecureBytes,
    mac_key: SecureBytes,
    chunk_size: usize,
}

impl ComposedCipher {
    /// Both keys are checked against the variant's lengths here
    pub fn new(algorithm: AeAlgorithm, enc_key: &[u8], mac_key: &[u8]) -> Result<Self> {
        policy::validate_key_length(algorithm.enc_key_bits(), enc_key)?;
        policy::validate_key_length(algorithm.mac_key_bits(), mac_key)?;

        Ok(Self {
            algorithm,
            enc_key: SecureBytes::from(enc_key),
            mac_key: SecureBytes::from(mac_key),
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    /// Split a composite key as `MAC_KEY ‖ ENC_KEY` (RFC 7518 §5.2.2.1)
    pub fn from_composite_key(algorithm: AeAlgorithm, key: &[u8]) -> Result<Self> {
        let mac_len = algorithm.mac_key_bits() / 8;
        policy::validate_key_length(algorithm.mac_key_bits() + algorithm.enc_key_bits(), key)?;
        let (mac_key, enc_key) = key.split_at(mac_len);
        Self::new(algorithm, enc_key, mac_key)
    }

    /// Fresh random keys; `composite_key()` exports them
    pub fn generate(algorithm: AeAlgorithm) -> Self {
        let mut enc_key = SecureBytes::zeroed(algorithm.enc_key_bits() / 8);
        let mut mac_key = SecureBytes::zeroed(algorithm.mac_key_bits() / 8);
        OsRng.fill_bytes(enc_key.as_mut_slice());
        OsRng.fill_bytes(mac_key.as_mut_slice());

        Self {
            algorithm,
            enc_key,
            mac_key,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read size used by the file operations
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(BLOCK_LEN);
        self
    }

    pub fn algorithm(&self) -> AeAlgorithm {
        self.algorithm
    }

    /// `MAC_KEY ‖ ENC_KEY`, the inverse of [`from_composite_key`](Self::from_composite_key)
    pub fn composite_key(&self) -> SecureBytes {
        let mut key = SecureBytes::zeroed(self.mac_key.len() + self.enc_key.len());
        let out = key.as_mut_slice();
        out[..self.mac_key.len()].copy_from_slice(&self.mac_key);
        out[self.mac_key.len()..].copy_from_slice(&self.enc_key);
        key
    }

    pub fn encrypt(&self, plaintext: &[u8], associated_data: Option<&[u8]>) -> Result<ComposedSealed> {
        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let ciphertext = cbc_encrypt(self.algorithm, &self.enc_key, &iv, plaintext)?;
        let tag = self.compute_tag(&iv, &ciphertext, associated_data)?;

        debug!(
            algorithm = %self.algorithm,
            bytes = plaintext.len(),
            "composed encrypted"
        );

        Ok(ComposedSealed { ciphertext, iv, tag })
    }

    /// Authenticate, then decrypt and strip padding
    ///
    /// # Errors
    /// * `InvalidNonce` - IV is not 16 bytes
    /// * `AuthenticationFailed` - tag does not verify; padding is not examined
    /// * `InvalidPadding` - only after the tag verified
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        iv: &[u8],
        tag: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<SecureBytes> {
        if iv.len() != IV_LEN {
            return Err(CryptoError::InvalidNonce {
                expected: IV_LEN,
                actual: iv.len(),
            });
        }

        let expected = self.compute_tag(iv, ciphertext, associated_data)?;
        if !constant_time_eq(&expected, tag) {
            warn!(algorithm = %self.algorithm, "composed authentication failed");
            return Err(CryptoError::AuthenticationFailed);
        }

        let plaintext = cbc_decrypt(self.algorithm, &self.enc_key, iv, ciphertext)?;
        debug!(algorithm = %self.algorithm, bytes = plaintext.len(), "composed decrypted");
        Ok(plaintext)
    }

    /// Decrypt a blob in the [`ComposedSealed::to_bytes`] layout
    pub fn decrypt_bytes(&self, sealed: &[u8], associated_data: Option<&[u8]>) -> Result<SecureBytes> {
        let sealed = ComposedSealed::from_bytes(self.algorithm, sealed)?;
        self.decrypt(&sealed.ciphertext, &sealed.iv, &sealed.tag, associated_data)
    }

    pub fn encrypt_file(&self, src: &Path, dst: &Path) -> Result<FileSealed> {
        self.encrypt_file_with_progress(src, dst, |_| {})
    }

    /// Stream `src` into `dst` as `IV ‖ ciphertext`, then append the tag.
    /// `on_progress` counts plaintext bytes read. On any failure after `dst`
    /// was created it is removed, so no untagged file is left behind.
    pub fn encrypt_file_with_progress<F>(&self, src: &Path, dst: &Path, on_progress: F) -> Result<FileSealed>
    where
        F: FnMut(FileProgress),
    {
        let (mut input, _, plaintext_len) = open_range(src, None)?;

        let mut iv = [0u8; IV_LEN];
        OsRng.fill_bytes(&mut iv);

        let output = File::create(dst)?;
        let tag = match self.write_encrypted(&mut input, plaintext_len, output, dst, &iv, on_progress) {
            Ok(tag) => tag,
            Err(e) => {
                let _ = fs::remove_file(dst);
                return Err(e);
            }
        };

        let ciphertext_len = (plaintext_len / BLOCK_LEN as u64 + 1) * BLOCK_LEN as u64;
        debug!(
            algorithm = %self.algorithm,
            src = %src.display(),
            dst = %dst.display(),
            bytes = plaintext_len,
            "file encrypted"
        );

        Ok(FileSealed {
            iv,
            tag,
            plaintext_len,
            ciphertext_len,
        })
    }

    fn write_encrypted<F>(
        &self,
        input: &mut File,
        plaintext_len: u64,
        output: File,
        dst: &Path,
        iv: &[u8; IV_LEN],
        mut on_progress: F,
    ) -> Result<Vec<u8>>
    where
        F: FnMut(FileProgress),
    {
        let mut mac = Hasher::new(self.algorithm.mac_digest(), Some(&self.mac_key[..]))?;
        let mut encryptor = CbcEncryptor::new(self.algorithm, &self.enc_key, iv)?;
        let mut output = BufWriter::new(output);

        output.write_all(iv)?;
        mac.update(iv);

        let mut carry: Vec<u8> = Vec::with_capacity(self.chunk_size + BLOCK_LEN);
        let mut processed = 0u64;
        let streamed = stream_range(input, 0, plaintext_len, self.chunk_size, |chunk| {
            carry.extend_from_slice(chunk);
            let ready = carry.len() / BLOCK_LEN * BLOCK_LEN;
            encryptor.encrypt_blocks(&mut carry[..ready]);
            mac.update(&carry[..ready]);
            output.write_all(&carry[..ready])?;
            carry.drain(..ready);

            processed += chunk.len() as u64;
            on_progress(FileProgress {
                bytes_processed: processed,
                total_bytes: plaintext_len,
            });
            Ok(())
        });

        let last = streamed.and_then(|_| encryptor.finish(&carry));
        carry.zeroize();
        let last = last?;
        mac.update(&last);
        output.write_all(&last)?;
        output.flush()?;
        drop(output);

        mac.update(&0u64.to_be_bytes());
        let tag = truncate_tag(self.algorithm, mac.finalize());

        let mut appender = OpenOptions::new().append(true).open(dst)?;
        appender.write_all(&tag)?;
        appender.sync_all()?;

        Ok(tag)
    }

    pub fn decrypt_file(&self, src: &Path, dst: &Path) -> Result<u64> {
        self.decrypt_file_with_progress(src, dst, |_| {})
    }

    /// Verify the tag over the whole `IV ‖ ciphertext` window of `src`, then
    /// stream the plaintext into `dst`. `dst` is not created unless the tag
    /// verifies. Returns the plaintext length.
    ///
    /// `src` is read twice; a concurrent writer between the two passes is not
    /// detected, as no lock is held on the file.
    pub fn decrypt_file_with_progress<F>(&self, src: &Path, dst: &Path, mut on_progress: F) -> Result<u64>
    where
        F: FnMut(FileProgress),
    {
        let (mut input, _, file_len) = open_range(src, None)?;
        let tag_len = self.algorithm.tag_len() as u64;
        let header = IV_LEN as u64;

        let minimum = header + BLOCK_LEN as u64 + tag_len;
        if file_len < minimum {
            return Err(CryptoError::InvalidLength(format!(
                "зашифрованный файл слишком короткий: {} байт (минимум {})",
                file_len, minimum
            )));
        }
        let authenticated_len = file_len - tag_len;
        let ciphertext_len = authenticated_len - header;
        let total = authenticated_len + ciphertext_len;

        let mut tag = vec![0u8; tag_len as usize];
        input.seek(SeekFrom::Start(authenticated_len))?;
        input.read_exact(&mut tag)?;

        let mut mac = Hasher::new(self.algorithm.mac_digest(), Some(&self.mac_key[..]))?;
        let mut processed = 0u64;
        stream_range(&mut input, 0, authenticated_len, self.chunk_size, |chunk| {
            mac.update(chunk);
            processed += chunk.len() as u64;
            on_progress(FileProgress {
                bytes_processed: processed,
                total_bytes: total,
            });
            Ok(())
        })?;
        mac.update(&0u64.to_be_bytes());
        let expected = truncate_tag(self.algorithm, mac.finalize());

        if !constant_time_eq(&expected, &tag) {
            warn!(algorithm = %self.algorithm, src = %src.display(), "file authentication failed");
            return Err(CryptoError::AuthenticationFailed);
        }

        if ciphertext_len % BLOCK_LEN as u64 != 0 {
            return Err(CryptoError::InvalidPadding);
        }

        let mut iv = [0u8; IV_LEN];
        input.seek(SeekFrom::Start(0))?;
        input.read_exact(&mut iv)?;

        let mut decryptor = CbcDecryptor::new(self.algorithm, &self.enc_key, &iv)?;
        let mut output = BufWriter::new(File::create(dst)?);
        let mut written = 0u64;

        let mut carry: Vec<u8> = Vec::with_capacity(self.chunk_size + BLOCK_LEN);
        let streamed = stream_range(&mut input, header, ciphertext_len, self.chunk_size, |chunk| {
            carry.extend_from_slice(chunk);
            // Hold back the final block until the end: it carries the padding
            let ready = if carry.len() <= BLOCK_LEN {
                0
            } else {
                (carry.len() - 1) / BLOCK_LEN * BLOCK_LEN
            };
            decryptor.decrypt_blocks(&mut carry[..ready]);
            output.write_all(&carry[..ready])?;
            written += ready as u64;
            carry[..ready].zeroize();
            carry.drain(..ready);

            processed += chunk.len() as u64;
            on_progress(FileProgress {
                bytes_processed: processed,
                total_bytes: total,
            });
            Ok(())
        });

        let finished = streamed.and_then(|_| decryptor.finish(&carry)).and_then(|mut tail| {
            output.write_all(&tail)?;
            output.flush()?;
            let len = tail.len() as u64;
            tail.zeroize();
            Ok(len)
        });
        carry.zeroize();

        match finished {
            Ok(tail_len) => {
                written += tail_len;
                drop(output);
                debug!(
                    algorithm = %self.algorithm,
                    src = %src.display(),
                    dst = %dst.display(),
                    bytes = written,
                    "file decrypted"
                );
                Ok(written)
            }
            Err(e) => {
                drop(output);
                let _ = fs::remove_file(dst);
                Err(e)
            }
        }
    }

    fn compute_tag(&self, iv: &[u8], ciphertext: &[u8], associated_data: Option<&[u8]>) -> Result<Vec<u8>> {
        let aad = associated_data.unwrap_or_default();
        let mut mac = Hasher::new(self.algorithm.mac_digest(), Some(&self.mac_key[..]))?;
        mac.update(iv);
        mac.update(ciphertext);
        mac.update(aad);
        mac.update(&(aad.len() as u64 * 8).to_be_bytes());
        Ok(truncate_tag(self.algorithm, mac.finalize()))
    }
}

fn truncate_tag(algorithm: AeAlgorithm, mut full: Vec<u8>) -> Vec<u8> {
    full.truncate(algorithm.tag_len());
    full
}

fn cbc_encrypt(algorithm: AeAlgorithm, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = match algorithm.enc_key_bits() {
        128 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        192 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        _ => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };
    Ok(ciphertext)
}

fn cbc_decrypt(algorithm: AeAlgorithm, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<SecureBytes> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidPadding);
    }

    let mut buffer = SecureBytes::from(ciphertext);
    let plain_len = match algorithm.enc_key_bits() {
        128 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .decrypt_padded_mut::<Pkcs7>(buffer.as_mut_slice())
            .map(|plain| plain.len()),
        192 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .decrypt_padded_mut::<Pkcs7>(buffer.as_mut_slice())
            .map(|plain| plain.len()),
        _ => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
            .map_err(|_| invalid_key(algorithm, key))?
            .decrypt_padded_mut::<Pkcs7>(buffer.as_mut_slice())
            .map(|plain| plain.len()),
    }
    .map_err(|_| CryptoError::InvalidPadding)?;

    buffer.truncate(plain_len);
    Ok(buffer)
}

fn invalid_key(algorithm: AeAlgorithm, key: &[u8]) -> CryptoError {
    CryptoError::InvalidKey {
        expected: algorithm.enc_key_bits() / 8,
        actual: key.len(),
    }
}

enum CbcEncryptor {
    Aes128(cbc::Encryptor<Aes128>),
    Aes192(cbc::Encryptor<Aes192>),
    Aes256(cbc::Encryptor<Aes256>),
}

impl CbcEncryptor {
    fn new(algorithm: AeAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        let invalid = |_| invalid_key(algorithm, key);
        Ok(match algorithm.enc_key_bits() {
            128 => Self::Aes128(cbc::Encryptor::new_from_slices(key, iv).map_err(invalid)?),
            192 => Self::Aes192(cbc::Encryptor::new_from_slices(key, iv).map_err(invalid)?),
            _ => Self::Aes256(cbc::Encryptor::new_from_slices(key, iv).map_err(invalid)?),
        })
    }

    /// `data.len()` must be a multiple of the block length
    fn encrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        for block in data.chunks_exact_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(block);
            match self {
                Self::Aes128(e) => e.encrypt_block_mut(block),
                Self::Aes192(e) => e.encrypt_block_mut(block),
                Self::Aes256(e) => e.encrypt_block_mut(block),
            }
        }
    }

    /// Pad and encrypt the final partial block (`tail.len() < 16`)
    fn finish(self, tail: &[u8]) -> Result<Vec<u8>> {
        let mut buf = [0u8; BLOCK_LEN];
        buf[..tail.len()].copy_from_slice(tail);
        let padded = match self {
            Self::Aes128(e) => e.encrypt_padded_mut::<Pkcs7>(&mut buf, tail.len()).map(<[u8]>::to_vec),
            Self::Aes192(e) => e.encrypt_padded_mut::<Pkcs7>(&mut buf, tail.len()).map(<[u8]>::to_vec),
            Self::Aes256(e) => e.encrypt_padded_mut::<Pkcs7>(&mut buf, tail.len()).map(<[u8]>::to_vec),
        };
        buf.zeroize();
        padded.map_err(|_| CryptoError::InvalidPadding)
    }
}

enum CbcDecryptor {
    Aes128(cbc::Decryptor<Aes128>),
    Aes192(cbc::Decryptor<Aes192>),
    Aes256(cbc::Decryptor<Aes256>),
}

impl CbcDecryptor {
    fn new(algorithm: AeAlgorithm, key: &[u8], iv: &[u8]) -> Result<Self> {
        let invalid = |_| invalid_key(algorithm, key);
        Ok(match algorithm.enc_key_bits() {
            128 => Self::Aes128(cbc::Decryptor::new_from_slices(key, iv).map_err(invalid)?),
            192 => Self::Aes192(cbc::Decryptor::new_from_slices(key, iv).map_err(invalid)?),
            _ => Self::Aes256(cbc::Decryptor::new_from_slices(key, iv).map_err(invalid)?),
        })
    }

    fn decrypt_blocks(&mut self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);
        for block in data.chunks_exact_mut(BLOCK_LEN) {
            let block = GenericArray::from_mut_slice(block);
            match self {
                Self::Aes128(d) => d.decrypt_block_mut(block),
                Self::Aes192(d) => d.decrypt_block_mut(block),
                Self::Aes256(d) => d.decrypt_block_mut(block),
            }
        }
    }

    /// Decrypt the final block and strip its padding
    fn finish(self, last: &[u8]) -> Result<Vec<u8>> {
        if last.len() != BLOCK_LEN {
            return Err(CryptoError::InvalidPadding);
        }
        let mut buf = [0u8; BLOCK_LEN];
        buf.copy_from_slice(last);
        let plain = match self {
            Self::Aes128(d) => d.decrypt_padded_mut::<Pkcs7>(&mut buf).map(<[u8]>::to_vec),
            Self::Aes192(d) => d.decrypt_padded_mut::<Pkcs7>(&mut buf).map(<[u8]>::to_vec),
            Self::Aes256(d) => d.decrypt_padded_mut::<Pkcs7>(&mut buf).map(<[u8]>::to_vec),
        };
        buf.zeroize();
        plain.map_err(|_| CryptoError::InvalidPadding)
    }
}
