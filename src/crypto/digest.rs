//! Hash and HMAC digests over buffers, strings and file ranges
//!
//! A [`DigestEngine`] streams files in fixed-size chunks and reports
//! cumulative progress after every chunk. Verification always goes through
//! [`constant_time_eq`] after the expected length has been checked.
//!
//! Digests of adjacent windows are NOT composable: concatenating the digests
//! of `[0, n)` and `[n, len)` has nothing to do with the digest of the whole
//! file. Hash each window for what it is.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use hmac::{Hmac, Mac};
use md5::Md5;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest as HashDigest, Sha256, Sha384, Sha512};
use tracing::debug;

use super::ct::constant_time_eq;
use super::SecureBytes;
use crate::encoding::Encoding;
use crate::error::{CryptoError, Result};

/// Default read size for file digests (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Hash function family; with a key the same variant selects HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub const ALL: [DigestAlgorithm; 5] = [
        DigestAlgorithm::Md5,
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    /// Output length in bytes (128/160/256/384/512 bits)
    pub const fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Internal block length, also the size of generated HMAC keys
    pub const fn block_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 | DigestAlgorithm::Sha1 | DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha384 | DigestAlgorithm::Sha512 => 128,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_ascii_lowercase().replace('-', "");
        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name() == normalized)
            .ok_or_else(|| {
                CryptoError::UnsupportedFormat(format!("неизвестный алгоритм хеширования '{}'", s))
            })
    }
}

enum State {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    HmacMd5(Hmac<Md5>),
    HmacSha1(Hmac<Sha1>),
    HmacSha256(Hmac<Sha256>),
    HmacSha384(Hmac<Sha384>),
    HmacSha512(Hmac<Sha512>),
}

/// Running hash or HMAC state
pub struct Hasher {
    algorithm: DigestAlgorithm,
    state: State,
}

impl Hasher {
    /// Start a digest; `Some(key)` selects HMAC and the key must not be empty
    pub fn new(algorithm: DigestAlgorithm, key: Option<&[u8]>) -> Result<Self> {
        let state = match key {
            None => match algorithm {
                DigestAlgorithm::Md5 => State::Md5(Md5::new()),
                DigestAlgorithm::Sha1 => State::Sha1(Sha1::new()),
                DigestAlgorithm::Sha256 => State::Sha256(Sha256::new()),
                DigestAlgorithm::Sha384 => State::Sha384(Sha384::new()),
                DigestAlgorithm::Sha512 => State::Sha512(Sha512::new()),
            },
            Some(key) => {
                if key.is_empty() {
                    return Err(CryptoError::InvalidKey {
                        expected: algorithm.block_len(),
                        actual: 0,
                    });
                }
                let invalid = |_| CryptoError::InvalidKey {
                    expected: algorithm.block_len(),
                    actual: key.len(),
                };
                match algorithm {
                    DigestAlgorithm::Md5 => {
                        State::HmacMd5(Hmac::<Md5>::new_from_slice(key).map_err(invalid)?)
                    }
                    DigestAlgorithm::Sha1 => {
                        State::HmacSha1(Hmac::<Sha1>::new_from_slice(key).map_err(invalid)?)
                    }
                    DigestAlgorithm::Sha256 => {
                        State::HmacSha256(Hmac::<Sha256>::new_from_slice(key).map_err(invalid)?)
                    }
                    DigestAlgorithm::Sha384 => {
                        State::HmacSha384(Hmac::<Sha384>::new_from_slice(key).map_err(invalid)?)
                    }
                    DigestAlgorithm::Sha512 => {
                        State::HmacSha512(Hmac::<Sha512>::new_from_slice(key).map_err(invalid)?)
                    }
                }
            }
        };

        Ok(Self { algorithm, state })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn is_keyed(&self) -> bool {
        matches!(
            self.state,
            State::HmacMd5(_)
                | State::HmacSha1(_)
                | State::HmacSha256(_)
                | State::HmacSha384(_)
                | State::HmacSha512(_)
        )
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            State::Md5(h) => HashDigest::update(h, data),
            State::Sha1(h) => HashDigest::update(h, data),
            State::Sha256(h) => HashDigest::update(h, data),
            State::Sha384(h) => HashDigest::update(h, data),
            State::Sha512(h) => HashDigest::update(h, data),
            State::HmacMd5(m) => Mac::update(m, data),
            State::HmacSha1(m) => Mac::update(m, data),
            State::HmacSha256(m) => Mac::update(m, data),
            State::HmacSha384(m) => Mac::update(m, data),
            State::HmacSha512(m) => Mac::update(m, data),
        }
    }

    /// Finish and return exactly `algorithm.output_len()` bytes
    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            State::Md5(h) => h.finalize().to_vec(),
            State::Sha1(h) => h.finalize().to_vec(),
            State::Sha256(h) => h.finalize().to_vec(),
            State::Sha384(h) => h.finalize().to_vec(),
            State::Sha512(h) => h.finalize().to_vec(),
            State::HmacMd5(m) => m.finalize().into_bytes().to_vec(),
            State::HmacSha1(m) => m.finalize().into_bytes().to_vec(),
            State::HmacSha256(m) => m.finalize().into_bytes().to_vec(),
            State::HmacSha384(m) => m.finalize().into_bytes().to_vec(),
            State::HmacSha512(m) => m.finalize().into_bytes().to_vec(),
        }
    }
}

/// Byte range `[offset, offset + count)` inside a file or buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekWindow {
    pub offset: u64,
    pub count: u64,
}

impl SeekWindow {
    pub fn new(offset: u64, count: u64) -> Self {
        Self { offset, count }
    }

    /// Check the window against the length of the underlying data
    pub fn validate(&self, len: u64) -> Result<()> {
        let out_of_range = CryptoError::InvalidRange {
            offset: self.offset,
            count: self.count,
            len,
        };
        if self.count == 0 {
            return Err(out_of_range);
        }
        match self.offset.checked_add(self.count) {
            Some(end) if end <= len => Ok(()),
            _ => Err(out_of_range),
        }
    }
}

/// Cumulative progress of a file scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileProgress {
    pub bytes_processed: u64,
    pub total_bytes: u64,
}

impl FileProgress {
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.bytes_processed as f64 * 100.0 / self.total_bytes as f64
    }
}

/// A finished digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    algorithm: DigestAlgorithm,
    keyed: bool,
    bytes: Vec<u8>,
}

impl Digest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// True for HMAC digests
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn encode(&self, encoding: Encoding) -> String {
        encoding.encode(&self.bytes)
    }

    /// Constant-time comparison against an expected value
    pub fn matches(&self, expected: &[u8]) -> bool {
        constant_time_eq(&self.bytes, expected)
    }
}

pub(crate) fn finish(hasher: Hasher) -> Digest {
    let algorithm = hasher.algorithm();
    let keyed = hasher.is_keyed();
    Digest {
        algorithm,
        keyed,
        bytes: hasher.finalize(),
    }
}

/// Open `path` and resolve the byte range to read. Nothing is read yet.
pub(crate) fn open_range(path: &Path, window: Option<SeekWindow>) -> Result<(File, u64, u64)> {
    let file = File::open(path).map_err(|e| CryptoError::from_io_at(e, path))?;
    let metadata = file.metadata()?;
    if !metadata.is_file() {
        return Err(CryptoError::FileNotFound(path.to_path_buf()));
    }

    let len = metadata.len();
    match window {
        Some(window) => {
            window.validate(len)?;
            Ok((file, window.offset, window.count))
        }
        None => Ok((file, 0, len)),
    }
}

/// Read `count` bytes starting at `offset` in chunks of at most `chunk_size`
pub(crate) fn stream_range<F>(
    file: &mut File,
    offset: u64,
    count: u64,
    chunk_size: usize,
    mut on_chunk: F,
) -> Result<()>
where
    F: FnMut(&[u8]) -> Result<()>,
{
    file.seek(SeekFrom::Start(offset))?;

    let mut buffer = vec![0u8; chunk_size.min(count as usize).max(1)];
    let mut remaining = count;
    while remaining > 0 {
        let take = (remaining as usize).min(buffer.len());
        file.read_exact(&mut buffer[..take])?;
        on_chunk(&buffer[..take])?;
        remaining -= take as u64;
    }

    Ok(())
}

/// Computes and verifies digests
#[derive(Debug, Clone)]
pub struct DigestEngine {
    chunk_size: usize,
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl DigestEngine {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Random HMAC key of the algorithm's block length
    pub fn generate_hmac_key(algorithm: DigestAlgorithm) -> SecureBytes {
        let mut key = SecureBytes::zeroed(algorithm.block_len());
        OsRng.fill_bytes(key.as_mut_slice());
        key
    }

    pub fn compute_bytes(
        &self,
        data: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<Digest> {
        let mut hasher = Hasher::new(algorithm, key)?;
        hasher.update(data);
        debug!(%algorithm, keyed = key.is_some(), bytes = data.len(), "digest computed");
        Ok(finish(hasher))
    }

    pub fn compute_bytes_range(
        &self,
        data: &[u8],
        window: SeekWindow,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<Digest> {
        window.validate(data.len() as u64)?;
        let start = window.offset as usize;
        let end = start + window.count as usize;
        self.compute_bytes(&data[start..end], algorithm, key)
    }

    pub fn compute_str(
        &self,
        text: &str,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<Digest> {
        self.compute_bytes(text.as_bytes(), algorithm, key)
    }

    /// Digest a whole file, or only `window` when given
    pub fn compute_file(
        &self,
        path: &Path,
        window: Option<SeekWindow>,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<Digest> {
        self.compute_file_with_progress(path, window, algorithm, key, |_| {})
    }

    /// Like [`compute_file`](Self::compute_file), calling `on_progress` on
    /// the current thread after every chunk
    pub fn compute_file_with_progress<F>(
        &self,
        path: &Path,
        window: Option<SeekWindow>,
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        mut on_progress: F,
    ) -> Result<Digest>
    where
        F: FnMut(FileProgress),
    {
        let mut hasher = Hasher::new(algorithm, key)?;
        let (mut file, offset, count) = open_range(path, window)?;

        let mut processed = 0u64;
        stream_range(&mut file, offset, count, self.chunk_size, |chunk| {
            hasher.update(chunk);
            processed += chunk.len() as u64;
            on_progress(FileProgress {
                bytes_processed: processed,
                total_bytes: count,
            });
            Ok(())
        })?;

        debug!(
            %algorithm,
            keyed = key.is_some(),
            path = %path.display(),
            offset,
            bytes = count,
            "file digest computed"
        );
        Ok(finish(hasher))
    }

    pub fn verify_bytes(
        &self,
        data: &[u8],
        expected: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<bool> {
        check_expected_len(expected, algorithm)?;
        Ok(self.compute_bytes(data, algorithm, key)?.matches(expected))
    }

    pub fn verify_str(
        &self,
        text: &str,
        expected: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<bool> {
        self.verify_bytes(text.as_bytes(), expected, algorithm, key)
    }

    /// Verify the digest of `window` inside `data`. The expected length is
    /// checked before the window.
    pub fn verify_bytes_range(
        &self,
        data: &[u8],
        window: SeekWindow,
        expected: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<bool> {
        check_expected_len(expected, algorithm)?;
        Ok(self
            .compute_bytes_range(data, window, algorithm, key)?
            .matches(expected))
    }

    pub fn verify_file(
        &self,
        path: &Path,
        window: Option<SeekWindow>,
        expected: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
    ) -> Result<bool> {
        self.verify_file_with_progress(path, window, expected, algorithm, key, |_| {})
    }

    pub fn verify_file_with_progress<F>(
        &self,
        path: &Path,
        window: Option<SeekWindow>,
        expected: &[u8],
        algorithm: DigestAlgorithm,
        key: Option<&[u8]>,
        on_progress: F,
    ) -> Result<bool>
    where
        F: FnMut(FileProgress),
    {
        check_expected_len(expected, algorithm)?;
        Ok(self
            .compute_file_with_progress(path, window, algorithm, key, on_progress)?
            .matches(expected))
    }
}

fn check_expected_len(expected: &[u8], algorithm: DigestAlgorithm) -> Result<()> {
    if expected.len() != algorithm.output_len() {
        return Err(CryptoError::LengthMismatch {
            expected: algorithm.output_len(),
            actual: expected.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn hex(digest: &Digest) -> String {
        digest.encode(Encoding::Hex)
    }

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_known_hash_vectors() {
        let engine = DigestEngine::default();
        let cases = [
            (DigestAlgorithm::Md5, "900150983cd24fb0d6963f7d28e17f72"),
            (DigestAlgorithm::Sha1, "a9993e364706816aba3e25717850c26c9cd0d89d"),
            (
                DigestAlgorithm::Sha256,
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            ),
            (
                DigestAlgorithm::Sha384,
                "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7",
            ),
            (
                DigestAlgorithm::Sha512,
                "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
            ),
        ];

        for (algorithm, expected) in cases {
            let digest = engine.compute_str("abc", algorithm, None).unwrap();
            assert_eq!(hex(&digest), expected, "{}", algorithm);
            assert_eq!(digest.as_bytes().len(), algorithm.output_len());
            assert!(!digest.is_keyed());
        }
    }

    #[test]
    fn test_known_hmac_vectors() {
        let engine = DigestEngine::default();
        let data = "what do ya want for nothing?";

        let md5 = engine
            .compute_str(data, DigestAlgorithm::Md5, Some(b"Jefe"))
            .unwrap();
        assert_eq!(hex(&md5), "750c783e6ab0b503eaa86e310a5db738");

        let sha256 = engine
            .compute_str(data, DigestAlgorithm::Sha256, Some(b"Jefe"))
            .unwrap();
        assert_eq!(
            hex(&sha256),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert!(sha256.is_keyed());
    }

    #[test]
    fn test_empty_hmac_key_rejected() {
        let engine = DigestEngine::default();
        let result = engine.compute_bytes(b"data", DigestAlgorithm::Sha256, Some(&[]));
        assert!(matches!(result, Err(CryptoError::InvalidKey { .. })));
    }

    #[test]
    fn test_generated_hmac_key_length() {
        let key = DigestEngine::generate_hmac_key(DigestAlgorithm::Sha512);
        assert_eq!(key.len(), 128);
        let key = DigestEngine::generate_hmac_key(DigestAlgorithm::Sha1);
        assert_eq!(key.len(), 64);
    }

    #[test]
    fn test_verify_checks_length_first() {
        let engine = DigestEngine::default();
        let result = engine.verify_str("abc", &[0u8; 31], DigestAlgorithm::Sha256, None);
        assert!(matches!(
            result,
            Err(CryptoError::LengthMismatch {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn test_verify_bytes() {
        let engine = DigestEngine::default();
        let key = b"integrity-key";
        let digest = engine
            .compute_bytes(b"payload", DigestAlgorithm::Sha384, Some(key))
            .unwrap();

        assert!(engine
            .verify_bytes(b"payload", digest.as_bytes(), DigestAlgorithm::Sha384, Some(key))
            .unwrap());
        assert!(!engine
            .verify_bytes(b"payloaD", digest.as_bytes(), DigestAlgorithm::Sha384, Some(key))
            .unwrap());
        assert!(!engine
            .verify_bytes(b"payload", digest.as_bytes(), DigestAlgorithm::Sha384, Some(b"other"))
            .unwrap());
    }

    #[test]
    fn test_seek_window_validation() {
        assert!(SeekWindow::new(0, 10).validate(10).is_ok());
        assert!(SeekWindow::new(9, 1).validate(10).is_ok());
        assert!(SeekWindow::new(0, 0).validate(10).is_err());
        assert!(SeekWindow::new(5, 6).validate(10).is_err());
        assert!(SeekWindow::new(u64::MAX, 2).validate(10).is_err());
    }

    #[test]
    fn test_bytes_range_matches_slice() {
        let engine = DigestEngine::default();
        let data = b"0123456789abcdef";
        let ranged = engine
            .compute_bytes_range(data, SeekWindow::new(4, 8), DigestAlgorithm::Sha1, None)
            .unwrap();
        let direct = engine
            .compute_bytes(&data[4..12], DigestAlgorithm::Sha1, None)
            .unwrap();
        assert_eq!(ranged, direct);
    }

    #[test]
    fn test_verify_bytes_range() {
        let engine = DigestEngine::default();
        let data = b"0123456789abcdef";
        let window = SeekWindow::new(4, 8);
        let digest = engine
            .compute_bytes(&data[4..12], DigestAlgorithm::Sha256, None)
            .unwrap();

        assert!(engine
            .verify_bytes_range(data, window, digest.as_bytes(), DigestAlgorithm::Sha256, None)
            .unwrap());
        assert!(!engine
            .verify_bytes_range(
                data,
                SeekWindow::new(5, 8),
                digest.as_bytes(),
                DigestAlgorithm::Sha256,
                None
            )
            .unwrap());
    }

    #[test]
    fn test_verify_bytes_range_errors() {
        let engine = DigestEngine::default();
        let data = b"0123456789";
        let out_of_range = SeekWindow::new(8, 5);

        // length is reported even when the window is also bad
        assert!(matches!(
            engine.verify_bytes_range(data, out_of_range, &[0u8; 5], DigestAlgorithm::Sha256, None),
            Err(CryptoError::LengthMismatch {
                expected: 32,
                actual: 5
            })
        ));
        assert!(matches!(
            engine.verify_bytes_range(data, out_of_range, &[0u8; 32], DigestAlgorithm::Sha256, None),
            Err(CryptoError::InvalidRange {
                offset: 8,
                count: 5,
                len: 10
            })
        ));
    }

    #[test]
    fn test_file_digest_matches_buffer() {
        let contents: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let file = temp_file(&contents);
        let engine = DigestEngine::new(1000);

        let from_file = engine
            .compute_file(file.path(), None, DigestAlgorithm::Sha256, None)
            .unwrap();
        let from_buffer = engine
            .compute_bytes(&contents, DigestAlgorithm::Sha256, None)
            .unwrap();
        assert_eq!(from_file, from_buffer);
    }

    #[test]
    fn test_file_window_and_progress() {
        let file = temp_file(b"hello, windowed world");
        let engine = DigestEngine::new(4);

        let mut events = Vec::new();
        let digest = engine
            .compute_file_with_progress(
                file.path(),
                Some(SeekWindow::new(7, 10)),
                DigestAlgorithm::Md5,
                None,
                |p| events.push(p.bytes_processed),
            )
            .unwrap();

        assert_eq!(events, vec![4, 8, 10]);
        let expected = engine
            .compute_bytes(&b"hello, windowed world"[7..17], DigestAlgorithm::Md5, None)
            .unwrap();
        assert_eq!(digest, expected);
    }

    #[test]
    fn test_file_window_out_of_range() {
        let file = temp_file(b"short");
        let engine = DigestEngine::default();

        let mut called = false;
        let result = engine.compute_file_with_progress(
            file.path(),
            Some(SeekWindow::new(2, 4)),
            DigestAlgorithm::Sha256,
            None,
            |_| called = true,
        );

        assert!(matches!(result, Err(CryptoError::InvalidRange { len: 5, .. })));
        assert!(!called);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.bin");
        let engine = DigestEngine::default();

        let result = engine.compute_file(&missing, None, DigestAlgorithm::Sha256, None);
        assert!(matches!(result, Err(CryptoError::FileNotFound(_))));

        let result = engine.compute_file(dir.path(), None, DigestAlgorithm::Sha256, None);
        assert!(matches!(result, Err(CryptoError::FileNotFound(_))));
    }

    #[test]
    fn test_verify_file() {
        let file = temp_file(b"file integrity check");
        let engine = DigestEngine::default();
        let key = b"k";

        let digest = engine
            .compute_file(file.path(), None, DigestAlgorithm::Sha512, Some(key))
            .unwrap();
        assert!(engine
            .verify_file(file.path(), None, digest.as_bytes(), DigestAlgorithm::Sha512, Some(key))
            .unwrap());
        assert!(!engine
            .verify_file(
                file.path(),
                Some(SeekWindow::new(1, 5)),
                digest.as_bytes(),
                DigestAlgorithm::Sha512,
                Some(key)
            )
            .unwrap());
    }

    #[test]
    fn test_adjacent_windows_do_not_compose() {
        let file = temp_file(b"abcdefgh");
        let engine = DigestEngine::default();

        let whole = engine
            .compute_file(file.path(), None, DigestAlgorithm::Sha256, None)
            .unwrap();
        let first = engine
            .compute_file(file.path(), Some(SeekWindow::new(0, 4)), DigestAlgorithm::Sha256, None)
            .unwrap();
        let second = engine
            .compute_file(file.path(), Some(SeekWindow::new(4, 4)), DigestAlgorithm::Sha256, None)
            .unwrap();

        let mut joined = first.into_bytes();
        joined.extend_from_slice(second.as_bytes());
        assert_ne!(joined, whole.as_bytes());
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("SHA-256".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("md5".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Md5);
        assert!("whirlpool".parse::<DigestAlgorithm>().is_err());
    }
}
