//! Password-sealed blobs
//!
//! Combines PBKDF2 and AES-GCM into a self-describing byte layout:
//! [4 bytes: version (u32 BE)]
//! [1 byte: AEAD algorithm id]
//! [1 byte: PRF id]
//! [4 bytes: iterations (u32 BE)]
//! [16 bytes: salt]
//! [12 bytes: nonce]
//! [16 bytes: tag]
//! [N bytes: ciphertext]
//!
//! The header through the salt is passed as associated data, so changing
//! any parameter breaks authentication.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::config::Settings;
use crate::crypto::{AeadAlgorithm, AeadCipher, Pbkdf2, Prf, SecureBytes, NONCE_LEN, REQUIRED_SALT_LEN, TAG_LEN};
use crate::error::{CryptoError, Result};

/// Current version of the envelope layout
pub const FORMAT_VERSION: u32 = 1;

/// Bytes covered by the associated data
pub const PARAMS_LEN: usize = 4 + 1 + 1 + 4 + REQUIRED_SALT_LEN;

/// Everything before the ciphertext
pub const HEADER_LEN: usize = PARAMS_LEN + NONCE_LEN + TAG_LEN;

/// Algorithm choices recorded in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeParams {
    pub aead: AeadAlgorithm,
    pub prf: Prf,
    pub iterations: u32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for EnvelopeParams {
    fn from(settings: &Settings) -> Self {
        Self {
            aead: settings.aead_algorithm,
            prf: settings.prf,
            iterations: settings.effective_iterations(),
        }
    }
}

/// Parsed header of a sealed blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub params: EnvelopeParams,
    pub salt: [u8; REQUIRED_SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
}

impl Envelope {
    /// Parse the header; the ciphertext starts at [`HEADER_LEN`]
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(CryptoError::UnsupportedFormat(format!(
                "данные слишком короткие: {} байт (минимум {})",
                data.len(),
                HEADER_LEN
            )));
        }

        let version = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        if version != FORMAT_VERSION {
            return Err(CryptoError::UnsupportedFormat(format!(
                "неподдерживаемая версия: {}",
                version
            )));
        }

        let aead = AeadAlgorithm::from_id(data[4])
            .ok_or_else(|| CryptoError::UnsupportedFormat(format!("неизвестный AEAD id {}", data[4])))?;
        let prf = Prf::from_id(data[5])
            .ok_or_else(|| CryptoError::UnsupportedFormat(format!("неизвестный PRF id {}", data[5])))?;
        let iterations = u32::from_be_bytes([data[6], data[7], data[8], data[9]]);

        let mut salt = [0u8; REQUIRED_SALT_LEN];
        salt.copy_from_slice(&data[10..PARAMS_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&data[PARAMS_LEN..PARAMS_LEN + NONCE_LEN]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&data[PARAMS_LEN + NONCE_LEN..HEADER_LEN]);

        Ok(Self {
            params: EnvelopeParams { aead, prf, iterations },
            salt,
            nonce,
            tag,
        })
    }
}

fn encode_params(params: &EnvelopeParams, salt: &[u8]) -> Vec<u8> {
    let mut header = Vec::with_capacity(PARAMS_LEN);
    header.extend_from_slice(&FORMAT_VERSION.to_be_bytes());
    header.push(params.aead.id());
    header.push(params.prf.id());
    header.extend_from_slice(&params.iterations.to_be_bytes());
    header.extend_from_slice(salt);
    header
}

/// Derive a key from `password` with a fresh salt and seal `plaintext`
pub fn seal(password: &str, plaintext: &[u8], params: &EnvelopeParams) -> Result<Vec<u8>> {
    let derived = Pbkdf2::new(params.prf).derive_key(
        password,
        params.aead.key_len(),
        None,
        Some(params.iterations),
    )?;

    let header = encode_params(params, &derived.salt);
    let sealed = AeadCipher::new(params.aead).encrypt(&derived.key, plaintext, Some(&header))?;

    let mut data = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
    data.extend_from_slice(&header);
    data.extend_from_slice(&sealed.nonce);
    data.extend_from_slice(&sealed.tag);
    data.extend_from_slice(&sealed.ciphertext);

    debug!(aead = %params.aead, prf = %params.prf, bytes = plaintext.len(), "envelope sealed");
    Ok(data)
}

/// Re-derive the key from the header parameters and open the blob
///
/// A wrong password surfaces as `AuthenticationFailed`.
pub fn open(password: &str, data: &[u8]) -> Result<SecureBytes> {
    let envelope = Envelope::parse(data)?;
    let params = envelope.params;

    let derived = Pbkdf2::new(params.prf).derive_key(
        password,
        params.aead.key_len(),
        Some(&envelope.salt),
        Some(params.iterations),
    )?;

    let plaintext = AeadCipher::new(params.aead).decrypt(
        &derived.key,
        &data[HEADER_LEN..],
        &envelope.nonce,
        &envelope.tag,
        Some(&data[..PARAMS_LEN]),
    )?;

    debug!(aead = %params.aead, prf = %params.prf, bytes = plaintext.len(), "envelope opened");
    Ok(plaintext)
}

pub fn seal_file(password: &str, src: &Path, dst: &Path, params: &EnvelopeParams) -> Result<()> {
    let plaintext = SecureBytes::new(fs::read(src).map_err(|e| CryptoError::from_io_at(e, src))?);
    let data = seal(password, &plaintext, params)?;
    write_private(dst, &data)
}

pub fn open_file(password: &str, src: &Path, dst: &Path) -> Result<()> {
    let data = fs::read(src).map_err(|e| CryptoError::from_io_at(e, src))?;
    let plaintext = open(password, &data)?;
    write_private(dst, &plaintext)
}

fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::policy::MIN_ITERATIONS_SHA512;

    fn params() -> EnvelopeParams {
        EnvelopeParams {
            aead: AeadAlgorithm::Aes256Gcm,
            prf: Prf::HmacSha512,
            iterations: MIN_ITERATIONS_SHA512,
        }
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let data = seal("master password", b"Secret message", &params()).unwrap();
        assert_eq!(data.len(), HEADER_LEN + 14);

        let plain = open("master password", &data).unwrap();
        assert_eq!(&*plain, b"Secret message");
    }

    #[test]
    fn test_wrong_password() {
        let data = seal("master password", b"Secret", &params()).unwrap();
        assert!(matches!(
            open("master passwore", &data),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_header_is_authenticated() {
        let mut data = seal("pw", b"Secret", &params()).unwrap();
        // bump the iteration count by one
        data[9] = data[9].wrapping_add(1);
        assert!(matches!(open("pw", &data), Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_header_parsing() {
        let data = seal("pw", b"", &params()).unwrap();
        let envelope = Envelope::parse(&data).unwrap();
        assert_eq!(envelope.params, params());

        let mut bad_version = data.clone();
        bad_version[3] = 9;
        assert!(matches!(open("pw", &bad_version), Err(CryptoError::UnsupportedFormat(_))));

        let mut bad_alg = data.clone();
        bad_alg[4] = 0xEE;
        assert!(matches!(open("pw", &bad_alg), Err(CryptoError::UnsupportedFormat(_))));

        assert!(matches!(open("pw", &data[..10]), Err(CryptoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_low_iterations_refused_on_open() {
        let mut data = seal("pw", b"x", &params()).unwrap();
        data[6..10].copy_from_slice(&1000u32.to_be_bytes());
        assert!(matches!(
            open("pw", &data),
            Err(CryptoError::IterationCountTooLow { .. })
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("notes.txt");
        let sealed = dir.path().join("notes.sealed");
        let opened = dir.path().join("notes.out");
        fs::write(&src, b"file contents").unwrap();

        seal_file("pw", &src, &sealed, &params()).unwrap();
        open_file("pw", &sealed, &opened).unwrap();
        assert_eq!(fs::read(&opened).unwrap(), b"file contents");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&sealed).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
