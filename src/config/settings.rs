//! Persisted defaults for the command-line tool

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::digest::DEFAULT_CHUNK_SIZE;
use crate::crypto::{policy, AeAlgorithm, AeadAlgorithm, DigestAlgorithm, Prf};
use crate::encoding::Encoding;
use crate::error::{CryptoError, Result};

const CONFIG_FILE: &str = "secure-crypt.json";
const CONFIG_DIR: &str = "secure-crypt";
const CONFIG_DIR_FILE: &str = "config.json";

/// Algorithm choices and tuning knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File read size in bytes (multiple of 16)
    pub chunk_size: usize,
    pub digest_algorithm: DigestAlgorithm,
    pub aead_algorithm: AeadAlgorithm,
    pub ae_algorithm: AeAlgorithm,
    pub prf: Prf,
    /// PBKDF2 iterations; the PRF minimum when absent
    pub iterations: Option<u32>,
    pub encoding: Encoding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            digest_algorithm: DigestAlgorithm::Sha256,
            aead_algorithm: AeadAlgorithm::Aes256Gcm,
            ae_algorithm: AeAlgorithm::Aes256CbcHmacSha512,
            prf: Prf::HmacSha256,
            iterations: None,
            encoding: Encoding::Hex,
        }
    }
}

impl Settings {
    /// Iteration count to use for new derivations
    pub fn effective_iterations(&self) -> u32 {
        self.iterations.unwrap_or_else(|| self.prf.default_iterations())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < 16 || self.chunk_size % 16 != 0 {
            return Err(CryptoError::InvalidConfig(format!(
                "chunk_size должен быть кратен 16 и не меньше 16, получено {}",
                self.chunk_size
            )));
        }

        if let Some(iterations) = self.iterations {
            policy::validate_iterations(self.prf, iterations)
                .map_err(|e| CryptoError::InvalidConfig(e.to_string()))?;
        }

        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|e| CryptoError::from_io_at(e, path))?;
        let settings: Settings = serde_json::from_slice(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Explicit path, then next to the executable, then the user config dir.
    /// Defaults when nothing is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        for candidate in default_locations() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "loading settings");
                return Self::load_from(&candidate);
            }
        }

        Ok(Self::default())
    }
}

/// Directory of the running executable
pub fn get_exe_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;

    exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| {
            CryptoError::InvalidConfig("Не удалось определить директорию исполняемого файла".into())
        })
}

/// Candidate settings files in lookup order
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(dir) = get_exe_dir() {
        locations.push(dir.join(CONFIG_FILE));
    }
    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(CONFIG_DIR).join(CONFIG_DIR_FILE));
    }
    locations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.effective_iterations(), policy::MIN_ITERATIONS_SHA256);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "digest_algorithm": "sha512", "prf": "hmac-sha512" }"#).unwrap();
        assert_eq!(settings.digest_algorithm, DigestAlgorithm::Sha512);
        assert_eq!(settings.prf, Prf::HmacSha512);
        assert_eq!(settings.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(settings.aead_algorithm, AeadAlgorithm::Aes256Gcm);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let settings = Settings {
            chunk_size: 100,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(CryptoError::InvalidConfig(_))));

        let settings = Settings {
            iterations: Some(10),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(CryptoError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let settings = Settings {
            encoding: Encoding::Base64,
            ae_algorithm: AeAlgorithm::Aes128CbcHmacSha256,
            iterations: Some(700_000),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load(Some(&path)).unwrap(), settings);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("nope.json")));
        assert!(matches!(result, Err(CryptoError::FileNotFound(_))));
    }
}
