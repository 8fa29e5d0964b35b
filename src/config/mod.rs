//! Configuration management for secure-crypt
//!
//! Settings are plain JSON and hold no secrets:
//! - Default algorithms per capability
//! - PBKDF2 iteration count
//! - File chunk size and output encoding

mod settings;

pub use settings::{default_locations, get_exe_dir, Settings};
