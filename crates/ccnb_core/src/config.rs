//! Process-level configuration for the snapshot store.
//!
//! # Responsibility
//! - Resolve the storage root once per process start.
//! - Carry KDF cost parameters used for newly sealed files.
//!
//! # Invariants
//! - A `CCNB_PATH` override that points at a regular file is ignored.
//! - A resolved `StoreConfig` is never mutated by core code.

use crate::storage::cipher::KdfParams;
use directories::BaseDirs;
use log::{info, warn};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable overriding the storage root.
pub const STORE_DIR_ENV: &str = "CCNB_PATH";
/// Directory created under the home directory when no override applies.
pub const DEFAULT_DIR_NAME: &str = ".ccnb";
pub const PLAIN_EXTENSION: &str = "snap";
pub const ENCRYPTED_EXTENSION: &str = "snap.enc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither an override nor a home directory is available.
    NoHomeDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoHomeDir => write!(
                f,
                "cannot determine home directory; set {STORE_DIR_ENV} to a directory"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Immutable store configuration passed to `SecureStore::new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    base_dir: PathBuf,
    kdf: KdfParams,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            kdf: KdfParams::default(),
        }
    }

    /// Resolves the root from `CCNB_PATH`, falling back to `~/.ccnb`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let base_dir = resolve_base_dir(std::env::var_os(STORE_DIR_ENV), home)?;
        info!(
            "event=config_resolve module=config status=ok base_dir={}",
            base_dir.display()
        );
        Ok(Self::new(base_dir))
    }

    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn kdf(&self) -> KdfParams {
        self.kdf
    }
}

/// Picks the storage root from an optional override and the home directory.
pub fn resolve_base_dir(
    override_dir: Option<OsString>,
    home: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(raw) = override_dir.filter(|value| !value.is_empty()) {
        let candidate = PathBuf::from(raw);
        if !candidate.is_file() {
            return Ok(candidate);
        }
        warn!(
            "event=config_resolve module=config status=fallback reason=override_is_file path={}",
            candidate.display()
        );
    }
    home.map(|home| home.join(DEFAULT_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::{resolve_base_dir, ConfigError, DEFAULT_DIR_NAME};
    use std::ffi::OsString;
    use std::path::PathBuf;

    #[test]
    fn override_directory_wins_even_if_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-yet-created");
        let resolved = resolve_base_dir(
            Some(OsString::from(missing.as_os_str())),
            Some(PathBuf::from("/home/someone")),
        )
        .unwrap();
        assert_eq!(resolved, missing);
    }

    #[test]
    fn override_pointing_at_file_falls_back_to_home() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let home = dir.path().join("home");
        let resolved =
            resolve_base_dir(Some(OsString::from(file.as_os_str())), Some(home.clone())).unwrap();
        assert_eq!(resolved, home.join(DEFAULT_DIR_NAME));
    }

    #[test]
    fn empty_override_is_ignored() {
        let resolved =
            resolve_base_dir(Some(OsString::new()), Some(PathBuf::from("/home/someone"))).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/someone").join(DEFAULT_DIR_NAME));
    }

    #[test]
    fn missing_home_without_override_is_an_error() {
        assert_eq!(resolve_base_dir(None, None), Err(ConfigError::NoHomeDir));
    }
}
