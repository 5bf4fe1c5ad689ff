//! Per-user snapshot files, plaintext or password protected.
//!
//! # Responsibility
//! - Map a user name to its snapshot files under the configured root.
//! - Run the load state machine: missing, plaintext, or encrypted with a
//!   bounded number of password attempts.
//! - Write snapshots atomically in the format the password selects.
//!
//! # Invariants
//! - This is the only module that reads or writes snapshot file bytes.
//! - An encrypted file is never bypassed in favour of a plaintext one.
//! - Exhausted password attempts yield `CorruptedFile`, never an empty
//!   snapshot.
//! - No file handle outlives a single load or save call.
//! - Snapshot files are created owner-only (mode 0600 on Unix).
//! - At most one session per user is assumed; there is no file locking.

use crate::config::{StoreConfig, ENCRYPTED_EXTENSION, PLAIN_EXTENSION};
use crate::model::snapshot::Snapshot;
use crate::storage::cipher::{self, CipherError, SealedHeader};
use crate::storage::codec::{decode_snapshot, encode_snapshot, CodecError};
use crate::storage::prompt::{Password, PasswordPrompt};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

/// Password attempts granted per encrypted load.
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

pub type SecureStoreResult<T> = Result<T, SecureStoreError>;

#[derive(Debug)]
pub enum SecureStoreError {
    /// User name cannot be mapped to a file inside the store root.
    InvalidUser(String),
    /// File system failure on the given path.
    Io { path: PathBuf, source: io::Error },
    /// Plaintext snapshot exists but cannot be decoded.
    Decode { path: PathBuf, source: CodecError },
    /// Encrypted snapshot could not be opened: wrong password or damaged file.
    CorruptedFile { path: PathBuf },
    /// Password input failed.
    Prompt(io::Error),
    Encode(CodecError),
    Encrypt(CipherError),
}

impl Display for SecureStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUser(user) => write!(f, "invalid user name `{user}`"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Decode { path, source } => write!(f, "{}: {source}", path.display()),
            Self::CorruptedFile { path } => write!(
                f,
                "wrong password or file is corrupted: {}",
                path.display()
            ),
            Self::Prompt(err) => write!(f, "failed to read password: {err}"),
            Self::Encode(err) => write!(f, "{err}"),
            Self::Encrypt(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SecureStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Prompt(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Encrypt(err) => Some(err),
            Self::InvalidUser(_) | Self::CorruptedFile { .. } => None,
        }
    }
}

/// Which snapshot file a user currently has on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredFormat {
    Missing,
    Plain,
    Encrypted,
}

/// Result of a successful load.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    /// Password that opened the file; `None` for plaintext or fresh loads.
    pub password: Option<Password>,
    pub format: StoredFormat,
}

/// File-backed snapshot store rooted at `StoreConfig::base_dir`.
#[derive(Debug, Clone)]
pub struct SecureStore {
    config: StoreConfig,
}

impl SecureStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// `<root>/<lowercased user>.snap`
    pub fn plain_path(&self, user: &str) -> SecureStoreResult<PathBuf> {
        self.user_path(user, PLAIN_EXTENSION)
    }

    /// `<root>/<lowercased user>.snap.enc`
    pub fn encrypted_path(&self, user: &str) -> SecureStoreResult<PathBuf> {
        self.user_path(user, ENCRYPTED_EXTENSION)
    }

    pub fn stored_format(&self, user: &str) -> SecureStoreResult<StoredFormat> {
        if self.encrypted_path(user)?.is_file() {
            Ok(StoredFormat::Encrypted)
        } else if self.plain_path(user)?.is_file() {
            Ok(StoredFormat::Plain)
        } else {
            Ok(StoredFormat::Missing)
        }
    }

    /// Loads the user's snapshot, prompting for a password when encrypted.
    pub fn load_snapshot(
        &self,
        user: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> SecureStoreResult<LoadedSnapshot> {
        let started_at = Instant::now();
        let format = self.stored_format(user)?;
        let loaded = match format {
            StoredFormat::Missing => {
                info!("event=snapshot_load module=storage status=ok mode=fresh user={user}");
                LoadedSnapshot {
                    snapshot: Snapshot::new(),
                    password: None,
                    format,
                }
            }
            StoredFormat::Plain => {
                let path = self.plain_path(user)?;
                let bytes = read_file(&path)?;
                let snapshot = decode_snapshot(&bytes).map_err(|source| {
                    error!(
                        "event=snapshot_load module=storage status=error mode=plain user={user} error_code=decode_failed error={source}"
                    );
                    SecureStoreError::Decode {
                        path: path.clone(),
                        source,
                    }
                })?;
                LoadedSnapshot {
                    snapshot,
                    password: None,
                    format,
                }
            }
            StoredFormat::Encrypted => self.load_encrypted(user, prompt)?,
        };

        debug!(
            "event=snapshot_load module=storage status=ok user={user} contacts={} notes={} duration_ms={}",
            loaded.snapshot.contacts.len(),
            loaded.snapshot.notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(loaded)
    }

    fn load_encrypted(
        &self,
        user: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> SecureStoreResult<LoadedSnapshot> {
        let path = self.encrypted_path(user)?;
        let sealed = read_file(&path)?;
        if let Err(err) = SealedHeader::parse(&sealed) {
            error!(
                "event=snapshot_load module=storage status=error mode=encrypted user={user} error_code=bad_header error={err}"
            );
            return Err(SecureStoreError::CorruptedFile { path });
        }

        for attempts_left in (1..=MAX_PASSWORD_ATTEMPTS).rev() {
            let password = prompt
                .read_password(user, attempts_left)
                .map_err(SecureStoreError::Prompt)?;
            match open_sealed(&sealed, &password) {
                Ok(snapshot) => {
                    info!(
                        "event=snapshot_load module=storage status=ok mode=encrypted user={user}"
                    );
                    return Ok(LoadedSnapshot {
                        snapshot,
                        password: Some(password),
                        format: StoredFormat::Encrypted,
                    });
                }
                Err(reason) => warn!(
                    "event=snapshot_unlock module=storage status=error user={user} attempts_left={} reason={reason}",
                    attempts_left - 1
                ),
            }
        }

        error!(
            "event=snapshot_load module=storage status=error mode=encrypted user={user} error_code=attempts_exhausted"
        );
        Err(SecureStoreError::CorruptedFile { path })
    }

    /// Writes the snapshot; an empty or absent password selects plaintext.
    ///
    /// Returns the path written. Stale files of the other format are left in
    /// place; see `delete_unencrypted_save` / `delete_encrypted_save`.
    pub fn save_snapshot(
        &self,
        user: &str,
        snapshot: &Snapshot,
        password: Option<&Password>,
    ) -> SecureStoreResult<PathBuf> {
        let started_at = Instant::now();
        let plain_path = self.plain_path(user)?;
        let encrypted_path = self.encrypted_path(user)?;
        self.ensure_base_dir();

        let encoded = Zeroizing::new(encode_snapshot(snapshot).map_err(SecureStoreError::Encode)?);
        let (path, mode) = match password.filter(|password| !password.is_empty()) {
            Some(password) => {
                let sealed = cipher::seal(&encoded, password.expose(), self.config.kdf())
                    .map_err(SecureStoreError::Encrypt)?;
                write_atomic(&encrypted_path, &sealed)?;
                (encrypted_path, "encrypted")
            }
            None => {
                write_atomic(&plain_path, &encoded)?;
                (plain_path, "plain")
            }
        };

        info!(
            "event=snapshot_save module=storage status=ok mode={mode} user={user} bytes={} duration_ms={}",
            encoded.len(),
            started_at.elapsed().as_millis()
        );
        Ok(path)
    }

    /// Removes the plaintext file; returns whether one existed.
    pub fn delete_unencrypted_save(&self, user: &str) -> SecureStoreResult<bool> {
        let path = self.plain_path(user)?;
        remove_if_exists(&path, user, "plain")
    }

    /// Removes the encrypted file; returns whether one existed.
    pub fn delete_encrypted_save(&self, user: &str) -> SecureStoreResult<bool> {
        let path = self.encrypted_path(user)?;
        remove_if_exists(&path, user, "encrypted")
    }

    fn user_path(&self, user: &str, extension: &str) -> SecureStoreResult<PathBuf> {
        let stem = user_file_stem(user)?;
        Ok(self
            .config
            .base_dir()
            .join(format!("{stem}.{extension}")))
    }

    /// Creation failure is logged only; the following write reports its own
    /// I/O error.
    fn ensure_base_dir(&self) {
        let dir = self.config.base_dir();
        if dir.is_dir() {
            return;
        }
        match std::fs::create_dir_all(dir) {
            Ok(()) => info!(
                "event=store_dir_create module=storage status=ok path={}",
                dir.display()
            ),
            Err(err) => error!(
                "event=store_dir_create module=storage status=error path={} error={err}",
                dir.display()
            ),
        }
    }
}

fn user_file_stem(user: &str) -> SecureStoreResult<String> {
    let stem = user.trim().to_lowercase();
    let unusable = stem.is_empty()
        || stem == "."
        || stem == ".."
        || stem.contains(['/', '\\'])
        || stem.contains('\0');
    if unusable {
        return Err(SecureStoreError::InvalidUser(user.to_string()));
    }
    Ok(stem)
}

fn open_sealed(sealed: &[u8], password: &Password) -> Result<Snapshot, Box<dyn Error>> {
    let plaintext = cipher::open(sealed, password.expose())?;
    Ok(decode_snapshot(&plaintext)?)
}

fn read_file(path: &Path) -> SecureStoreResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| SecureStoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> SecureStoreResult<()> {
    let io_error = |source: io::Error| SecureStoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
    file.write_all(bytes).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|err| io_error(err.error))?;
    Ok(())
}

fn remove_if_exists(path: &Path, user: &str, mode: &str) -> SecureStoreResult<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!("event=snapshot_delete module=storage status=ok mode={mode} user={user}");
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(SecureStoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
