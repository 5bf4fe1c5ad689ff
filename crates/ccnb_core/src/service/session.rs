//! One user's open snapshot between load and save.
//!
//! # Responsibility
//! - Hold the loaded snapshot and the session password.
//! - Remember which format is on disk and retire the stale file when a save
//!   switches formats.
//!
//! # Invariants
//! - A stale file is removed only after the replacing write succeeded.
//! - After a successful `save`, exactly one snapshot file exists for the user.

use crate::model::snapshot::Snapshot;
use crate::storage::prompt::{Password, PasswordPrompt};
use crate::storage::secure_store::{SecureStore, SecureStoreResult, StoredFormat};
use log::info;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Session {
    store: SecureStore,
    user: String,
    snapshot: Snapshot,
    password: Option<Password>,
    on_disk: StoredFormat,
}

impl Session {
    /// Loads `user`'s snapshot, prompting for a password if it is encrypted.
    pub fn open(
        store: SecureStore,
        user: &str,
        prompt: &mut dyn PasswordPrompt,
    ) -> SecureStoreResult<Self> {
        let loaded = store.load_snapshot(user, prompt)?;
        Ok(Self {
            store,
            user: user.to_string(),
            snapshot: loaded.snapshot,
            password: loaded.password,
            on_disk: loaded.format,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.snapshot
    }

    pub fn on_disk_format(&self) -> StoredFormat {
        self.on_disk
    }

    /// Whether the next save will be encrypted.
    pub fn is_protected(&self) -> bool {
        self.password.is_some()
    }

    /// Sets the password used by the next save; an empty one clears it.
    pub fn set_password(&mut self, password: Password) {
        if password.is_empty() {
            self.password = None;
        } else {
            self.password = Some(password);
        }
    }

    pub fn clear_password(&mut self) {
        self.password = None;
    }

    /// Writes the snapshot in the format the password selects.
    pub fn save(&mut self) -> SecureStoreResult<PathBuf> {
        let path = self
            .store
            .save_snapshot(&self.user, &self.snapshot, self.password.as_ref())?;

        let written = if self.is_protected() {
            StoredFormat::Encrypted
        } else {
            StoredFormat::Plain
        };
        let removed_stale = match written {
            StoredFormat::Encrypted => self.store.delete_unencrypted_save(&self.user)?,
            _ => self.store.delete_encrypted_save(&self.user)?,
        };
        if removed_stale || self.on_disk != written {
            info!(
                "event=session_format_switch module=service status=ok user={} from={:?} to={:?} removed_stale={}",
                self.user, self.on_disk, written, removed_stale
            );
        }
        self.on_disk = written;
        Ok(path)
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }
}
