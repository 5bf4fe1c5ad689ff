//! Persistence for per-user snapshots.
//!
//! # Responsibility
//! - Encode snapshots into a versioned document (`codec`).
//! - Seal and open password-protected files (`cipher`).
//! - Drive the load/save protocol on disk (`secure_store`).
//!
//! # Invariants
//! - Only `secure_store` touches the file system.
//! - Passwords never reach a log line or a file in plaintext.
//!
//! # See also
//! - `crate::service::session` for the caller that tracks on-disk format.

pub mod cipher;
pub mod codec;
pub mod prompt;
pub mod secure_store;

pub use cipher::{CipherError, KdfParams};
pub use codec::{decode_snapshot, encode_snapshot, CodecError};
pub use prompt::{Password, PasswordPrompt, TerminalPrompt};
pub use secure_store::{
    LoadedSnapshot, SecureStore, SecureStoreError, SecureStoreResult, StoredFormat,
    MAX_PASSWORD_ATTEMPTS,
};
