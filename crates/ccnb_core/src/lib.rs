//! Core domain logic for the ccnb contact and note book.
//! This crate is the single source of truth for record invariants and the
//! on-disk snapshot protocol.

pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;
pub mod validate;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, log_level_from_env, logging_status};
pub use model::contact::{ContactRecord, RecordError};
pub use model::note::NoteRecord;
pub use model::snapshot::Snapshot;
pub use repo::contact_store::ContactStore;
pub use repo::note_store::NoteStore;
pub use repo::{StoreError, StoreResult};
pub use service::birthday_service::{
    upcoming_birthdays, upcoming_birthdays_from_today, UpcomingBirthday, DEFAULT_WINDOW_DAYS,
};
pub use service::session::Session;
pub use storage::{
    KdfParams, LoadedSnapshot, Password, PasswordPrompt, SecureStore, SecureStoreError,
    StoredFormat, TerminalPrompt,
};
pub use validate::ValidationError;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
