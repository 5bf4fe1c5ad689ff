//! Core use-case services.
//!
//! # Responsibility
//! - Derive use-case results (upcoming birthdays) from record stores.
//! - Track one user's session state between load and save.
//!
//! # See also
//! - `crate::storage` for the persistence protocol a session drives.

pub mod birthday_service;
pub mod session;
