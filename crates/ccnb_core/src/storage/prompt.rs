//! Password input seam for opening encrypted snapshots.
//!
//! # Invariants
//! - Entered passwords are never logged and never written to disk.
//! - Password material lives in zeroize-on-drop buffers.

use std::fmt::{Debug, Formatter};
use std::io;
use zeroize::Zeroizing;

/// Session password held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Source of passwords for encrypted snapshots.
///
/// Called once per attempt; `attempts_left` counts the current attempt.
pub trait PasswordPrompt {
    fn read_password(&mut self, user: &str, attempts_left: u32) -> io::Result<Password>;
}

/// Masked terminal prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl PasswordPrompt for TerminalPrompt {
    fn read_password(&mut self, user: &str, attempts_left: u32) -> io::Result<Password> {
        let prompt = format!("Password for {user} ({attempts_left} attempts left): ");
        rpassword::prompt_password(prompt).map(Password::new)
    }
}

impl<F> PasswordPrompt for F
where
    F: FnMut(&str, u32) -> io::Result<Password>,
{
    fn read_password(&mut self, user: &str, attempts_left: u32) -> io::Result<Password> {
        self(user, attempts_left)
    }
}

#[cfg(test)]
mod tests {
    use super::Password;

    #[test]
    fn debug_output_hides_the_secret() {
        let password = Password::new("hunter2");
        assert!(!format!("{password:?}").contains("hunter2"));
        assert_eq!(password.expose(), "hunter2");
    }
}
