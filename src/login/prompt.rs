use std::fmt;
use std::io::{self, BufRead, Write};
use strum_macros::Display;

/// The kind of Steam Guard code Steam is asking for.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum GuardCodeKind {
    /// A code from the mobile authenticator.
    #[strum(serialize = "Steam Guard")]
    TwoFactor,
    /// A code sent to the account's email address.
    #[strum(serialize = "email")]
    Email,
}

/// Supplies Steam Guard codes when no shared secret is configured.
///
/// Called synchronously during login.
pub trait CodePrompt: fmt::Debug + Send + Sync {
    fn prompt(&self, kind: GuardCodeKind) -> io::Result<String>;
}

/// Asks for codes on standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl CodePrompt for StdinPrompt {
    fn prompt(&self, kind: GuardCodeKind) -> io::Result<String> {
        let mut stdout = io::stdout();

        write!(stdout, "Please enter a {kind} code\n> ")?;
        stdout.flush()?;

        let mut line = String::new();

        io::stdin().lock().read_line(&mut line)?;

        Ok(line.trim().to_string())
    }
}

/// Answers every prompt with the same code.
#[cfg(test)]
#[derive(Debug)]
pub struct FixedPrompt(pub &'static str);

#[cfg(test)]
impl CodePrompt for FixedPrompt {
    fn prompt(&self, _kind: GuardCodeKind) -> io::Result<String> {
        Ok(self.0.into())
    }
}
