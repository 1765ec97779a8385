//! Inbound commands.
//!
//! The vocabulary is deliberately small:
//!
//! | Line | Effect |
//! |------|--------|
//! | `MODE:CLASS` | Switch to class time |
//! | `MODE:FREE` | Switch to free time |
//! | `SYNC` | Dump every `student_info`, then one `status` |
//!
//! Surrounding whitespace (including a trailing `\r`) is ignored. Anything
//! else is not a command.

use rollcall_core::SystemMode;
use std::fmt;

/// One inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Change the system mode.
    Mode(SystemMode),
    /// Request a full roster dump followed by a status snapshot.
    Sync,
}

impl Command {
    /// Parse one line. Returns `None` for anything that is not a command.
    ///
    /// # Examples
    ///
    /// ```
    /// use rollcall_core::SystemMode;
    /// use rollcall_protocol::Command;
    ///
    /// assert_eq!(Command::parse("MODE:CLASS\r"), Some(Command::Mode(SystemMode::Class)));
    /// assert_eq!(Command::parse("SYNC"), Some(Command::Sync));
    /// assert_eq!(Command::parse("mode:class"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "MODE:CLASS" => Some(Self::Mode(SystemMode::Class)),
            "MODE:FREE" => Some(Self::Mode(SystemMode::Free)),
            "SYNC" => Some(Self::Sync),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mode(SystemMode::Class) => f.write_str("MODE:CLASS"),
            Self::Mode(SystemMode::Free) => f.write_str("MODE:FREE"),
            Self::Sync => f.write_str("SYNC"),
        }
    }
}
