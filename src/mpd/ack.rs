//! Decoding of MPD `ACK` error replies.
//!
//! A failing command terminates its exchange with exactly one line:
//!
//! ```text
//! ACK [<code>@<command index>] {<command>} <message>
//! ```
//!
//! The index identifies the failing command inside a command list. It is
//! carried exactly as the daemon sent it; no renumbering happens here.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::error::MpdError;

/// Prefix shared by every error reply line.
pub const ACK_PREFIX: &str = "ACK ";

static ACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ACK \[(\d+)@(\d+)\] \{([^}]*)\} (.*)$").expect("ACK pattern is valid")
});

/// Numeric error code carried in an `ACK` line.
///
/// The daemon may send codes that are not listed here; they are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AckCode(pub u32);

impl AckCode {
    pub const NOT_LIST: AckCode = AckCode(1);
    pub const ARG: AckCode = AckCode(2);
    pub const PASSWORD: AckCode = AckCode(3);
    pub const PERMISSION: AckCode = AckCode(4);
    pub const UNKNOWN: AckCode = AckCode(5);

    pub const NO_EXIST: AckCode = AckCode(50);
    pub const PLAYLIST_MAX: AckCode = AckCode(51);
    pub const SYSTEM: AckCode = AckCode(52);
    pub const PLAYLIST_LOAD: AckCode = AckCode(53);
    pub const UPDATE_ALREADY: AckCode = AckCode(54);
    pub const PLAYER_SYNC: AckCode = AckCode(55);
    pub const EXIST: AckCode = AckCode(56);

    /// Symbolic name for well-known codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::NOT_LIST => "not a list",
            Self::ARG => "bad argument",
            Self::PASSWORD => "bad password",
            Self::PERMISSION => "permission denied",
            Self::UNKNOWN => "unknown command",
            Self::NO_EXIST => "no such object",
            Self::PLAYLIST_MAX => "playlist full",
            Self::SYSTEM => "system error",
            Self::PLAYLIST_LOAD => "playlist load error",
            Self::UPDATE_ALREADY => "update already in progress",
            Self::PLAYER_SYNC => "player sync error",
            Self::EXIST => "already exists",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A structured error reply from the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckError {
    code: AckCode,
    command_index: u32,
    current_command: String,
    message: String,
}

impl AckError {
    pub fn new(
        code: AckCode,
        command_index: u32,
        current_command: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            command_index,
            current_command: current_command.into(),
            message: message.into(),
        }
    }

    /// Parse an `ACK` line.
    ///
    /// Anything that does not match the format exactly is a framing
    /// violation and yields [`MpdError::MalformedAck`]. Numeric fields that
    /// overflow are rejected the same way rather than read as zero.
    pub fn parse(line: &str) -> Result<Self, MpdError> {
        let malformed = || MpdError::MalformedAck(line.to_string());

        let caps = ACK_PATTERN.captures(line).ok_or_else(malformed)?;
        let code = caps[1].parse::<u32>().map_err(|_| malformed())?;
        let command_index = caps[2].parse::<u32>().map_err(|_| malformed())?;

        Ok(Self {
            code: AckCode(code),
            command_index,
            current_command: caps[3].to_string(),
            message: caps[4].to_string(),
        })
    }

    pub fn code(&self) -> AckCode {
        self.code
    }

    pub fn command_index(&self) -> u32 {
        self.command_index
    }

    /// The command the daemon was executing when it failed. Empty when the
    /// daemon could not attribute the error to a command.
    pub fn current_command(&self) -> &str {
        &self.current_command
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if !self.current_command.is_empty() {
            write!(
                f,
                " (command #{} '{}')",
                self.command_index, self.current_command
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for AckError {}
