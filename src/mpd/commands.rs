//! Playback-option commands and argument encoding.
//!
//! Each method formats one command line and runs it through
//! [`Session::send`]. Argument validation happens first, so a rejected value
//! never reaches the network.

use std::fmt;
use std::str::FromStr;

use super::error::{MpdError, Result};
use super::session::Session;

/// A value that can be passed as a command argument.
pub trait Argument {
    fn write_to(&self, out: &mut String);
}

impl Argument for bool {
    fn write_to(&self, out: &mut String) {
        out.push(if *self { '1' } else { '0' });
    }
}

macro_rules! integer_argument {
    ($($ty:ty),*) => {
        $(
            impl Argument for $ty {
                fn write_to(&self, out: &mut String) {
                    out.push_str(&self.to_string());
                }
            }
        )*
    };
}

integer_argument!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Argument for str {
    fn write_to(&self, out: &mut String) {
        let bare = !self.is_empty()
            && !self
                .chars()
                .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
        if bare {
            out.push_str(self);
            return;
        }

        out.push('"');
        for c in self.chars() {
            if c == '"' || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push('"');
    }
}

impl Argument for String {
    fn write_to(&self, out: &mut String) {
        self.as_str().write_to(out);
    }
}

impl<T: Argument + ?Sized> Argument for &T {
    fn write_to(&self, out: &mut String) {
        (**self).write_to(out);
    }
}

impl Argument for ReplayGainMode {
    fn write_to(&self, out: &mut String) {
        out.push_str(self.as_str());
    }
}

/// Builder for a single command line.
#[derive(Debug, Clone)]
pub struct CommandLine {
    line: String,
}

impl CommandLine {
    pub fn new(name: &str) -> Self {
        Self {
            line: name.to_string(),
        }
    }

    pub fn arg(mut self, value: impl Argument) -> Self {
        self.line.push(' ');
        value.write_to(&mut self.line);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl From<CommandLine> for String {
    fn from(command: CommandLine) -> Self {
        command.line
    }
}

/// Replay gain (volume normalization) modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplayGainMode {
    Off,
    Track,
    Album,
    Auto,
}

impl ReplayGainMode {
    pub const ALL: [ReplayGainMode; 4] = [Self::Off, Self::Track, Self::Album, Self::Auto];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Album => "album",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for ReplayGainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplayGainMode {
    type Err = MpdError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| MpdError::UnknownReplayGainMode(s.to_string()))
    }
}

const VOLUME_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

impl Session {
    async fn run(&self, command: CommandLine) -> Result<()> {
        self.send(command.as_str()).await.map(|_| ())
    }

    pub async fn set_consume(&self, consume: bool) -> Result<()> {
        self.run(CommandLine::new("consume").arg(consume)).await
    }

    pub async fn set_crossfade(&self, seconds: u32) -> Result<()> {
        self.run(CommandLine::new("crossfade").arg(seconds)).await
    }

    pub async fn set_random(&self, random: bool) -> Result<()> {
        self.run(CommandLine::new("random").arg(random)).await
    }

    pub async fn set_repeat(&self, repeat: bool) -> Result<()> {
        self.run(CommandLine::new("repeat").arg(repeat)).await
    }

    /// Set the mixer volume in percent. Values outside 0-100 are rejected
    /// before anything is sent.
    pub async fn set_volume(&self, volume: i32) -> Result<()> {
        if !VOLUME_RANGE.contains(&volume) {
            return Err(MpdError::VolumeOutOfRange(volume));
        }
        self.run(CommandLine::new("setvol").arg(volume)).await
    }

    pub async fn set_single(&self, single: bool) -> Result<()> {
        self.run(CommandLine::new("single").arg(single)).await
    }

    pub async fn set_replay_gain_mode(&self, mode: ReplayGainMode) -> Result<()> {
        self.run(CommandLine::new("replay_gain_mode").arg(mode)).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.run(CommandLine::new("ping")).await
    }
}
